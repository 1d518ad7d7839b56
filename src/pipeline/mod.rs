use tracing::info;

use crate::errors::RequestError;
use crate::extract::{self, Extraction};
use crate::prompt;
use crate::provider::Requester;
use crate::wire::CodeBundle;

/// Plan, generate and edit operations. Each issues exactly one request.
pub struct SiteGenerator {
    requester: Requester,
}

impl SiteGenerator {
    pub fn new(requester: Requester) -> Self {
        Self { requester }
    }

    /// Natural-language plan for `idea`. Returned exactly as the model wrote it.
    pub async fn generate_plan(&self, idea: &str) -> Result<String, RequestError> {
        info!("generating plan");
        let system = prompt::system_prompt_plan();
        self.requester
            .request(&prompt::user_prompt_plan(idea), Some(&system), false)
            .await
    }

    pub async fn generate_code(&self, plan: &str) -> Result<CodeBundle, RequestError> {
        Ok(self.generate_code_traced(plan).await?.bundle)
    }

    /// Like [`generate_code`](Self::generate_code), also reporting how the
    /// bundle was recovered from the response.
    pub async fn generate_code_traced(&self, plan: &str) -> Result<Extraction, RequestError> {
        info!("generating code");
        let system = prompt::system_prompt_codegen();
        let raw = self
            .requester
            .request(&prompt::user_prompt_codegen(plan), Some(&system), true)
            .await?;
        Ok(extract::extract_with_source(&raw))
    }

    pub async fn edit_code(&self, current: &CodeBundle, instruction: &str) -> Result<CodeBundle, RequestError> {
        Ok(self.edit_code_traced(current, instruction).await?.bundle)
    }

    /// `current` is only read; the result is a freshly built bundle.
    pub async fn edit_code_traced(
        &self,
        current: &CodeBundle,
        instruction: &str,
    ) -> Result<Extraction, RequestError> {
        info!("editing code");
        let system = prompt::system_prompt_edit();
        let raw = self
            .requester
            .request(&prompt::user_prompt_edit(current, instruction), Some(&system), true)
            .await?;
        Ok(extract::extract_with_source(&raw))
    }
}

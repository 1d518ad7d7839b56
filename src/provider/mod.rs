use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::{Config, ProviderKind};
use crate::credentials::{self, CredentialSource};
use crate::errors::RequestError;
use crate::wire::PromptContext;

pub mod anthropic;
pub mod ollama;
pub mod openai;

/// One remote text-generation backend. Implementations issue exactly one HTTP
/// call per `complete` and return the model's text content.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Whether `complete` must be handed a credential.
    fn requires_credential(&self) -> bool {
        true
    }

    async fn complete(
        &self,
        ctx: &PromptContext,
        expect_structured: bool,
        credential: Option<&str>,
    ) -> Result<String, RequestError>;
}

pub type DynTransport = Box<dyn Transport + Send + Sync>;

pub fn make_transport(cfg: &Config) -> DynTransport {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    let base = cfg.base_url();
    match cfg.provider {
        ProviderKind::Pollinations | ProviderKind::OpenAI => Box::new(openai::OpenAiCompatible::new(
            base,
            cfg.model.clone(),
            cfg.temperature,
            timeout,
        )),
        ProviderKind::Ollama => Box::new(ollama::Ollama::new(base, cfg.model.clone(), cfg.temperature, timeout)),
        ProviderKind::Anthropic => Box::new(anthropic::Anthropic::new(base, cfg.model.clone(), timeout)),
    }
}

/// Issues single prompts through a transport, resolving the credential first.
pub struct Requester {
    transport: DynTransport,
    credentials: Arc<dyn CredentialSource>,
    credential_name: String,
}

impl Requester {
    pub fn new(
        transport: DynTransport,
        credentials: Arc<dyn CredentialSource>,
        credential_name: impl Into<String>,
    ) -> Self {
        Self { transport, credentials, credential_name: credential_name.into() }
    }

    pub fn from_config(cfg: &Config, credentials: Arc<dyn CredentialSource>) -> Self {
        Self::new(make_transport(cfg), credentials, cfg.credential_name())
    }

    /// Sends `user_content` (with optional system instruction) and returns the
    /// raw text. With `expect_structured`, one extra layer of JSON string
    /// encoding is removed when present.
    pub async fn request(
        &self,
        user_content: &str,
        system_content: Option<&str>,
        expect_structured: bool,
    ) -> Result<String, RequestError> {
        let credential = if self.transport.requires_credential() {
            match credentials::resolve(self.credentials.as_ref(), &self.credential_name) {
                Some(key) => Some(key),
                None => {
                    return Err(RequestError::Configuration { name: self.credential_name.clone() })
                }
            }
        } else {
            None
        };

        let ctx = PromptContext::new(user_content, system_content);
        debug!(
            user_bytes = ctx.user.len(),
            has_system = ctx.system.is_some(),
            expect_structured,
            "sending request"
        );

        let text = self
            .transport
            .complete(&ctx, expect_structured, credential.as_deref())
            .await?;
        debug!(response_bytes = text.len(), "received response");

        if expect_structured {
            Ok(unwrap_encoded_layer(text))
        } else {
            Ok(text)
        }
    }
}

/// If `text` is a JSON string literal, returns its decoded contents; otherwise
/// returns `text` untouched. Removes at most one layer.
pub fn unwrap_encoded_layer(text: String) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with('"') {
        return text;
    }
    match serde_json::from_str::<String>(trimmed) {
        Ok(inner) => {
            debug!("unwrapped one layer of string encoding");
            inner
        }
        Err(_) => text,
    }
}

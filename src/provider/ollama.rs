use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::errors::RequestError;
use crate::wire::PromptContext;

/// Local Ollama server. No credential.
pub struct Ollama {
    url: String,
    model: String,
    temperature: f32,
    client: Client,
    timeout: Duration,
}

impl Ollama {
    pub fn new(url: String, model: String, temperature: f32, timeout: Duration) -> Self {
        Self { url, model, temperature, client: Client::new(), timeout }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: String,
}

fn to_messages(ctx: &PromptContext) -> Vec<Msg<'_>> {
    let mut out = Vec::with_capacity(2);
    if let Some(sys) = ctx.system.as_deref() {
        out.push(Msg { role: "system", content: sys });
    }
    out.push(Msg { role: "user", content: &ctx.user });
    out
}

/// Standard ollama envelope first; anything else, or an envelope with no
/// text, is passed through.
fn content_from_body(text: String) -> String {
    match serde_json::from_str::<ChatResponse>(&text) {
        Ok(c) if !c.message.content.trim().is_empty() => c.message.content,
        _ => text,
    }
}

#[async_trait]
impl super::Transport for Ollama {
    fn requires_credential(&self) -> bool {
        false
    }

    async fn complete(
        &self,
        ctx: &PromptContext,
        expect_structured: bool,
        _credential: Option<&str>,
    ) -> Result<String, RequestError> {
        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: to_messages(ctx),
            stream: false,
            format: expect_structured.then_some("json"),
            options: OllamaOptions { temperature: self.temperature },
        };

        debug!("ollama: POST {}", url);

        let resp = self.client.post(&url).timeout(self.timeout).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        debug!("ollama: raw body:\n{}", text);

        if !status.is_success() {
            return Err(RequestError::transport(Some(status.as_u16()), text));
        }

        Ok(content_from_body(text))
    }
}

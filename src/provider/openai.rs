use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::RequestError;
use crate::wire::PromptContext;

/// Chat-completions transport. Speaks to OpenAI itself and to any endpoint
/// with the same wire shape (the Pollinations text endpoint is one).
pub struct OpenAiCompatible {
    url: String,
    model: String,
    temperature: f32,
    client: Client,
    timeout: Duration,
}

impl OpenAiCompatible {
    pub fn new(url: String, model: String, temperature: f32, timeout: Duration) -> Self {
        Self { url, model, temperature, client: Client::new(), timeout }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    r#type: &'static str,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

fn to_messages(ctx: &PromptContext) -> Vec<Msg<'_>> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = ctx.system.as_deref() {
        messages.push(Msg { role: "system", content: system });
    }
    messages.push(Msg { role: "user", content: &ctx.user });
    messages
}

/// Pulls the first choice's content out of a chat-completions body. Bodies
/// that are not a chat envelope, or whose first choice carries no text (a
/// refusal, an empty `choices`), are passed through as-is.
pub(crate) fn content_from_body(text: String) -> String {
    let content = match serde_json::from_str::<ChatResponse>(&text) {
        Ok(parsed) => parsed.choices.into_iter().next().and_then(|c| c.message.content),
        Err(e) => {
            warn!("response is not a chat envelope ({e}); passing body through");
            return text;
        }
    };
    match content {
        Some(c) if !c.trim().is_empty() => c,
        _ => {
            warn!("chat envelope has no content; passing body through");
            text
        }
    }
}

#[async_trait]
impl super::Transport for OpenAiCompatible {
    async fn complete(
        &self,
        ctx: &PromptContext,
        expect_structured: bool,
        credential: Option<&str>,
    ) -> Result<String, RequestError> {
        let body = ChatRequest {
            model: &self.model,
            messages: to_messages(ctx),
            temperature: self.temperature,
            response_format: expect_structured.then_some(ResponseFormat { r#type: "json_object" }),
        };

        debug!(url = %self.url, model = %self.model, "POST chat completion");

        let mut req = self.client.post(&self.url).timeout(self.timeout).json(&body);
        if let Some(key) = credential {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(%status, "raw response:\n{}", text);

        if !status.is_success() {
            return Err(RequestError::transport(Some(status.as_u16()), text));
        }

        Ok(content_from_body(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_system_and_json_mode() {
        let ctx = PromptContext::new("build it", Some("be terse"));
        let body = ChatRequest {
            model: "openai",
            messages: to_messages(&ctx),
            temperature: 0.7,
            response_format: Some(ResponseFormat { r#type: "json_object" }),
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][0]["content"], "be terse");
        assert_eq!(v["messages"][1]["role"], "user");
        assert_eq!(v["response_format"]["type"], "json_object");
    }

    #[test]
    fn plain_request_omits_response_format() {
        let ctx = PromptContext::new("plan it", None);
        let body = ChatRequest {
            model: "openai",
            messages: to_messages(&ctx),
            temperature: 0.7,
            response_format: None,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["messages"].as_array().unwrap().len(), 1);
        assert!(v.get("response_format").is_none());
    }

    #[test]
    fn envelope_content_is_extracted() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#;
        assert_eq!(content_from_body(body.to_string()), "hello");
    }

    #[test]
    fn envelope_without_content_keeps_body() {
        let refusal = r#"{"choices":[{"message":{"content":null,"refusal":"I can't build that."}}]}"#;
        let out = content_from_body(refusal.to_string());
        assert!(out.contains("can't build"));

        let empty = r#"{"choices":[]}"#;
        assert_eq!(content_from_body(empty.to_string()), empty);

        let blank = r#"{"choices":[{"message":{"content":"  "}}]}"#;
        assert_eq!(content_from_body(blank.to_string()), blank);
    }

    #[test]
    fn non_envelope_body_passes_through() {
        let body = "```html\n<p>x</p>\n```";
        assert_eq!(content_from_body(body.to_string()), body);
    }
}

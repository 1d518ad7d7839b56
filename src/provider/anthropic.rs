use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::errors::RequestError;
use crate::wire::PromptContext;

const API_VERSION: &str = "2023-06-01";

pub struct Anthropic {
    api_base: String,
    model: String,
    client: Client,
    timeout: Duration,
    max_tokens: u32,
}

impl Anthropic {
    pub fn new(api_base: String, model: String, timeout: Duration) -> Self {
        Self { api_base, model, client: Client::new(), timeout, max_tokens: 8192 }
    }
}

#[derive(Serialize)]
struct MsgRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Msg<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MsgResponse {
    content: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: String,
    #[serde(default)]
    r#type: String,
}

fn text_of(parsed: MsgResponse) -> String {
    parsed
        .content
        .into_iter()
        .filter(|b| b.r#type == "text")
        .map(|b| b.text)
        .collect::<Vec<_>>()
        .join("")
}

/// Joined text blocks; a body that is not a messages envelope, or has no
/// text blocks, is passed through.
fn content_from_body(text: String) -> String {
    match serde_json::from_str::<MsgResponse>(&text).map(text_of) {
        Ok(joined) if !joined.trim().is_empty() => joined,
        _ => text,
    }
}

#[async_trait]
impl super::Transport for Anthropic {
    // The messages API has no JSON mode; the prompts already demand a bare
    // object, so the flag is not forwarded.
    async fn complete(
        &self,
        ctx: &PromptContext,
        _expect_structured: bool,
        credential: Option<&str>,
    ) -> Result<String, RequestError> {
        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));
        let body = MsgRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Msg { role: "user", content: &ctx.user }],
            system: ctx.system.as_deref(),
        };

        debug!("anthropic: POST {}", url);

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-api-key", credential.unwrap_or_default())
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!("anthropic: raw body:\n{}", text);

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
    fn system_goes_top_level() {
        let ctx = PromptContext::new("u", Some("s"));
        let body = MsgRequest {
            model: "claude",
            max_tokens: 10,
            messages: vec![Msg { role: "user", content: &ctx.user }],
            system: ctx.system.as_deref(),
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["system"], "s");
        assert_eq!(v["messages"][0]["content"], "u");
    }

    #[test]
    fn text_blocks_are_joined() {
        let parsed: MsgResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"{\"html\":"},{"type":"tool_use"},{"type":"text","text":"\"\"}"}]}"#,
        )
        .unwrap();
        assert_eq!(text_of(parsed), r#"{"html":""}"#);
    }

    #[test]
    fn envelope_without_text_keeps_body() {
        let body = r#"{"content":[{"type":"tool_use","id":"x"}],"stop_reason":"refusal"}"#;
        assert_eq!(content_from_body(body.to_string()), body);
    }
}

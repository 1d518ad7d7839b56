use mockito::{Matcher, Server};
use std::sync::Arc;
use std::time::Duration;

use vibe_site::provider::anthropic::Anthropic;
use vibe_site::provider::ollama::Ollama;
use vibe_site::provider::openai::OpenAiCompatible;
use vibe_site::{CodeBundle, PromptContext, RequestError, Requester, SiteGenerator, Transport};

fn generator(url: String) -> SiteGenerator {
    let transport = OpenAiCompatible::new(url, "openai".into(), 0.7, Duration::from_secs(5));
    let creds = Arc::new(|_: &str| Some("sk-live".to_string()));
    SiteGenerator::new(Requester::new(Box::new(transport), creds, "pollinationApiKey"))
}

#[tokio::test]
async fn chat_envelope_is_unpacked_and_extracted() {
    let mut server = Server::new_async().await;
    let content = r#"{"html":"<p>hi</p>","css":"","js":""}"#;
    let envelope = serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    });
    let mock = server
        .mock("POST", "/openai")
        .match_header("authorization", "Bearer sk-live")
        .match_body(Matcher::PartialJsonString(r#"{"response_format":{"type":"json_object"}}"#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(envelope.to_string())
        .create_async()
        .await;

    let bundle = generator(format!("{}/openai", server.url()))
        .generate_code("1. Hero")
        .await
        .unwrap();
    assert_eq!(bundle, CodeBundle::new("<p>hi</p>", "", ""));
    mock.assert_async().await;
}

#[tokio::test]
async fn double_encoded_content_is_unwrapped() {
    let mut server = Server::new_async().await;
    let content = serde_json::to_string(r#"{"html":"<b>2</b>","css":"b{}","js":""}"#).unwrap();
    let envelope = serde_json::json!({ "choices": [{ "message": { "content": content } }] });
    let _mock = server
        .mock("POST", "/openai")
        .with_status(200)
        .with_body(envelope.to_string())
        .create_async()
        .await;

    let bundle = generator(format!("{}/openai", server.url()))
        .generate_code("plan")
        .await
        .unwrap();
    assert_eq!(bundle, CodeBundle::new("<b>2</b>", "b{}", ""));
}

#[tokio::test]
async fn refusal_envelope_stays_visible_in_placeholder() {
    let mut server = Server::new_async().await;
    let body = r#"{"choices":[{"message":{"content":null,"refusal":"I can't build that."}}]}"#;
    let _mock = server
        .mock("POST", "/openai")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let bundle = generator(format!("{}/openai", server.url()))
        .generate_code("plan")
        .await
        .unwrap();
    assert!(bundle.html.contains("I can't build that."));
}

#[tokio::test]
async fn plan_request_is_plain_text() {
    let mut server = Server::new_async().await;
    let envelope = serde_json::json!({ "choices": [{ "message": { "content": "1. Hero\n2. Menu" } }] });
    let mock = server
        .mock("POST", "/openai")
        .match_body(Matcher::Regex("a bakery".to_string()))
        .with_status(200)
        .with_body(envelope.to_string())
        .create_async()
        .await;

    let plan = generator(format!("{}/openai", server.url()))
        .generate_plan("a bakery")
        .await
        .unwrap();
    assert_eq!(plan, "1. Hero\n2. Menu");
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_becomes_transport_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/openai")
        .with_status(401)
        .with_body(r#"{"error":"bad key"}"#)
        .create_async()
        .await;

    let err = generator(format!("{}/openai", server.url()))
        .generate_plan("a bakery")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RequestError::Transport { status: Some(401), body: r#"{"error":"bad key"}"#.to_string() }
    );
}

#[tokio::test]
async fn unreachable_endpoint_has_no_status() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/openai", listener.local_addr().unwrap());
    drop(listener);

    match generator(url).generate_plan("x").await.unwrap_err() {
        RequestError::Transport { status, .. } => assert_eq!(status, None),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn ollama_transport_serves_repeated_calls() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJsonString(r#"{"stream":false,"format":"json"}"#.to_string()))
        .with_status(200)
        .with_body(r#"{"message":{"role":"assistant","content":"{\"html\":\"<i>o</i>\"}"},"done":true}"#)
        .expect(2)
        .create_async()
        .await;

    let transport = Ollama::new(server.url(), "llama3".into(), 0.2, Duration::from_secs(5));
    let ctx = PromptContext::new("build it", Some("sys"));
    for _ in 0..2 {
        let out = transport.complete(&ctx, true, None).await.unwrap();
        assert_eq!(out, r#"{"html":"<i>o</i>"}"#);
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn anthropic_transport_serves_repeated_calls() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "sk-ant")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::PartialJsonString(r#"{"system":"sys"}"#.to_string()))
        .with_status(200)
        .with_body(r#"{"content":[{"type":"text","text":"1. Hero"}]}"#)
        .expect(2)
        .create_async()
        .await;

    let transport = Anthropic::new(server.url(), "claude".into(), Duration::from_secs(5));
    let ctx = PromptContext::new("a bakery", Some("sys"));
    for _ in 0..2 {
        let out = transport.complete(&ctx, false, Some("sk-ant")).await.unwrap();
        assert_eq!(out, "1. Hero");
    }
    mock.assert_async().await;
}

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vibe_site::extract::{CSS_PLACEHOLDER, HTML_PLACEHOLDER_NOTICE, JS_PLACEHOLDER};
use vibe_site::{compose, CodeBundle, PromptContext, RequestError, Requester, SiteGenerator, Transport};

/// Returns the same reply for every call and counts calls.
struct Echo {
    reply: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Transport for Echo {
    async fn complete(
        &self,
        _ctx: &PromptContext,
        _expect_structured: bool,
        _credential: Option<&str>,
    ) -> Result<String, RequestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

fn generator(reply: &str, key: Option<&'static str>) -> (SiteGenerator, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let transport = Echo { reply: reply.to_string(), calls: calls.clone() };
    let creds = Arc::new(move |_: &str| key.map(str::to_string));
    (SiteGenerator::new(Requester::new(Box::new(transport), creds, "pollinationApiKey")), calls)
}

#[tokio::test]
async fn idea_to_preview_round() {
    let (g, calls) = generator(
        r#"{"html":"<h1>Bakery</h1>","css":"h1{color:#b5651d}","js":"console.log('ready')"}"#,
        Some("sk-test"),
    );

    let plan = g.generate_plan("a bakery").await.unwrap();
    let bundle = g.generate_code(&plan).await.unwrap();
    assert_eq!(bundle.html, "<h1>Bakery</h1>");

    let edited = g.edit_code(&bundle, "make background blue").await.unwrap();
    assert_eq!(edited, bundle);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let doc = compose(&edited).text;
    let (c, h, j) = (
        doc.find(&edited.css).unwrap(),
        doc.find(&edited.html).unwrap(),
        doc.find(&edited.js).unwrap(),
    );
    assert!(c < h && h < j);
}

#[tokio::test]
async fn missing_key_issues_no_request() {
    let (g, calls) = generator("unused", None);

    let err = g.generate_code("plan").await.unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn prose_reply_keeps_everything_visible() {
    let reply = "Sorry, I can only describe the site: it has a hero and a footer.";
    let (g, _) = generator(reply, Some("k"));

    let b: CodeBundle = g.generate_code("plan").await.unwrap();
    assert!(b.html.starts_with(HTML_PLACEHOLDER_NOTICE));
    assert!(b.html.contains(reply));
    assert_eq!(b.css, CSS_PLACEHOLDER);
    assert_eq!(b.js, JS_PLACEHOLDER);
}

#[tokio::test]
async fn concurrent_calls_are_independent() {
    let (g, calls) = generator(r#"{"html":"a","css":"b","js":"c"}"#, Some("k"));
    let current = CodeBundle::new("x", "y", "z");

    let (a, b) = tokio::join!(g.edit_code(&current, "one"), g.edit_code(&current, "two"));
    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(current, CodeBundle::new("x", "y", "z"));
}

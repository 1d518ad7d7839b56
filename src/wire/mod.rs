use serde::{Deserialize, Serialize};

/// ========================================
/// Data shapes passed between pipeline stages
/// ========================================

/// The three-part code unit produced by generation and consumed by editing
/// and preview. Absent parts are empty strings, never missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBundle {
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub css: String,
    #[serde(default)]
    pub js: String,
}

impl CodeBundle {
    pub fn new(html: impl Into<String>, css: impl Into<String>, js: impl Into<String>) -> Self {
        Self { html: html.into(), css: css.into(), js: js.into() }
    }

    pub fn total_bytes(&self) -> usize {
        self.html.len() + self.css.len() + self.js.len()
    }
}

/// One outbound prompt: optional system instruction plus user content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub user: String,
}

impl PromptContext {
    pub fn new(user: impl Into<String>, system: Option<&str>) -> Self {
        Self { system: system.map(str::to_string), user: user.into() }
    }
}

/// Which decode attempt produced a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    Structured,
    DoubleEncoded,
    Fenced,
    EmbeddedObject,
    Placeholder,
}

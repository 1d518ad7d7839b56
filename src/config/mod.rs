use anyhow::Context;
use clap::ValueEnum;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::credentials::POLLINATION_API_KEY;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(alias = "pollination")]
    Pollinations,
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Pollinations => "https://text.pollinations.ai/openai",
            ProviderKind::OpenAI => "https://api.openai.com/v1/chat/completions",
            ProviderKind::Anthropic => "https://api.anthropic.com",
            ProviderKind::Ollama => "http://localhost:11434",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Pollinations => "openai",
            ProviderKind::OpenAI => "gpt-4.1-mini",
            ProviderKind::Anthropic => "claude-sonnet-4-5",
            ProviderKind::Ollama => "llama3.1",
        }
    }

    pub fn default_credential_name(self) -> &'static str {
        match self {
            ProviderKind::Pollinations => POLLINATION_API_KEY,
            ProviderKind::OpenAI => "openaiApiKey",
            ProviderKind::Anthropic => "anthropicApiKey",
            ProviderKind::Ollama => "ollamaApiKey",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderKind,
    pub model: String,
    /// Overrides the provider's default endpoint.
    pub base_url: Option<String>,
    /// Overrides the provider's default credential name.
    pub credential_name: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub session_dir: String,
    /// TOML file with a `[keys]` table, consulted after the environment.
    pub key_file: Option<String>,
    pub save_artifacts: bool,
}

impl Default for Config {
    fn default() -> Self {
        let provider = ProviderKind::Pollinations;
        Self {
            provider,
            model: provider.default_model().into(),
            base_url: None,
            credential_name: None,
            temperature: 0.7,
            timeout_secs: 240,
            session_dir: "site".into(),
            key_file: None,
            save_artifacts: true,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let s = fs::read_to_string(path)?;
        toml::from_str(&s).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }

    pub fn credential_name(&self) -> String {
        self.credential_name
            .clone()
            .unwrap_or_else(|| self.provider.default_credential_name().to_string())
    }

    /// Switches provider, resetting the model when it was the old default.
    pub fn set_provider(&mut self, provider: ProviderKind) {
        if self.model == self.provider.default_model() {
            self.model = provider.default_model().into();
        }
        self.provider = provider;
    }
}

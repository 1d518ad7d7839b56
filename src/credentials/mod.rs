use fs_err as fs;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Logical name of the Pollinations key, as the key manager stores it.
pub const POLLINATION_API_KEY: &str = "pollinationApiKey";

/// Single-method credential capability injected into the requester.
///
/// Returning `None` (or a blank string) means "not configured".
pub trait CredentialSource: Send + Sync {
    fn lookup(&self, name: &str) -> Option<String>;
}

impl<F> CredentialSource for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn lookup(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Reads `pollinationApiKey` from `POLLINATION_API_KEY`, `openaiApiKey` from
/// `OPENAI_API_KEY`, and so on.
#[derive(Debug, Default, Clone)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(env_var_name(name)).ok()
    }
}

/// Credentials read once from a TOML file of the form
///
/// ```toml
/// [keys]
/// pollinationApiKey = "..."
/// ```
#[derive(Debug, Default, Clone, Deserialize)]
pub struct KeyFile {
    #[serde(default)]
    keys: HashMap<String, String>,
}

impl KeyFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let s = fs::read_to_string(path)?;
        Ok(toml::from_str(&s)?)
    }
}

impl CredentialSource for KeyFile {
    fn lookup(&self, name: &str) -> Option<String> {
        self.keys.get(name).cloned()
    }
}

/// First source with a non-blank value wins.
#[derive(Default)]
pub struct Chain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl CredentialSource for Chain {
    fn lookup(&self, name: &str) -> Option<String> {
        self.sources.iter().find_map(|s| resolve(s.as_ref(), name))
    }
}

/// Trimmed lookup; blank values count as absent.
pub fn resolve(source: &dyn CredentialSource, name: &str) -> Option<String> {
    source
        .lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `pollinationApiKey` -> `POLLINATION_API_KEY`
pub fn env_var_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        if ch == '-' || ch == '.' || ch == ' ' {
            out.push('_');
            prev_lower = false;
            continue;
        }
        prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
        out.push(ch.to_ascii_uppercase());
    }
    out
}

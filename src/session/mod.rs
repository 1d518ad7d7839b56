use anyhow::{Context, Result};
use chrono::Utc;
use fs_err as fs;
use std::path::{Path, PathBuf};

use crate::preview::{self, IsolationPolicy};
use crate::wire::CodeBundle;

pub const PLAN_FILE: &str = "plan.md";
pub const HTML_FILE: &str = "index.html";
pub const CSS_FILE: &str = "style.css";
pub const JS_FILE: &str = "script.js";
pub const PREVIEW_FILE: &str = "preview.html";
const HISTORY_DIR: &str = ".vibe/history";

/// A site under construction on disk. The core never touches files; this is
/// the host's store.
pub struct Session {
    root: PathBuf,
}

impl Session {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn save_plan(&self, plan: &str) -> Result<PathBuf> {
        let p = self.root.join(PLAN_FILE);
        fs::write(&p, plan)?;
        Ok(p)
    }

    pub fn load_plan(&self) -> Result<String> {
        fs::read_to_string(self.root.join(PLAN_FILE))
            .with_context(|| format!("no plan in {}; run `plan` or `generate` first", self.root.display()))
    }

    pub fn has_bundle(&self) -> bool {
        self.root.join(HTML_FILE).is_file()
    }

    /// Missing css/js files read as empty; a missing html file is an error.
    pub fn load_bundle(&self) -> Result<CodeBundle> {
        let html = fs::read_to_string(self.root.join(HTML_FILE))
            .with_context(|| format!("no site in {}; run `generate` first", self.root.display()))?;
        Ok(CodeBundle {
            html,
            css: read_or_empty(&self.root.join(CSS_FILE))?,
            js: read_or_empty(&self.root.join(JS_FILE))?,
        })
    }

    /// Writes the three parts, snapshotting the previous bundle into history.
    pub fn save_bundle(&self, bundle: &CodeBundle) -> Result<()> {
        if self.has_bundle() {
            let prev = self.load_bundle()?;
            if &prev != bundle {
                self.push_history(&prev)?;
            }
        }
        self.write_parts(bundle)
    }

    /// Composes the bundle and writes a sandboxed host page for it.
    pub fn write_preview(&self, bundle: &CodeBundle, policy: &IsolationPolicy) -> Result<PathBuf> {
        let p = self.root.join(PREVIEW_FILE);
        fs::write(&p, preview::compose(bundle).host_page(policy))?;
        Ok(p)
    }

    /// Restores the most recent snapshot. Returns `None` when history is empty.
    pub fn undo(&self) -> Result<Option<CodeBundle>> {
        let Some(last) = self.history()?.pop() else {
            return Ok(None);
        };
        let s = fs::read_to_string(&last)?;
        let bundle: CodeBundle =
            serde_json::from_str(&s).with_context(|| format!("parsing {}", last.display()))?;
        self.write_parts(&bundle)?;
        fs::remove_file(&last)?;
        Ok(Some(bundle))
    }

    /// Snapshot files, oldest first.
    pub fn history(&self) -> Result<Vec<PathBuf>> {
        let dir = self.root.join(HISTORY_DIR);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                out.push(path);
            }
        }
        out.sort();
        Ok(out)
    }

    fn push_history(&self, bundle: &CodeBundle) -> Result<()> {
        let dir = self.root.join(HISTORY_DIR);
        fs::create_dir_all(&dir)?;
        let seq = self.history()?.len();
        let name = format!("{:05}-{}.json", seq, Utc::now().format("%Y%m%dT%H%M%S"));
        fs::write(dir.join(name), serde_json::to_string_pretty(bundle)?)?;
        Ok(())
    }

    fn write_parts(&self, bundle: &CodeBundle) -> Result<()> {
        fs::write(self.root.join(HTML_FILE), &bundle.html)?;
        fs::write(self.root.join(CSS_FILE), &bundle.css)?;
        fs::write(self.root.join(JS_FILE), &bundle.js)?;
        Ok(())
    }
}

fn read_or_empty(path: &Path) -> Result<String> {
    if path.exists() {
        Ok(fs::read_to_string(path)?)
    } else {
        Ok(String::new())
    }
}

//! Assembles a bundle into one renderable document and describes how a host
//! must isolate it.
//!
//! Bundle content comes from a model and may contain arbitrary script. The
//! document is meant for a sandboxed frame with scripts enabled, an opaque
//! origin of its own, and no access to the host's storage, navigation or top
//! browsing context.

use crate::wire::CodeBundle;

/// Sandbox tokens granted to the preview frame.
///
/// `allow-same-origin` is never granted: together with `allow-scripts` on
/// `srcdoc` content it would hand the frame the host's origin and storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsolationPolicy {
    pub allow_scripts: bool,
    pub allow_modals: bool,
}

impl Default for IsolationPolicy {
    fn default() -> Self {
        Self { allow_scripts: true, allow_modals: true }
    }
}

impl IsolationPolicy {
    /// Value for an iframe `sandbox` attribute.
    pub fn sandbox_attr(&self) -> String {
        let mut tokens = Vec::new();
        if self.allow_scripts {
            tokens.push("allow-scripts");
        }
        if self.allow_modals {
            tokens.push("allow-modals");
        }
        tokens.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    pub text: String,
}

/// Style in the head, markup in the body, script after the markup.
pub fn compose(bundle: &CodeBundle) -> PreviewDocument {
    let mut text = String::with_capacity(bundle.total_bytes() + 256);
    text.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    text.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    text.push_str("<style>\n");
    text.push_str(&bundle.css);
    text.push_str("\n</style>\n</head>\n<body>\n");
    text.push_str(&bundle.html);
    text.push_str("\n<script>\n");
    text.push_str(&bundle.js);
    text.push_str("\n</script>\n</body>\n</html>\n");
    PreviewDocument { text }
}

impl PreviewDocument {
    /// A sandboxed `<iframe>` carrying this document as `srcdoc`.
    pub fn iframe_tag(&self, policy: &IsolationPolicy) -> String {
        format!(
            "<iframe title=\"Preview\" sandbox=\"{}\" referrerpolicy=\"no-referrer\" srcdoc=\"{}\"></iframe>",
            policy.sandbox_attr(),
            escape_attr(&self.text)
        )
    }

    /// Minimal page hosting the sandboxed frame, suitable for opening from disk.
    pub fn host_page(&self, policy: &IsolationPolicy) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Preview</title>\n\
<style>html,body{{margin:0;height:100%}}iframe{{border:0;width:100%;height:100%;display:block}}</style>\n\
</head>\n<body>\n{}\n</body>\n</html>\n",
            self.iframe_tag(policy)
        )
    }
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

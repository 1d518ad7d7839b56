//! Natural-language website generation: plan, generate and edit a
//! three-part HTML/CSS/JS bundle through a remote text model, and compose it
//! into a sandboxed preview.

pub mod config;
pub mod credentials;
pub mod errors;
pub mod extract;
pub mod log;
pub mod pipeline;
pub mod preview;
pub mod prompt;
pub mod provider;
pub mod session;
pub mod wire;

pub use errors::RequestError;
pub use extract::{extract, extract_with_source};
pub use pipeline::SiteGenerator;
pub use preview::{compose, IsolationPolicy, PreviewDocument};
pub use provider::{Requester, Transport};
pub use wire::{CodeBundle, ExtractionSource, PromptContext};

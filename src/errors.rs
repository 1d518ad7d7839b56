use thiserror::Error;

/// Failures of a single outbound request.
///
/// Extraction never produces one of these; malformed model output degrades to
/// placeholder content instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The transport needs a credential and the credential source had none.
    #[error("configuration error: credential `{name}` is not set")]
    Configuration { name: String },

    /// The call did not complete (`status` is `None`) or came back non-2xx.
    #[error("transport error ({}): {body}", display_status(.status))]
    Transport { status: Option<u16>, body: String },
}

impl RequestError {
    pub fn transport(status: Option<u16>, body: impl Into<String>) -> Self {
        RequestError::Transport { status, body: body.into() }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, RequestError::Configuration { .. })
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(e: reqwest::Error) -> Self {
        RequestError::Transport {
            status: e.status().map(|s| s.as_u16()),
            body: e.to_string(),
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no response".to_string(),
    }
}

use thiserror::Error;

/// Uniform error shape for every failed call to the transcription service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The service answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("{0}")]
    Transport(String),
    /// The response body could not be decoded.
    #[error("invalid response from server: {0}")]
    Decode(String),
}

impl ApiError {
    /// Normalizes a non-2xx response.
    ///
    /// The service reports errors as `{"detail": "..."}`, or as a list of
    /// `{"msg": "..."}` items for request validation failures.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = detail_message(body)
            .unwrap_or_else(|| format!("Request failed with status code {status}"));
        ApiError::Http { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Transport failures and server-side errors may succeed on a later attempt.
    pub fn is_retriable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Http { status, .. } => *status >= 500,
            ApiError::Decode(_) => false,
        }
    }
}

fn detail_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

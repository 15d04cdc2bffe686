use std::time::Duration;

/// Failure of one outbound provider call. Never escapes a pipeline entry
/// point; callers turn it into a note.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Carries the limit when the pipeline enforced it; `None` when the
    /// HTTP client gave up on its own.
    #[error("request timed out{}", after(.0))]
    Timeout(Option<Duration>),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("provider not configured: {0}")]
    NotConfigured(&'static str),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(None)
        } else if let Some(status) = err.status() {
            ProviderError::Status(status.as_u16())
        } else if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

fn after(limit: &Option<Duration>) -> String {
    limit.map(|d| format!(" after {d:?}")).unwrap_or_default()
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_the_limit_only_when_known() {
        let enforced = ProviderError::Timeout(Some(Duration::from_millis(50)));
        assert_eq!(enforced.to_string(), "request timed out after 50ms");
        assert_eq!(ProviderError::Timeout(None).to_string(), "request timed out");
    }
}

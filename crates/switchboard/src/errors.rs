use reqwest::StatusCode;
use thiserror::Error;

// Upstream statuses are reqwest's; re-exported so callers building or
// matching errors do not need their own reqwest dependency.
pub use reqwest::StatusCode as UpstreamStatus;

/// Failures surfaced by a model client. The HTTP status, when one
/// exists, is what the server uses to pick a user-facing message; raw
/// detail stays in the logs and never reaches the caller.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("upstream returned status {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("failed to reach upstream: {0}")]
    Request(#[from] reqwest::Error),

    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// The HTTP status associated with this failure, whether carried
    /// directly or on the nested transport cause.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ProviderError::Upstream { status, .. } => Some(*status),
            ProviderError::Request(err) => err.status(),
            ProviderError::Malformed(_) => None,
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_is_direct() {
        let err = ProviderError::Upstream {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: "slow down".to_string(),
        };
        assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
    }

    #[test]
    fn test_malformed_has_no_status() {
        let err = ProviderError::Malformed("not json".to_string());
        assert_eq!(err.status(), None);
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned HTTP {0}")]
    Status(u16),
    #[error("could not parse provider response: {0}")]
    Parse(String),
    #[error("provider timed out")]
    Timeout,
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("every advisory endpoint failed")]
    Exhausted,
}

impl From<turb_core::FeedParseError> for FeedError {
    fn from(err: turb_core::FeedParseError) -> Self {
        FeedError::Parse(err.to_string())
    }
}

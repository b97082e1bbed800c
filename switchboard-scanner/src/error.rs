use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<url::ParseError> for ScanError {
    fn from(err: url::ParseError) -> Self {
        ScanError::InvalidUrl(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;

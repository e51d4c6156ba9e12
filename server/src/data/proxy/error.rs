use thiserror::Error;

/// Failure talking to the provenance proxy
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Failed to parse {endpoint} response: {message}")]
    Parse {
        endpoint: &'static str,
        message: String,
    },

    #[error("Invalid proxy URL: {0}")]
    InvalidUrl(String),
}

impl ProxyError {
    pub fn parse(endpoint: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            endpoint,
            message: err.to_string(),
        }
    }
}

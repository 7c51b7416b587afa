//! Error types for the course search portal client.

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("Request to {url} failed")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Portal returned HTTP {status} for {url}")]
    BadStatus { status: u16, url: String },
    #[error("Invalid portal URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),
}

use reqwest::StatusCode;
use thiserror::Error;

/// Failures while minting the signed assertion. These happen before any
/// request is made and abort the run.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("private key is not a valid EC PKCS#8 key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("system clock is before the Unix epoch")]
    Clock(#[from] std::time::SystemTimeError),
}

/// Failures while looking up the current build number. Every variant is
/// absorbed into the fallback build number by the resolver.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("GET {path} failed {status}: {body}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no pre-release versions found")]
    NoPreReleaseVersions,

    #[error("no builds found for pre-release version {version_id}")]
    NoBuilds { version_id: String },

    #[error("resource is missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("build version {value:?} is not a build number")]
    InvalidBuildNumber { value: String },
}

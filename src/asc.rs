use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::{Credentials, DEFAULT_BASE_URL};
use crate::error::{ResolutionError, SigningError};
use crate::model::{BuildRecord, PreReleaseVersion};
use crate::util::first_resource;

pub const AUDIENCE: &str = "appstoreconnect-v1";
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub exp: u64,
    pub aud: String,
}

/// A signed ES256 assertion presented as `Authorization: Bearer`.
#[derive(Debug, Clone)]
pub struct BearerToken {
    value: String,
    expires_at: SystemTime,
}

impl BearerToken {
    /// Signs a token valid for [`TOKEN_LIFETIME`] from `now`.
    pub fn mint(credentials: &Credentials, now: SystemTime) -> Result<Self, SigningError> {
        let expires_at = now + TOKEN_LIFETIME;
        let claims = Claims {
            iss: credentials.issuer_id.clone(),
            exp: expires_at.duration_since(UNIX_EPOCH)?.as_secs(),
            aud: AUDIENCE.to_string(),
        };
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(credentials.key_id.clone());
        header.typ = Some("JWT".to_string());

        let key = EncodingKey::from_ec_pem(credentials.p8_private_key_pem.as_bytes())
            .map_err(SigningError::InvalidKey)?;
        let value = encode(&header, &claims, &key).map_err(SigningError::Encode)?;
        Ok(Self { value, expires_at })
    }

    /// Wraps an already-signed token, e.g. one handed to a test client.
    pub fn from_static(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: SystemTime::now() + TOKEN_LIFETIME,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> SystemTime {
        self.expires_at
    }
}

pub struct AppStoreConnectClient {
    http: Client,
    base_url: Url,
    token: BearerToken,
}

impl AppStoreConnectClient {
    pub fn new(token: BearerToken) -> Result<Self, ResolutionError> {
        let http = Client::builder()
            .user_agent(concat!("asc-build-number/", env!("CARGO_PKG_VERSION")))
            .use_rustls_tls()
            .build()?;
        let base_url = Url::parse(DEFAULT_BASE_URL)?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Overrides the base URL for API requests. Useful for tests with a mock server.
    /// Resource paths are joined under it, so it should end in `/v1/`.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Replaces the HTTP client, e.g. one with a request timeout.
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ResolutionError> {
        let url = self.base_url.join(path)?;
        let res = self
            .http
            .get(url)
            .query(query)
            .header("Authorization", format!("Bearer {}", self.token.as_str()))
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(ResolutionError::Status {
                path: path.to_string(),
                status,
                body: text,
            });
        }
        let v: Value = serde_json::from_str(&text)?;
        debug!(path, bytes = text.len(), "GET ok");
        Ok(v)
    }

    /// The most recent pre-release version of `app_id` on `platform`.
    ///
    /// Relies on the API listing the newest version first; this client does
    /// not sort.
    pub async fn latest_pre_release_version(
        &self,
        app_id: &str,
        platform: &str,
    ) -> Result<PreReleaseVersion, ResolutionError> {
        let doc = self
            .get(
                "preReleaseVersions",
                &[
                    ("limit", "1"),
                    ("filter[app]", app_id),
                    ("filter[platform]", platform),
                ],
            )
            .await?;
        let first = first_resource(&doc).ok_or(ResolutionError::NoPreReleaseVersions)?;
        PreReleaseVersion::from_resource(first)
    }

    /// The first build listed under a pre-release version.
    pub async fn latest_build_for_version(
        &self,
        version_id: &str,
    ) -> Result<BuildRecord, ResolutionError> {
        let path = format!("preReleaseVersions/{}/builds", version_id);
        let doc = self.get(&path, &[]).await?;
        let first = first_resource(&doc).ok_or_else(|| ResolutionError::NoBuilds {
            version_id: version_id.to_string(),
        })?;
        BuildRecord::from_resource(first)
    }
}

//! Dell warranty API client.
//!
//! Authenticates once with the OAuth2 client-credentials flow and keeps
//! the bearer token for the lifetime of the [`WarrantyClient`]. There is
//! no refresh: build a new client (see [`Connector`]) to get a new token.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dell_lookup::client::{Connector, WarrantyClient};
//! use dell_lookup::ServiceTag;
//!
//! let client = WarrantyClient::authenticate("id", "secret").await?;
//! let headers = client.get_asset_headers(&[ServiceTag::new("ABC123")]).await?;
//! ```

#[cfg(test)]
pub(crate) mod mock;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::env;
use std::fmt;

use crate::config::{mask_secret, AppConfig};
use crate::error::{ClientError, ClientResult};
use crate::models::{AssetHeader, AssetWarranty, ServiceTag};

/// Token endpoint for the client-credentials exchange
pub const DEFAULT_AUTH_URL: &str = "https://apigtwb2c.us.dell.com/auth/oauth/v2/token";

/// Versioned base path of the data endpoints
pub const DEFAULT_BASE_URL: &str = "https://apigtwb2c.us.dell.com/PROD/sbil/eapi/v5";

/// Largest number of service tags the API accepts in one request
pub const MAX_BATCH_SIZE: usize = 100;

/// Data endpoints of the warranty API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Asset headers (model, ship date), batched
    AssetHeaders,
    /// Warranty entitlements, batched
    AssetWarranty,
    /// Component details, single tag
    AssetDetails,
    /// Entitlements plus components, single tag
    AssetSummary,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::AssetHeaders => "assets",
            Endpoint::AssetWarranty => "asset-entitlements",
            Endpoint::AssetDetails => "asset-components",
            Endpoint::AssetSummary => "asset-entitlement-components",
        }
    }
}

/// Where the token and data endpoints live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub auth_url: String,
    pub base_url: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Client ID/secret pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &mask_secret(&self.client_id))
            .field("client_secret", &mask_secret(&self.client_secret))
            .finish()
    }
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Resolve credentials from `CLIENT_ID`/`CLIENT_SECRET`, falling back
    /// to the config file for whichever variable is unset or empty.
    pub fn resolve(config: &AppConfig) -> ClientResult<Self> {
        // .env is optional
        let _ = dotenvy::dotenv();

        Self::from_sources(
            env::var("CLIENT_ID").ok(),
            env::var("CLIENT_SECRET").ok(),
            config,
        )
    }

    /// Pick each value from `env_*` when non-empty, else from `config`.
    pub fn from_sources(
        env_id: Option<String>,
        env_secret: Option<String>,
        config: &AppConfig,
    ) -> ClientResult<Self> {
        let pick = |env_value: Option<String>, fallback: &str| {
            env_value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| fallback.trim().to_string())
        };

        let client_id = pick(env_id, &config.dell.client_id);
        let client_secret = pick(env_secret, &config.dell.client_secret);

        if client_id.is_empty() || client_secret.is_empty() {
            return Err(ClientError::MissingCredentials);
        }

        Ok(Self { client_id, client_secret })
    }
}

/// Builds authenticated clients on demand.
///
/// Each [`Connector::connect`] performs its own token exchange.
#[derive(Debug, Clone)]
pub struct Connector {
    endpoints: ApiEndpoints,
    credentials: Credentials,
}

impl Connector {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            endpoints: ApiEndpoints::default(),
            credentials,
        }
    }

    /// Connector using credentials from the environment or `config`
    pub fn from_config(config: &AppConfig) -> ClientResult<Self> {
        Ok(Self::new(Credentials::resolve(config)?))
    }

    pub fn with_endpoints(mut self, endpoints: ApiEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub async fn connect(&self) -> ClientResult<WarrantyClient> {
        WarrantyClient::authenticate_with(
            self.endpoints.clone(),
            &self.credentials.client_id,
            &self.credentials.client_secret,
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Authenticated warranty API client
pub struct WarrantyClient {
    http: reqwest::Client,
    endpoints: ApiEndpoints,
    token: String,
}

impl WarrantyClient {
    /// Authenticate against the production API
    pub async fn authenticate(client_id: &str, client_secret: &str) -> ClientResult<Self> {
        Self::authenticate_with(ApiEndpoints::default(), client_id, client_secret).await
    }

    /// Authenticate against explicit endpoints
    pub async fn authenticate_with(
        endpoints: ApiEndpoints,
        client_id: &str,
        client_secret: &str,
    ) -> ClientResult<Self> {
        let http = reqwest::Client::new();

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];

        let response = http
            .post(&endpoints.auth_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ClientError::Authentication(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Authentication(e.to_string()))?;

        if !status.is_success() {
            return Err(ClientError::Authentication(format!("HTTP {}: {}", status, body)));
        }

        let token = serde_json::from_str::<TokenResponse>(&body)
            .ok()
            .and_then(|t| t.access_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ClientError::Authentication("Failed to retrieve access token".to_string())
            })?;

        Ok(Self { http, endpoints, token })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    /// Authenticated GET against one of the data endpoints.
    pub async fn lookup(&self, endpoint: Endpoint, params: &[(&str, String)]) -> ClientResult<Value> {
        let url = format!("{}/{}", self.endpoints.base_url.trim_end_matches('/'), endpoint.path());

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(params)
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(ClientError::Request {
                endpoint: endpoint.path().to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Asset headers for any number of tags, one request per chunk of
    /// [`MAX_BATCH_SIZE`]. Tags the API does not know are simply absent
    /// from the result.
    pub async fn get_asset_headers(&self, tags: &[ServiceTag]) -> ClientResult<Vec<AssetHeader>> {
        self.batched(Endpoint::AssetHeaders, tags).await
    }

    /// Warranty entitlements, chunked like [`Self::get_asset_headers`]
    pub async fn get_asset_warranty(&self, tags: &[ServiceTag]) -> ClientResult<Vec<AssetWarranty>> {
        self.batched(Endpoint::AssetWarranty, tags).await
    }

    /// Component details for one tag
    pub async fn get_asset_details(&self, tag: &ServiceTag) -> ClientResult<Value> {
        self.lookup(Endpoint::AssetDetails, &[("servicetag", tag.normalized())])
            .await
    }

    /// Entitlement and component summary for one tag
    pub async fn get_asset_summary(&self, tag: &ServiceTag) -> ClientResult<Value> {
        self.lookup(Endpoint::AssetSummary, &[("servicetag", tag.normalized())])
            .await
    }

    async fn batched<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        tags: &[ServiceTag],
    ) -> ClientResult<Vec<T>> {
        let mut results = Vec::new();

        for chunk in chunk_service_tags(tags) {
            let value = self
                .lookup(endpoint, &[("servicetags", chunk.join(","))])
                .await?;
            let mut records: Vec<T> = serde_json::from_value(value)
                .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
            results.append(&mut records);
        }

        Ok(results)
    }
}

/// Split tags into request-sized batches.
///
/// Tags are normalized, blanks dropped and duplicates removed (first
/// occurrence wins); each batch holds at most [`MAX_BATCH_SIZE`] tags.
pub fn chunk_service_tags(tags: &[ServiceTag]) -> Vec<Vec<String>> {
    let mut seen = HashSet::new();
    let unique: Vec<String> = tags
        .iter()
        .filter(|t| !t.is_blank())
        .map(ServiceTag::normalized)
        .filter(|t| seen.insert(t.clone()))
        .collect();

    unique
        .chunks(MAX_BATCH_SIZE)
        .map(|chunk| chunk.to_vec())
        .collect()
}

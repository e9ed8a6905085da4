//! Datamere REST API client.
//!
//! Thin async wrapper over the platform's HTTP endpoints. Credentials are
//! injected through the [`CredentialProvider`] capability; every
//! identity-requiring call asks it for the current bearer token and fails
//! fast with [`Error::NotAuthenticated`] when none is held. A 401 response
//! maps to the same error so callers can distinguish authentication
//! failures from transient fetch failures.

pub mod error;
pub mod models;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use url::Url;

use crate::config::AppConfig;
use crate::core::credentials::CredentialProvider;
use crate::core::preview::loader::PreviewBackend;
use crate::core::search::controller::SearchBackend;
use crate::core::search::filters::SearchFilters;

pub use error::{Error, Result};
use models::{
    AuthToken, DatasetDetailResponse, DatasetFileRecord, DatasetListResponse,
    DatasetStatsResponse, ErrorBody, PreviewWindowResponse, TagEntry,
};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Async client for the Datamere REST API.
///
/// Cheap to clone; clones share the connection pool and credential
/// provider.
pub struct ApiClient<C: CredentialProvider> {
    http: reqwest::Client,
    base_url: Url,
    credentials: Arc<C>,
}

impl<C: CredentialProvider> Clone for ApiClient<C> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            credentials: Arc::clone(&self.credentials),
        }
    }
}

impl<C: CredentialProvider> ApiClient<C> {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Create a client for the given base URL with the default timeout.
    pub fn new(base_url: &str, credentials: C) -> Result<Self> {
        Self::with_timeout(base_url, credentials, DEFAULT_TIMEOUT)
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &AppConfig, credentials: C) -> Result<Self> {
        Self::with_timeout(&config.api.base_url, credentials, config.timeout())
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(base_url: &str, credentials: C, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {base_url:?}: {e}")))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            credentials: Arc::new(credentials),
        })
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ========================================================================
    // Request Plumbing
    // ========================================================================

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("invalid endpoint path {path:?}: {e}")))
    }

    /// Build a request that must carry the caller's identity.
    ///
    /// Fails with [`Error::NotAuthenticated`] when the credential provider
    /// holds no token.
    async fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self
            .credentials
            .bearer_token()
            .await?
            .ok_or(Error::NotAuthenticated)?;
        let url = self.endpoint(path)?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    /// Build a request for a public endpoint, attaching the bearer token
    /// when one is held (the backend may widen results for known users).
    async fn maybe_authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        let builder = self.http.request(method, url);
        Ok(match self.credentials.bearer_token().await? {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Normalize error statuses, passing successful responses through.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::NotAuthenticated);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            // The backend wraps messages as {"detail": "..."}
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.detail)
                .unwrap_or(body);
            return Err(Error::api(status.as_u16(), message));
        }
        Ok(response)
    }

    /// Map a response to a typed body, normalizing error statuses.
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        Ok(Self::ensure_success(response).await?.json().await?)
    }

    // ========================================================================
    // Auth Operations
    // ========================================================================

    /// Exchange email/password for a bearer token.
    ///
    /// The client does not store the token; feed it to a credential
    /// provider of your choosing.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthToken> {
        let url = self.endpoint("/auth/login")?;
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token: AuthToken = Self::handle_response(response).await?;
        log::info!("Logged in as {email}");
        Ok(token)
    }

    // ========================================================================
    // Search Operations
    // ========================================================================

    /// Search datasets with the given filter state.
    ///
    /// Array-valued filters serialize as repeated query parameters.
    #[instrument(skip(self, filters), fields(page = filters.page, limit = filters.limit))]
    pub async fn search_datasets(&self, filters: &SearchFilters) -> Result<DatasetListResponse> {
        let request = self.authed(Method::GET, "/datasets/filter").await?;
        let response = request.query(&filters.query_pairs()).send().await?;
        let page: DatasetListResponse = Self::handle_response(response).await?;
        log::debug!(
            "Search page {} returned {} of {} datasets (has_next: {})",
            page.page,
            page.datasets.len(),
            page.total_count,
            page.has_next
        );
        Ok(page)
    }

    // ========================================================================
    // Dataset Operations
    // ========================================================================

    /// Fetch full detail for one dataset.
    #[instrument(skip(self))]
    pub async fn get_dataset(&self, dataset_id: i64) -> Result<DatasetDetailResponse> {
        let request = self
            .authed(Method::GET, &format!("/datasets/{dataset_id}"))
            .await?;
        Self::handle_response(request.send().await?).await
    }

    /// List the files attached to a dataset.
    #[instrument(skip(self))]
    pub async fn list_dataset_files(&self, dataset_id: i64) -> Result<Vec<DatasetFileRecord>> {
        let request = self
            .authed(Method::GET, &format!("/datasets/{dataset_id}/files"))
            .await?;
        Self::handle_response(request.send().await?).await
    }

    /// Platform-wide dataset statistics.
    pub async fn get_dataset_stats(&self) -> Result<DatasetStatsResponse> {
        let request = self.maybe_authed(Method::GET, "/datasets/stats").await?;
        Self::handle_response(request.send().await?).await
    }

    /// The tag vocabulary used for filtering.
    pub async fn list_tags(&self) -> Result<Vec<TagEntry>> {
        let request = self.maybe_authed(Method::GET, "/tags").await?;
        Self::handle_response(request.send().await?).await
    }

    // ========================================================================
    // File Operations
    // ========================================================================

    /// Fetch one preview window of a file's parsed content.
    #[instrument(skip(self))]
    pub async fn fetch_preview(
        &self,
        file_id: i64,
        offset: u64,
        max_rows: u32,
    ) -> Result<PreviewWindowResponse> {
        let request = self
            .authed(Method::GET, &format!("/files/{file_id}/preview"))
            .await?;
        let response = request
            .query(&[
                ("offset", offset.to_string()),
                ("max_rows", max_rows.to_string()),
            ])
            .send()
            .await?;
        let window: PreviewWindowResponse = Self::handle_response(response).await?;
        log::debug!(
            "Preview window for file {file_id}: {} rows at offset {} (has_more: {})",
            window.data.len(),
            offset,
            window.has_more
        );
        Ok(window)
    }

    /// Download a file's raw bytes in one buffer. Prefer
    /// [`download_file_to`](Self::download_file_to) for large files.
    #[instrument(skip(self))]
    pub async fn download_file(&self, file_id: i64) -> Result<bytes::Bytes> {
        let request = self
            .authed(Method::GET, &format!("/files/{file_id}"))
            .await?;
        let response = Self::ensure_success(request.send().await?).await?;
        Ok(response.bytes().await?)
    }

    /// Stream a file download to disk. Returns the number of bytes written.
    #[instrument(skip(self, dest))]
    pub async fn download_file_to(&self, file_id: i64, dest: &Path) -> Result<u64> {
        let request = self
            .authed(Method::GET, &format!("/files/{file_id}"))
            .await?;
        let response = Self::ensure_success(request.send().await?).await?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        log::info!("Downloaded file {file_id} to {} ({written} bytes)", dest.display());
        Ok(written)
    }
}

// ============================================================================
// Backend Trait Implementations
// ============================================================================

#[async_trait]
impl<C: CredentialProvider + 'static> SearchBackend for ApiClient<C> {
    async fn search_datasets(&self, filters: &SearchFilters) -> Result<DatasetListResponse> {
        // Dispatches to the inherent method, not this impl.
        self.search_datasets(filters).await
    }
}

#[async_trait]
impl<C: CredentialProvider + 'static> PreviewBackend for ApiClient<C> {
    async fn fetch_preview(
        &self,
        file_id: i64,
        offset: u64,
        max_rows: u32,
    ) -> Result<PreviewWindowResponse> {
        self.fetch_preview(file_id, offset, max_rows).await
    }
}

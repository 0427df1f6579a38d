//! HTTP content store
//!
//! Talks to a Blossom-style blob server: `PUT {endpoint}/upload` stores the
//! request body and answers with a JSON descriptor, `GET {endpoint}/{sha256}`
//! returns the bytes. Both directions are checked against the SHA-256 of the
//! payload so a misbehaving server cannot substitute content.

use std::time::Duration;

use badge_storage_traits::{
    Backend, ContentId, ContentStore, StorageError, StoredFile, StoredObject,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`HttpContentStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStoreConfig {
    /// Base URL of the store
    pub endpoint: String,
    /// Bearer token sent with uploads
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl HttpStoreConfig {
    /// Settings for `endpoint` with no token and the default timeout
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BlobDescriptor {
    url: String,
    sha256: String,
    size: u64,
    #[serde(rename = "type", default)]
    mime_type: Option<String>,
}

/// [`ContentStore`] backed by a remote blob server
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpContentStore {
    /// Build a store client; nothing is sent until the first request
    pub fn new(config: HttpStoreConfig) -> Result<Self, StorageError> {
        let mut endpoint = Url::parse(config.endpoint.trim())
            .map_err(|e| StorageError::InvalidEndpoint(format!("{}: {e}", config.endpoint)))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(StorageError::InvalidEndpoint(format!(
                "{}: unsupported scheme",
                config.endpoint
            )));
        }
        // Url::join replaces the last segment unless the path ends with '/'
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            token: config.token,
        })
    }

    /// Base URL requests are sent to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url(&self, path: &str) -> Result<Url, StorageError> {
        self.endpoint
            .join(path)
            .map_err(|e| StorageError::InvalidEndpoint(format!("{}{path}: {e}", self.endpoint)))
    }
}

/// Reduce a filename to header-safe ASCII
fn header_filename(filename: &str) -> String {
    let mut out = String::with_capacity(filename.len().min(120));
    for ch in filename.chars().take(120) {
        let allowed = ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_';
        out.push(if allowed { ch } else { '_' });
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "file.bin".to_string()
    } else {
        trimmed.to_string()
    }
}

async fn rejection(response: reqwest::Response) -> StorageError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("unknown").to_string()
    } else {
        body.trim().to_string()
    };
    StorageError::Rejected {
        status: status.as_u16(),
        message,
    }
}

impl ContentStore for HttpContentStore {
    fn backend(&self) -> Backend {
        Backend::Http
    }

    async fn put(&self, file: StoredFile) -> Result<StoredObject, StorageError> {
        let expected = file.content_id();
        let url = self.url("upload")?;
        tracing::debug!(%url, name = %file.name, bytes = file.data.len(), "uploading blob");

        let mut request = self
            .client
            .put(url)
            .header(CONTENT_TYPE, file.mime_type.as_str())
            .header("X-Name", header_filename(&file.name))
            .header("X-SHA-256", expected.to_hex());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .body(file.data)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let descriptor: BlobDescriptor = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;
        let actual: ContentId = descriptor.sha256.parse().map_err(|_| {
            StorageError::InvalidResponse(format!("bad sha256 {:?}", descriptor.sha256))
        })?;
        if actual != expected {
            return Err(StorageError::IntegrityMismatch {
                expected: expected.to_hex(),
                actual: actual.to_hex(),
            });
        }

        Ok(StoredObject {
            id: actual,
            url: descriptor.url,
            size: descriptor.size,
            mime_type: descriptor.mime_type.unwrap_or(file.mime_type),
        })
    }

    async fn get(&self, id: &ContentId) -> Result<Option<Vec<u8>>, StorageError> {
        let url = self.url(&id.to_hex())?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;
        if !id.matches(&data) {
            return Err(StorageError::IntegrityMismatch {
                expected: id.to_hex(),
                actual: ContentId::for_data(&data).to_hex(),
            });
        }
        Ok(Some(data.to_vec()))
    }
}

//! Release catalog retrieval.
//!
//! The resolver only needs a list of releases; where they come from is behind
//! [`ReleaseSource`]. [`HttpManifestSource`] fetches the published
//! `version.json`, [`StaticSource`] serves a fixed list.

use std::time::Duration;

use async_trait::async_trait;
use calc_schema::{Manifest, Release};
use reqwest::Client;
use thiserror::Error;

/// Published catalog location.
pub const DEFAULT_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/jondkelley/cicd_golang_calculator/main/version.json";

/// Bound on the whole manifest request.
pub const MANIFEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Why the catalog could not be used.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Transport failure, see [`ManifestError::is_offline`].
    #[error("Failed to reach the release manifest: {0}")]
    Network(#[source] reqwest::Error),

    /// Server answered with something other than `200 OK`.
    #[error("No version.json manifest found (HTTP {0})")]
    Status(u16),

    /// Body is not a valid catalog.
    #[error("Malformed version.json manifest: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Catalog decoded but lists no releases.
    #[error("No releases found in manifest")]
    Empty,
}

impl ManifestError {
    /// True for connectivity failures (DNS, refused, timeout), as opposed to
    /// a server that answered with something unusable.
    pub fn is_offline(&self) -> bool {
        match self {
            Self::Network(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

/// Where releases come from.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch the current catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] when the catalog cannot be retrieved or
    /// decoded, or holds no releases.
    async fn fetch(&self) -> Result<Manifest, ManifestError>;
}

/// Fetches `version.json` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpManifestSource {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpManifestSource {
    /// Source for `url` with [`MANIFEST_TIMEOUT`].
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            timeout: MANIFEST_TIMEOUT,
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Catalog URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ReleaseSource for HttpManifestSource {
    async fn fetch(&self) -> Result<Manifest, ManifestError> {
        tracing::debug!(url = %self.url, "fetching release manifest");

        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(ManifestError::Network)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ManifestError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(ManifestError::Network)?;
        let manifest = Manifest::from_slice(&bytes)?;
        if manifest.is_empty() {
            return Err(ManifestError::Empty);
        }

        tracing::debug!(releases = manifest.releases.len(), "manifest decoded");
        Ok(manifest)
    }
}

/// A fixed catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub Vec<Release>);

#[async_trait]
impl ReleaseSource for StaticSource {
    async fn fetch(&self) -> Result<Manifest, ManifestError> {
        if self.0.is_empty() {
            return Err(ManifestError::Empty);
        }
        Ok(Manifest {
            releases: self.0.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_fetch_manifest() {
        let mut server = Server::new_async().await;
        let body = r#"{
            "releases": [
                { "version": "v1.0.0", "urls": { "linux": "https://example.com/a" }, "isAlpha": false, "isBeta": false, "releaseDate": "2025-01-01T00:00:00Z" },
                { "version": "v1.1.0-beta", "urls": {}, "isAlpha": false, "isBeta": true, "releaseDate": "2025-02-01T00:00:00Z" }
            ]
        }"#;
        let _m = server
            .mock("GET", "/version.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let url = format!("{}/version.json", server.url());
        let source = HttpManifestSource::new(Client::new(), url);
        let manifest = source.fetch().await.unwrap();
        assert_eq!(manifest.releases.len(), 2);
        assert_eq!(manifest.releases[1].version, "v1.1.0-beta");
    }

    #[tokio::test]
    async fn test_fetch_non_200() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/version.json")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/version.json", server.url());
        let source = HttpManifestSource::new(Client::new(), url);
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, ManifestError::Status(404)));
        assert!(!err.is_offline());
    }

    #[tokio::test]
    async fn test_fetch_malformed() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/version.json")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let url = format!("{}/version.json", server.url());
        let source = HttpManifestSource::new(Client::new(), url);
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, ManifestError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_fetch_empty_release_list() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/version.json")
            .with_status(200)
            .with_body(r#"{"releases": []}"#)
            .create_async()
            .await;

        let url = format!("{}/version.json", server.url());
        let source = HttpManifestSource::new(Client::new(), url);
        assert!(matches!(source.fetch().await, Err(ManifestError::Empty)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_offline() {
        // Port 9 (discard) on localhost is closed in test environments.
        let source = HttpManifestSource::new(Client::new(), "http://127.0.0.1:9/version.json")
            .with_timeout(Duration::from_secs(2));
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, ManifestError::Network(_)));
        assert!(err.is_offline());
    }

    #[tokio::test]
    async fn test_silent_server_times_out_as_offline() {
        use tokio::io::AsyncReadExt;

        // Accepts and reads the request but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let source = HttpManifestSource::new(Client::new(), format!("http://{addr}/version.json"))
            .with_timeout(Duration::from_secs(1));
        let err = source.fetch().await.unwrap_err();
        server.abort();

        assert!(matches!(&err, ManifestError::Network(e) if e.is_timeout()), "{err:?}");
        assert!(err.is_offline());
    }

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticSource(vec![Release::new("v1.0.0")]);
        assert_eq!(source.fetch().await.unwrap().releases.len(), 1);
        assert!(matches!(
            StaticSource::default().fetch().await,
            Err(ManifestError::Empty)
        ));
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LauncherConfig;
use crate::error::{LauncherError, LauncherResult};

/// Remote `version.json`: the latest build and where to get it.
///
/// `{ "version": "1.3.0", "buildUrl": "https://.../build.zip", "notes": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub build_url: String,
    #[serde(default)]
    pub notes: String,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

impl VersionDescriptor {
    pub fn parse(text: &str) -> LauncherResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Where the launcher learns about the latest build.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// `None` means "unavailable": callers treat it as offline, never as a hard failure.
    async fn fetch(&self) -> Option<VersionDescriptor>;
}

pub struct HttpManifestSource {
    client: reqwest::Client,
    url: String,
    timeout: std::time::Duration,
}

impl HttpManifestSource {
    pub fn new(client: reqwest::Client, config: &LauncherConfig) -> Self {
        Self {
            client,
            url: config.manifest_url.clone(),
            timeout: config.request_timeout,
        }
    }

    pub async fn try_fetch(&self) -> LauncherResult<VersionDescriptor> {
        log::info!("Fetching version manifest from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|e| self.map_transport(e))?;
        VersionDescriptor::parse(&text)
    }

    fn map_transport(&self, e: reqwest::Error) -> LauncherError {
        if e.is_timeout() {
            LauncherError::Timeout { url: self.url.clone() }
        } else {
            LauncherError::Http(e)
        }
    }
}

#[async_trait]
impl ManifestSource for HttpManifestSource {
    async fn fetch(&self) -> Option<VersionDescriptor> {
        match self.try_fetch().await {
            Ok(descriptor) => {
                log::info!("Remote version: {}", descriptor.version);
                Some(descriptor)
            }
            Err(e) => {
                log::warn!("Failed to check updates: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_descriptor() {
        let d = VersionDescriptor::parse(
            r#"{"version":"1.3.0","buildUrl":"https://x/build.zip","notes":"Bug fixes"}"#,
        )
        .unwrap();
        assert_eq!(d.version, "1.3.0");
        assert_eq!(d.build_url, "https://x/build.zip");
        assert_eq!(d.notes, "Bug fixes");
    }

    #[test]
    fn missing_fields_default_and_unknown_are_ignored() {
        let d = VersionDescriptor::parse(r#"{"buildUrl":"https://x/b.zip","channel":"beta"}"#).unwrap();
        assert_eq!(d.version, "0.0.0");
        assert_eq!(d.build_url, "https://x/b.zip");
        assert_eq!(d.notes, "");
    }

    #[test]
    fn malformed_payload_is_parse_error() {
        let err = VersionDescriptor::parse("<!doctype html>").unwrap_err();
        assert!(matches!(err, LauncherError::Parse(_)));
        assert!(!err.is_network());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_unavailable() {
        // Port 9 (discard) on localhost is almost never listening.
        let cfg = LauncherConfig::from_base_dir("/tmp")
            .with_manifest_url("http://127.0.0.1:9/version.json");
        let source = HttpManifestSource::new(reqwest::Client::new(), &cfg);

        let err = source.try_fetch().await.unwrap_err();
        assert!(err.is_network());
        assert_eq!(source.fetch().await, None);
    }
}

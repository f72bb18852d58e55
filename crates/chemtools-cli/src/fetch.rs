use crate::error::Result;
use async_trait::async_trait;
use chemtools::engine::embed::{EmbedError, ScriptFetcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Loads embed sources for the terminal browser.
///
/// Remote sources are fetched over HTTP(S). Anything else is treated as a local asset and must
/// exist as a file, resolved against `assets_dir` when it is relative.
pub struct HttpScriptFetcher {
    client: reqwest::Client,
    assets_dir: Option<PathBuf>,
    offline: bool,
}

impl HttpScriptFetcher {
    pub fn new(assets_dir: Option<PathBuf>, offline: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("chemtools/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            assets_dir,
            offline,
        })
    }

    fn local_path(&self, src: &str) -> PathBuf {
        let path = Path::new(src);
        match &self.assets_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    async fn fetch_remote(&self, src: &str) -> std::result::Result<(), EmbedError> {
        if self.offline {
            return Err(EmbedError::load(src, "offline mode"));
        }
        let response = self
            .client
            .get(src)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!(src, error = %e, "Remote source failed to load.");
                EmbedError::load(src, e.to_string())
            })?;
        debug!(src, status = %response.status(), "Remote source loaded.");
        Ok(())
    }

    async fn fetch_local(&self, src: &str) -> std::result::Result<(), EmbedError> {
        let path = self.local_path(src);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {
                debug!(src, path = ?path, "Local source found.");
                Ok(())
            }
            Ok(_) => Err(EmbedError::load(src, format!("{} is not a file", path.display()))),
            Err(e) => Err(EmbedError::load(src, format!("{}: {}", path.display(), e))),
        }
    }
}

fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

#[async_trait]
impl ScriptFetcher for HttpScriptFetcher {
    async fn fetch(&self, src: &str) -> std::result::Result<(), EmbedError> {
        if is_remote(src) {
            self.fetch_remote(src).await
        } else {
            self.fetch_local(src).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn offline_mode_fails_remote_sources_fast() {
        let fetcher = HttpScriptFetcher::new(None, true).unwrap();
        let err = fetcher
            .fetch("https://www.nmrium.org/nmrium")
            .await
            .unwrap_err();
        assert_eq!(err.source_url(), "https://www.nmrium.org/nmrium");
        assert_eq!(
            err,
            EmbedError::load("https://www.nmrium.org/nmrium", "offline mode")
        );
    }

    #[tokio::test]
    async fn local_sources_resolve_against_assets_dir() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Ketcher")).unwrap();
        fs::write(dir.path().join("Ketcher/index.html"), "<html></html>").unwrap();

        let fetcher = HttpScriptFetcher::new(Some(dir.path().to_path_buf()), true).unwrap();
        assert!(fetcher.fetch("Ketcher/index.html").await.is_ok());
        assert!(fetcher.fetch("Ketcher/missing.html").await.is_err());
    }

    #[tokio::test]
    async fn directories_are_not_loadable_sources() {
        let dir = tempdir().unwrap();
        let fetcher = HttpScriptFetcher::new(Some(dir.path().to_path_buf()), false).unwrap();
        let err = fetcher.fetch(".").await.unwrap_err();
        assert!(matches!(err, EmbedError::Load { reason, .. } if reason.contains("not a file")));
    }

    #[test]
    fn only_http_schemes_are_remote() {
        assert!(is_remote("https://cdnjs.cloudflare.com/x.js"));
        assert!(is_remote("http://localhost:8080/x.js"));
        assert!(!is_remote("Ketcher/index.html"));
        assert!(!is_remote("/opt/assets/3Dmol-min.js"));
    }
}

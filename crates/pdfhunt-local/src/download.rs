use crate::config::DownloadConfig;
use crate::sanitize::sanitized_file_name;
use futures_util::StreamExt;
use pdfhunt_core::{DownloadBackend, DownloadOutcome, Error, Result, SearchCandidate};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

fn local_io(path: &Path, e: std::io::Error) -> Error {
    Error::LocalIo {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Links come from untrusted markup; spaces are the one thing we repair before parsing.
fn request_url(link: &str) -> Result<url::Url> {
    let link = link.trim().replace(' ', "%20");
    url::Url::parse(&link).map_err(|e| Error::InvalidUrl(format!("{link}: {e}")))
}

/// Streams a candidate into `<dest_dir>/<sanitized title><ext>`.
#[derive(Debug, Clone)]
pub struct LocalDownloader {
    client: reqwest::Client,
    config: DownloadConfig,
}

impl LocalDownloader {
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .connect_timeout(Duration::from_secs(10))
            .read_timeout(config.read_timeout)
            .build()
            .map_err(|e| Error::NotConfigured(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(DownloadConfig::from_env())
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Best-effort removal of a partially written file. The original error wins.
    async fn discard_partial(file: tokio::fs::File, path: &Path, err: Error) -> Error {
        drop(file);
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "could not remove partial download");
        }
        err
    }
}

#[async_trait::async_trait]
impl DownloadBackend for LocalDownloader {
    async fn download(
        &self,
        candidate: &SearchCandidate,
        target_extension: &str,
    ) -> Result<DownloadOutcome> {
        let url = request_url(&candidate.link)?;
        tracing::debug!(url = %url, "download request");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let filename = sanitized_file_name(&candidate.title, target_extension);
        let path = self.config.dest_dir.join(&filename);
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| local_io(&path, e))?;

        let mut bytes: u64 = 0;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    return Err(Self::discard_partial(file, &path, Error::Read(e.to_string())).await)
                }
            };
            let written = file.write_all(&chunk).await;
            if let Err(e) = written {
                return Err(Self::discard_partial(file, &path, local_io(&path, e)).await);
            }
            bytes += chunk.len() as u64;
        }
        let flushed = file.flush().await;
        if let Err(e) = flushed {
            return Err(Self::discard_partial(file, &path, local_io(&path, e)).await);
        }

        tracing::info!(path = %path.display(), bytes, "downloaded");
        Ok(DownloadOutcome {
            filename,
            path,
            bytes,
            status: status.as_u16(),
        })
    }
}

/// Download into the current directory with default settings (env overrides applied).
pub async fn download(
    candidate: &SearchCandidate,
    target_extension: &str,
) -> Result<DownloadOutcome> {
    LocalDownloader::from_env()?
        .download(candidate, target_extension)
        .await
}

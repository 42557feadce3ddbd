use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// File extension the pipeline targets when the caller does not pick one.
pub const DEFAULT_TARGET_EXTENSION: &str = ".pdf";

/// Result cap applied when the caller does not pick one.
pub const DEFAULT_MAX_RESULTS: usize = 10;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("read failed: {0}")]
    Read(String),
    #[error("http status {status} {reason}")]
    HttpStatus { status: u16, reason: String },
    #[error("local io failed for {path}: {message}")]
    LocalIo { path: PathBuf, message: String },
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl Error {
    /// Stable tag for machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidUrl(_) => "invalid_url",
            Error::Transport(_) => "transport",
            Error::Read(_) => "read",
            Error::HttpStatus { .. } => "http_status",
            Error::LocalIo { .. } => "local_io",
            Error::NotConfigured(_) => "not_configured",
        }
    }

    /// Transport and read failures are reported the same way by callers.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Read(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// One extracted search result.
///
/// `link` is untrusted text taken verbatim from the results page; it is not validated as a URL
/// until something tries to fetch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query (tokens already joined with single spaces).
    pub query: String,
    /// Literal suffix, e.g. `.pdf`. Used for the provider filter token and the link filter.
    pub target_extension: String,
    pub max_results: usize,
    /// Skip links that were already retained (off by default: duplicates count toward the cap).
    pub dedup_links: bool,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            target_extension: DEFAULT_TARGET_EXTENSION.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            dedup_links: false,
        }
    }

    /// Join caller-supplied tokens with single spaces.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = tokens
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        Self::new(joined)
    }

    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        self.target_extension = ext.into();
        self
    }

    pub fn with_max_results(mut self, n: usize) -> Self {
        self.max_results = n;
        self
    }

    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup_links = dedup;
        self
    }

    /// Extension without its leading dot (`.pdf` -> `pdf`), as used in filter tokens.
    pub fn extension_token(&self) -> &str {
        self.target_extension.trim_start_matches('.')
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub candidates: Vec<SearchCandidate>,
    pub provider: String,
    /// Status of the results page. Non-2xx pages are still parsed.
    pub http_status: u16,
    /// Raw anchor pairs seen before filtering.
    pub extracted: usize,
    pub timings_ms: BTreeMap<String, u128>,
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;
    async fn search(&self, q: &SearchQuery) -> Result<SearchResponse>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadOutcome {
    /// Sanitized file name (title + extension).
    pub filename: String,
    pub path: PathBuf,
    pub bytes: u64,
    pub status: u16,
}

#[async_trait::async_trait]
pub trait DownloadBackend: Send + Sync {
    async fn download(
        &self,
        candidate: &SearchCandidate,
        target_extension: &str,
    ) -> Result<DownloadOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_tokens_joins_with_single_spaces() {
        let q = SearchQuery::from_tokens(["rust", "async", "book"]);
        assert_eq!(q.query, "rust async book");
        assert_eq!(q.target_extension, ".pdf");
        assert_eq!(q.max_results, 10);
        assert!(!q.dedup_links);
    }

    #[test]
    fn extension_token_drops_leading_dot() {
        let q = SearchQuery::new("x").with_extension(".epub");
        assert_eq!(q.extension_token(), "epub");
        let q = SearchQuery::new("x").with_extension("pdf");
        assert_eq!(q.extension_token(), "pdf");
    }

    #[test]
    fn error_kinds_are_stable() {
        assert_eq!(Error::Transport("x".into()).kind(), "transport");
        assert_eq!(
            Error::HttpStatus {
                status: 404,
                reason: "Not Found".into()
            }
            .kind(),
            "http_status"
        );
        assert!(Error::Read("eof".into()).is_network());
        assert!(!Error::InvalidUrl("nope".into()).is_network());
    }

    #[test]
    fn http_status_error_surfaces_status_text() {
        let e = Error::HttpStatus {
            status: 404,
            reason: "Not Found".into(),
        };
        assert_eq!(e.to_string(), "http status 404 Not Found");
    }

    #[test]
    fn candidate_serializes_as_title_and_link() {
        let c = SearchCandidate {
            title: "My Report".into(),
            link: "https://x.com/doc.pdf".into(),
        };
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["title"].as_str(), Some("My Report"));
        assert_eq!(v["link"].as_str(), Some("https://x.com/doc.pdf"));
    }
}

//! Provider and download configuration.
//!
//! Defaults are constants; `from_env` applies `PDFHUNT_*` overrides so tests and alternate
//! providers can be swapped in without touching extraction.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
/// Longest silence tolerated mid-download. A transfer that keeps making progress has no cap.
pub const DEFAULT_DOWNLOAD_READ_TIMEOUT: Duration = Duration::from_secs(60);

const MIN_TIMEOUT_MS: u64 = 1_000;
const MAX_TIMEOUT_MS: u64 = 120_000;

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_timeout(key: &str) -> Option<Duration> {
    env_nonempty(key)
        .and_then(|s| s.parse::<u64>().ok())
        .map(clamp_timeout_ms)
}

/// Keep timeouts inside a sane window even if callers pass something huge (or zero).
pub fn clamp_timeout_ms(ms: u64) -> Duration {
    Duration::from_millis(ms.clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Yahoo,
    DuckDuckGo,
}

impl ProviderKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Some(Self::Yahoo),
            "duckduckgo" | "ddg" => Some(Self::DuckDuckGo),
            _ => None,
        }
    }

    pub fn config(self) -> ProviderConfig {
        match self {
            Self::Yahoo => ProviderConfig::yahoo(),
            Self::DuckDuckGo => ProviderConfig::duckduckgo(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub name: String,
    /// Results-page URL; the query is appended as `q=...`.
    pub endpoint: String,
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
    /// Appended to the encoded query after a `+`. `{ext}` is replaced by the extension token.
    pub filter_template: String,
    pub unwrap_redirects: bool,
}

fn browser_headers(referer: &str) -> BTreeMap<String, String> {
    let mut h = BTreeMap::new();
    h.insert("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string());
    h.insert(
        "Accept".to_string(),
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
    );
    h.insert("Accept-Language".to_string(), "en-US,en;q=0.5".to_string());
    h.insert("Connection".to_string(), "keep-alive".to_string());
    h.insert("Referer".to_string(), referer.to_string());
    h
}

impl ProviderConfig {
    pub fn yahoo() -> Self {
        Self {
            name: "yahoo".to_string(),
            endpoint: "https://search.yahoo.com/search".to_string(),
            headers: browser_headers("https://search.brave.com/"),
            timeout: DEFAULT_SEARCH_TIMEOUT,
            filter_template: "filetype:{ext}".to_string(),
            unwrap_redirects: false,
        }
    }

    pub fn duckduckgo() -> Self {
        Self {
            name: "duckduckgo".to_string(),
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
            headers: browser_headers("https://duckduckgo.com/"),
            timeout: DEFAULT_SEARCH_TIMEOUT,
            filter_template: "ext:{ext}".to_string(),
            unwrap_redirects: true,
        }
    }

    /// Apply `PDFHUNT_SEARCH_ENDPOINT`, `PDFHUNT_SEARCH_TIMEOUT_MS` and `PDFHUNT_USER_AGENT`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(ep) = env_nonempty("PDFHUNT_SEARCH_ENDPOINT") {
            self.endpoint = ep;
        }
        if let Some(t) = env_timeout("PDFHUNT_SEARCH_TIMEOUT_MS") {
            self.timeout = t;
        }
        if let Some(ua) = env_nonempty("PDFHUNT_USER_AGENT") {
            self.headers.insert("User-Agent".to_string(), ua);
        }
        self
    }

    /// Default provider (Yahoo) with env overrides.
    pub fn from_env() -> Self {
        Self::yahoo().with_env_overrides()
    }

    pub fn filter_token(&self, extension_token: &str) -> String {
        self.filter_template.replace("{ext}", extension_token)
    }
}

#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub dest_dir: PathBuf,
    /// Applied per read, so it bounds stalls rather than total transfer time.
    pub read_timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dest_dir: PathBuf::from("."),
            read_timeout: DEFAULT_DOWNLOAD_READ_TIMEOUT,
        }
    }
}

impl DownloadConfig {
    /// Apply `PDFHUNT_DOWNLOAD_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(t) = env_timeout("PDFHUNT_DOWNLOAD_TIMEOUT_MS") {
            cfg.read_timeout = t;
        }
        cfg
    }
}

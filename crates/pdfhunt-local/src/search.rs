use crate::config::ProviderConfig;
use crate::extract::ShallowExtractor;
use crate::rank::{rank_candidates, RankOptions};
use pdfhunt_core::{
    Error, Result, SearchCandidate, SearchProvider, SearchQuery, SearchResponse,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// `<endpoint>?q=<form-encoded query>+<filter token>`.
///
/// The filter token is appended as text, not as a structured parameter; providers are free to
/// ignore it.
pub fn build_search_url(endpoint: &str, query: &str, filter_token: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    let sep = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{sep}q={encoded}+{filter_token}")
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut out = HeaderMap::new();
    for (k, v) in headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .map_err(|e| Error::NotConfigured(format!("invalid header name {k:?}: {e}")))?;
        let value = HeaderValue::from_str(v)
            .map_err(|e| Error::NotConfigured(format!("invalid value for header {k}: {e}")))?;
        out.insert(name, value);
    }
    Ok(out)
}

/// Scrapes a provider's HTML results page with the shallow extractor.
#[derive(Debug, Clone)]
pub struct HtmlSearchProvider {
    client: reqwest::Client,
    config: ProviderConfig,
    headers: HeaderMap,
    extractor: ShallowExtractor,
}

impl HtmlSearchProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::NotConfigured(e.to_string()))?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: reqwest::Client, config: ProviderConfig) -> Result<Self> {
        let headers = header_map(&config.headers)?;
        Ok(Self {
            client,
            config,
            headers,
            extractor: ShallowExtractor,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ProviderConfig::from_env())
    }

    pub fn search_url(&self, q: &SearchQuery) -> String {
        build_search_url(
            &self.config.endpoint,
            &q.query,
            &self.config.filter_token(q.extension_token()),
        )
    }

    /// One GET, no retry. Returns the status and the whole body; a non-2xx status is not an error.
    pub async fn fetch_results_page(&self, q: &SearchQuery) -> Result<(u16, Vec<u8>)> {
        let raw = self.search_url(q);
        let url = url::Url::parse(&raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))?;
        tracing::debug!(provider = %self.config.name, url = %url, "search request");

        let resp = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(provider = %self.config.name, %status, "search page not 2xx; parsing anyway");
        }
        let body = resp.bytes().await.map_err(|e| Error::Read(e.to_string()))?;
        Ok((status.as_u16(), body.to_vec()))
    }

    pub fn rank_options(&self, q: &SearchQuery) -> RankOptions {
        RankOptions::for_query(q, self.config.unwrap_redirects)
    }
}

#[async_trait::async_trait]
impl SearchProvider for HtmlSearchProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn search(&self, q: &SearchQuery) -> Result<SearchResponse> {
        let t0 = Instant::now();
        let (http_status, body) = self.fetch_results_page(q).await?;
        let mut timings_ms = BTreeMap::new();
        timings_ms.insert("search".to_string(), t0.elapsed().as_millis());

        let t_extract = Instant::now();
        let pairs = self.extractor.extract_bytes(&body);
        let candidates = rank_candidates(&pairs, &self.rank_options(q));
        timings_ms.insert("extract".to_string(), t_extract.elapsed().as_millis());
        tracing::debug!(
            extracted = pairs.len(),
            kept = candidates.len(),
            "ranked search results"
        );

        Ok(SearchResponse {
            candidates,
            provider: self.config.name.clone(),
            http_status,
            extracted: pairs.len(),
            timings_ms,
        })
    }
}

/// Search with the default provider (env overrides applied).
///
/// Zero candidates is a valid, empty result.
pub async fn search(
    query: &str,
    target_extension: &str,
    max_results: usize,
) -> Result<Vec<SearchCandidate>> {
    let provider = HtmlSearchProvider::from_env()?;
    let q = SearchQuery::new(query)
        .with_extension(target_extension)
        .with_max_results(max_results);
    Ok(provider.search(&q).await?.candidates)
}

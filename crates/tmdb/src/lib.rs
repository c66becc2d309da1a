//! Client for the TMDB "now playing" catalog.
//!
//! Only the paginated `/movie/now_playing` listing is wrapped. The
//! [`MovieCatalog`] trait is the seam the ingestion step depends on, so
//! tests can substitute a canned catalog.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Default prefix prepended to `poster_path` values.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Per-request timeout for catalog calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Errors from the catalog client.
#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// TMDB returned a non-2xx status code.
    #[error("TMDB API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// One entry of a now-playing page. Every field is optional because the
/// catalog does not guarantee any of them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogMovie {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    /// Usually a float, occasionally a string or absent.
    pub popularity: Option<serde_json::Value>,
}

impl CatalogMovie {
    /// Catalog identifier as stored in `movies.external_id`.
    pub fn external_id(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }

    /// Localised title, falling back to the original title. Empty strings
    /// count as missing.
    pub fn display_title(&self) -> Option<&str> {
        non_empty(&self.title).or_else(|| non_empty(&self.original_title))
    }

    /// Overview text, `None` when absent or empty.
    pub fn overview_text(&self) -> Option<&str> {
        non_empty(&self.overview)
    }

    /// Release date, `None` when absent or empty.
    pub fn release_date_text(&self) -> Option<&str> {
        non_empty(&self.release_date)
    }

    /// Full poster URL under `image_base_url`, if the entry has a poster.
    pub fn poster_url(&self, image_base_url: &str) -> Option<String> {
        non_empty(&self.poster_path).map(|path| format!("{image_base_url}{path}"))
    }

    /// Popularity as a sortable score. Missing, unparseable or non-finite
    /// values are 0.
    pub fn popularity_score(&self) -> f64 {
        let score = match &self.popularity {
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        score.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// One page of the now-playing listing.
#[derive(Debug, Clone, Deserialize)]
pub struct NowPlayingPage {
    #[serde(default)]
    pub results: Vec<CatalogMovie>,
    /// Treated as 1 when absent.
    pub total_pages: Option<u32>,
}

/// Parameters of a now-playing fetch.
#[derive(Debug, Clone)]
pub struct NowPlayingQuery {
    pub region: String,
    pub language: String,
    /// Upper bound on the number of pages requested.
    pub max_pages: u32,
}

impl Default for NowPlayingQuery {
    fn default() -> Self {
        Self {
            region: "GB".into(),
            language: "en-GB".into(),
            max_pages: 2,
        }
    }
}

/// Source of currently-playing movies.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Fetch every entry across up to `query.max_pages` pages.
    async fn now_playing(&self, query: &NowPlayingQuery) -> Result<Vec<CatalogMovie>, TmdbError>;
}

/// HTTP client for the TMDB v3 API.
pub struct TmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    /// Create a client with the default request timeout.
    ///
    /// * `base_url` - API root, e.g. [`DEFAULT_BASE_URL`].
    pub fn new(base_url: String, api_key: String) -> Result<Self, TmdbError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Fetch a single page of the now-playing listing.
    pub async fn fetch_page(
        &self,
        region: &str,
        language: &str,
        page: u32,
    ) -> Result<NowPlayingPage, TmdbError> {
        let page = page.to_string();
        let response = self
            .client
            .get(format!("{}/movie/now_playing", self.base_url))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("region", region),
                ("language", language),
                ("page", page.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TmdbError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<NowPlayingPage>().await?)
    }
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn now_playing(&self, query: &NowPlayingQuery) -> Result<Vec<CatalogMovie>, TmdbError> {
        let mut all = Vec::new();
        let mut page = 1;

        while page <= query.max_pages {
            let data = self.fetch_page(&query.region, &query.language, page).await?;
            let total_pages = data.total_pages.unwrap_or(1);
            tracing::debug!(
                page,
                total_pages,
                results = data.results.len(),
                "Fetched now-playing page"
            );
            all.extend(data.results);

            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(all)
    }
}

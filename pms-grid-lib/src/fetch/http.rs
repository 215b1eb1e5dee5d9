//! REST adapter for server-paginated tables.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::FetchParams;
use super::Page;
use super::PageFetcher;
use crate::error::FetchError;

/// Configuration for an [`HttpFetcher`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use pms_grid_lib::fetch::HttpFetcherConfig;
///
/// let config = HttpFetcherConfig::new("https://pms.example.com/pms/assets.json")
///     .with_bearer_token("token")
///     .with_timeout(Duration::from_secs(15))
///     .with_rows_key("assets");
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct HttpFetcherConfig {
    /// Collection endpoint; paging parameters are appended to its query.
    pub url: String,
    /// Sent as `Authorization: Bearer <token>` when set.
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// Per-request timeout.
    #[serde(default, with = "optional_secs")]
    pub timeout: Option<Duration>,
    /// JSON key of the rows array in the response body.
    ///
    /// Default: `data`
    #[serde(default = "default_rows_key")]
    pub rows_key: String,
    /// JSON key of the total row count in the response body.
    ///
    /// Default: `total_count`
    #[serde(default = "default_total_key")]
    pub total_key: String,
}

fn default_rows_key() -> String {
    "data".to_string()
}

fn default_total_key() -> String {
    "total_count".to_string()
}

mod optional_secs {
    use std::time::Duration;

    use serde::Deserialize;
    use serde::Deserializer;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}

impl HttpFetcherConfig {
    /// Creates a config with default response keys and no auth or timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bearer_token: None,
            timeout: None,
            rows_key: default_rows_key(),
            total_key: default_total_key(),
        }
    }

    /// Sets the bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the rows array key.
    pub fn with_rows_key(mut self, key: impl Into<String>) -> Self {
        self.rows_key = key.into();
        self
    }

    /// Sets the total count key.
    pub fn with_total_key(mut self, key: impl Into<String>) -> Self {
        self.total_key = key.into();
        self
    }
}

/// Fetches pages from a JSON collection endpoint.
///
/// Requests are `GET <url>?page=&per_page=` plus `search=`,
/// `filter[<field>]=`, `sort=` and `direction=` when set. The response is a
/// JSON object holding the rows array and the total count under the
/// configured keys; a missing total falls back to the number of rows.
///
/// This client is cheap to clone (`reqwest::Client` is reference counted).
pub struct HttpFetcher<R> {
    config: HttpFetcherConfig,
    base_url: Url,
    http_client: Client,
    _row: PhantomData<fn() -> R>,
}

impl<R> Clone for HttpFetcher<R> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            base_url: self.base_url.clone(),
            http_client: self.http_client.clone(),
            _row: PhantomData,
        }
    }
}

impl<R> std::fmt::Debug for HttpFetcher<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("url", &self.base_url.as_str())
            .field("rows_key", &self.config.rows_key)
            .field("total_key", &self.config.total_key)
            .finish()
    }
}

impl<R: DeserializeOwned> HttpFetcher<R> {
    /// Creates a fetcher. Fails if the configured URL does not parse.
    pub fn new(config: HttpFetcherConfig) -> Result<Self, FetchError> {
        Self::with_client(config, Client::new())
    }

    /// Creates a fetcher sharing an existing `reqwest::Client`.
    pub fn with_client(config: HttpFetcherConfig, http_client: Client) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| FetchError::network(format!("Invalid URL {}: {}", config.url, e)))?;
        Ok(Self {
            config,
            base_url,
            http_client,
            _row: PhantomData,
        })
    }

    /// Builds the request URL for a page.
    pub fn build_url(&self, params: &FetchParams) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &params.page.to_string());
            query.append_pair("per_page", &params.per_page.to_string());
            let search = params.query.trim();
            if !search.is_empty() {
                query.append_pair("search", search);
            }
            for (field, value) in params.filters.iter() {
                query.append_pair(&format!("filter[{}]", field), &value.to_param());
            }
            if let Some(sort) = &params.sort {
                query.append_pair("sort", &sort.key);
                query.append_pair("direction", sort.direction.as_str());
            }
        }
        url
    }

    /// Decodes a response body into a page.
    pub fn parse_body(&self, body: &str) -> Result<Page<R>, FetchError> {
        let mut json: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| FetchError::parse_with_body(e.to_string(), body))?;

        let rows_json = json
            .get_mut(&self.config.rows_key)
            .map(serde_json::Value::take)
            .ok_or_else(|| {
                FetchError::parse_with_body(
                    format!("missing `{}` array", self.config.rows_key),
                    body,
                )
            })?;
        let rows: Vec<R> = serde_json::from_value(rows_json)
            .map_err(|e| FetchError::parse_with_body(e.to_string(), body))?;

        let total_count = json
            .get(&self.config.total_key)
            .and_then(|v| match v {
                serde_json::Value::Number(n) => n.as_u64(),
                serde_json::Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .map(|n| n as usize)
            .unwrap_or(rows.len());

        Ok(Page::new(rows, total_count))
    }
}

#[async_trait]
impl<R> PageFetcher<R> for HttpFetcher<R>
where
    R: DeserializeOwned + Send + Sync,
{
    async fn fetch_page(&self, params: &FetchParams) -> Result<Page<R>, FetchError> {
        let url = self.build_url(params);
        log::debug!("GET {}", url);

        let mut request = self
            .http_client
            .get(url)
            .header("Accept", "application/json");
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }
        if let Some(timeout) = self.config.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_error(e))?;

        if !status.is_success() {
            return Err(FetchError::server(status.as_u16(), body));
        }
        self.parse_body(&body)
    }
}

impl<R> HttpFetcher<R> {
    fn map_error(&self, e: reqwest::Error) -> FetchError {
        match self.config.timeout {
            Some(timeout) if e.is_timeout() => FetchError::Timeout(timeout),
            _ => FetchError::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;
    use crate::model::Record;
    use crate::model::TableRow;
    use crate::sort::Sort;

    fn fetcher() -> HttpFetcher<Record> {
        HttpFetcher::new(HttpFetcherConfig::new(
            "https://pms.example.com/pms/tickets.json?site=7",
        ))
        .unwrap()
    }

    #[test]
    fn test_build_url_minimal() {
        let url = fetcher().build_url(&FetchParams::new(10));
        assert_eq!(
            url.as_str(),
            "https://pms.example.com/pms/tickets.json?site=7&page=1&per_page=10"
        );
    }

    #[test]
    fn test_build_url_with_search_filters_and_sort() {
        let mut params = FetchParams::new(25);
        params.page = 2;
        params.query = " leak ".to_string();
        params.filters.set("status", FilterValue::choice("open"));
        params.sort = Some(Sort::descending("created_at"));

        let url = fetcher().build_url(&params);
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("page".to_string(), "2".to_string())));
        assert!(pairs.contains(&("search".to_string(), "leak".to_string())));
        assert!(pairs.contains(&("filter[status]".to_string(), "open".to_string())));
        assert!(pairs.contains(&("sort".to_string(), "created_at".to_string())));
        assert!(pairs.contains(&("direction".to_string(), "desc".to_string())));
    }

    #[test]
    fn test_parse_body() {
        let page = fetcher()
            .parse_body(r#"{"data": [{"id": 1}, {"id": 2}], "total_count": 42}"#)
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.total_count(), 42);
        assert_eq!(page.rows()[1].id(), "2");
    }

    #[test]
    fn test_parse_body_custom_keys_and_missing_total() {
        let fetcher = HttpFetcher::<Record>::new(
            HttpFetcherConfig::new("https://pms.example.com/pms/assets.json")
                .with_rows_key("assets"),
        )
        .unwrap();
        let page = fetcher.parse_body(r#"{"assets": [{"id": "a-1"}]}"#).unwrap();
        assert_eq!(page.total_count(), 1);
    }

    #[test]
    fn test_parse_body_errors() {
        let error = fetcher().parse_body("not json").unwrap_err();
        assert!(matches!(error, FetchError::Parse { body: Some(_), .. }));

        let error = fetcher().parse_body(r#"{"rows": []}"#).unwrap_err();
        assert!(matches!(error, FetchError::Parse { .. }));
    }

    #[test]
    fn test_invalid_url() {
        let result = HttpFetcher::<Record>::new(HttpFetcherConfig::new("not a url"));
        assert!(result.is_err());
    }
}

//! Content Delivery API client with pagination and retry
//!
//! Entries are requested page by page (`limit`/`skip`) until the reported
//! `total` is reached. Transient failures (connection errors, timeouts,
//! HTTP 429 and 5xx) are retried with exponential backoff:
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..=250ms)
//! ```
//!
//! A rate limit response carrying `X-Contentful-RateLimit-Reset` waits at
//! least that many seconds. Any other failure ends the build immediately.

use rand::{rng, Rng};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::links::{EntryCollection, LinkResolver};
use super::{ContentSource, EntryQuery};
use crate::config::{ContentfulConfig, RetryConfig, ACCESS_TOKEN_ENV, SPACE_ID_ENV};
use crate::content::Entry;
use crate::error::SourceError;

const MAX_PAGE_SIZE: usize = 1000;
const MAX_INCLUDE: usize = 10;
const RATE_LIMIT_RESET: &str = "x-contentful-ratelimit-reset";

/// Client for one space/environment of the Content Delivery API
pub struct ContentfulClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: String,
    page_size: usize,
    include: usize,
    retry: RetryConfig,
}

/// Outcome of a single HTTP attempt
enum Attempt {
    Done(EntryCollection),
    Transient {
        reason: String,
        retry_after: Option<Duration>,
    },
    Fatal(SourceError),
}

impl ContentfulClient {
    /// Build a client from configuration; credentials must be present
    pub fn new(config: &ContentfulConfig) -> Result<Self, SourceError> {
        if !config.has_credentials() {
            return Err(SourceError::Config(format!(
                "set `contentful.space` and `contentful.access_token` in _config.yml, or {} and {}",
                SPACE_ID_ENV, ACCESS_TOKEN_ENV
            )));
        }

        let mut endpoint = Url::parse(&config.host)
            .map_err(|e| SourceError::Config(format!("invalid host {:?}: {}", config.host, e)))?;
        endpoint
            .path_segments_mut()
            .map_err(|_| SourceError::Config(format!("invalid host {:?}", config.host)))?
            .pop_if_empty()
            .extend([
                "spaces",
                config.space.as_str(),
                "environments",
                config.environment.as_str(),
                "entries",
            ]);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("headless-blog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            access_token: config.access_token.clone(),
            page_size: config.page_size.clamp(1, MAX_PAGE_SIZE),
            include: config.include.min(MAX_INCLUDE),
            retry: config.retry.clone(),
        })
    }

    fn page_url(&self, query: &EntryQuery, skip: usize) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("content_type", &query.content_type);
            for (path, value) in &query.filters {
                pairs.append_pair(path, value);
            }
            pairs.append_pair("limit", &self.page_size.to_string());
            pairs.append_pair("skip", &skip.to_string());
            pairs.append_pair("include", &self.include.to_string());
        }
        url
    }

    /// Fetch one page, retrying transient failures
    #[instrument(level = "debug", skip(self, query))]
    async fn fetch_page(
        &self,
        query: &EntryQuery,
        offset: usize,
    ) -> Result<EntryCollection, SourceError> {
        let url = self.page_url(query, offset);
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let (reason, retry_after) = match self.send(&url, &query.content_type).await {
                Attempt::Done(page) => return Ok(page),
                Attempt::Fatal(e) => return Err(e),
                Attempt::Transient {
                    reason,
                    retry_after,
                } => (reason, retry_after),
            };

            attempt += 1;
            if attempt > self.retry.max_retries {
                error!(
                    attempt,
                    max = self.retry.max_retries,
                    elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                    error = %reason,
                    "content store request exhausted retries"
                );
                return Err(SourceError::RetriesExhausted {
                    attempts: attempt,
                    last: reason,
                });
            }

            let delay = self.backoff(attempt, retry_after);
            warn!(
                attempt,
                max = self.retry.max_retries,
                ?delay,
                error = %reason,
                "content store request failed; backing off"
            );
            sleep(delay).await;
        }
    }

    fn backoff(&self, attempt: usize, retry_after: Option<Duration>) -> Duration {
        let base = Duration::from_millis(self.retry.base_delay_ms);
        let max = Duration::from_millis(self.retry.max_delay_ms);
        let shift = (attempt - 1).min(31) as u32;
        let delay = base.saturating_mul(1u32 << shift).min(max);
        let jitter_ms: u64 = rng().random_range(0..=250);
        let delay = delay + Duration::from_millis(jitter_ms);

        match retry_after {
            Some(wait) if wait > delay => wait,
            _ => delay,
        }
    }

    async fn send(&self, url: &Url, content_type: &str) -> Attempt {
        debug!(%url, "GET entries");
        let response = match self
            .http
            .get(url.clone())
            .bearer_auth(&self.access_token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() || e.is_connect() || e.is_request() => {
                return Attempt::Transient {
                    reason: e.to_string(),
                    retry_after: None,
                }
            }
            Err(e) => return Attempt::Fatal(e.into()),
        };

        let status = response.status();
        let retry_after = rate_limit_reset(response.headers());
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Attempt::Transient {
                    reason: e.to_string(),
                    retry_after: None,
                }
            }
        };

        if status.is_success() {
            return match serde_json::from_str(&body) {
                Ok(page) => Attempt::Done(page),
                Err(e) => Attempt::Fatal(e.into()),
            };
        }

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Attempt::Transient {
                reason: format!("HTTP {}", status),
                retry_after,
            };
        }

        Attempt::Fatal(classify_error(status.as_u16(), &body, content_type))
    }
}

impl ContentSource for ContentfulClient {
    #[instrument(level = "info", skip_all, fields(content_type = %query.content_type))]
    async fn get_entries(&self, query: &EntryQuery) -> Result<Vec<Entry>, SourceError> {
        let mut entries = Vec::new();
        let mut skip = 0;

        loop {
            let page = self.fetch_page(query, skip).await?;
            let count = page.items.len();
            let resolver = LinkResolver::new(&page, self.include);
            for item in page.items.iter().cloned() {
                entries.push(resolver.resolve_entry(item)?);
            }

            skip += count;
            debug!(count, skip, total = page.total, "Fetched page");
            if count == 0 || skip >= page.total {
                break;
            }
        }

        info!(count = entries.len(), "Fetched entries");
        Ok(entries)
    }
}

/// Seconds until the rate limit resets, if the store said so
fn rate_limit_reset(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RATE_LIMIT_RESET)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Map a non-retryable error response to a [`SourceError`]
fn classify_error(status: u16, body: &str, content_type: &str) -> SourceError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let id = parsed
        .pointer("/sys/id")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();
    let message = parsed
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.chars().take(200).collect());

    let unknown_content_type = parsed
        .pointer("/details/errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .any(|e| e.get("name").and_then(Value::as_str) == Some("unknownContentType"))
        })
        .unwrap_or(false);

    match status {
        401 | 403 => SourceError::Unauthorized { message },
        404 => SourceError::SpaceNotFound { message },
        400 | 422 if unknown_content_type => SourceError::UnknownContentType {
            content_type: content_type.to_string(),
            message,
        },
        _ => SourceError::Api {
            status,
            id,
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Query, State};
    use axum::http::{HeaderMap as AxumHeaders, StatusCode as AxumStatus};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Mock {
        calls: Arc<AtomicUsize>,
        failures: usize,
        failure_status: u16,
    }

    fn item(id: &str, slug: &str) -> Value {
        json!({
            "sys": { "id": id, "createdAt": "2022-01-01T00:00:00.000Z", "contentType": { "sys": { "id": "blogPost" } } },
            "fields": {
                "title": format!("Post {id}"),
                "slug": slug,
                "featuredImage": { "sys": { "type": "Link", "linkType": "Asset", "id": "img" } }
            }
        })
    }

    async fn entries_handler(
        State(mock): State<Mock>,
        headers: AxumHeaders,
        Query(params): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        let call = mock.calls.fetch_add(1, Ordering::SeqCst);

        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer token") {
            let body = json!({ "sys": { "type": "Error", "id": "AccessTokenInvalid" }, "message": "The access token you sent could not be found or is invalid." });
            return (AxumStatus::UNAUTHORIZED, Json(body));
        }
        if call < mock.failures {
            let status = AxumStatus::from_u16(mock.failure_status).unwrap();
            return (status, Json(json!({ "sys": { "type": "Error", "id": "ServerError" } })));
        }
        if params.get("content_type").map(String::as_str) != Some("blogPost") {
            let body = json!({
                "sys": { "type": "Error", "id": "InvalidQuery" },
                "message": "The query you sent was invalid. Probably a filter or ordering specification is not applicable to the type of a field.",
                "details": { "errors": [{ "name": "unknownContentType", "value": "DOESNOTEXIST" }] }
            });
            return (AxumStatus::BAD_REQUEST, Json(body));
        }

        let all: Vec<Value> = vec![item("1", "a"), item("2", "b"), item("3", "c")]
            .into_iter()
            .filter(|i| match params.get("fields.slug") {
                Some(slug) => i["fields"]["slug"] == json!(slug),
                None => true,
            })
            .collect();
        let skip: usize = params.get("skip").and_then(|s| s.parse().ok()).unwrap_or(0);
        let limit: usize = params.get("limit").and_then(|s| s.parse().ok()).unwrap_or(100);
        let page: Vec<Value> = all.iter().skip(skip).take(limit).cloned().collect();

        let body = json!({
            "sys": { "type": "Array" },
            "total": all.len(),
            "skip": skip,
            "limit": limit,
            "items": page,
            "includes": {
                "Asset": [{
                    "sys": { "id": "img", "type": "Asset" },
                    "fields": { "title": "Cover", "file": { "url": "//images.example.net/cover.png" } }
                }]
            }
        });
        (AxumStatus::OK, Json(body))
    }

    async fn serve(mock: Mock) -> String {
        let app = Router::new()
            .route(
                "/spaces/space1/environments/master/entries",
                get(entries_handler),
            )
            .with_state(mock);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(host: String) -> ContentfulConfig {
        let mut config = ContentfulConfig::default();
        config.host = host;
        config.space = "space1".to_string();
        config.access_token = "token".to_string();
        config.page_size = 2;
        config.retry = RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 5,
        };
        config
    }

    #[tokio::test]
    async fn test_paginates_and_resolves_links() {
        let mock = Mock::default();
        let calls = mock.calls.clone();
        let client = ContentfulClient::new(&config(serve(mock).await)).unwrap();

        let entries = client
            .get_entries(&EntryQuery::new("blogPost"))
            .await
            .unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            entries[2].fields["featuredImage"]["fields"]["file"]["url"],
            json!("//images.example.net/cover.png")
        );
    }

    #[tokio::test]
    async fn test_field_filter_is_sent() {
        let client = ContentfulClient::new(&config(serve(Mock::default()).await)).unwrap();
        let entries = client
            .get_entries(&EntryQuery::new("blogPost").field("slug", "b"))
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text("slug"), Some("b"));
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let mock = Mock {
            failures: 2,
            failure_status: 503,
            ..Mock::default()
        };
        let calls = mock.calls.clone();
        let client = ContentfulClient::new(&config(serve(mock).await)).unwrap();

        let entries = client
            .get_entries(&EntryQuery::new("blogPost").field("slug", "a"))
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let mock = Mock {
            failures: 10,
            failure_status: 500,
            ..Mock::default()
        };
        let calls = mock.calls.clone();
        let client = ContentfulClient::new(&config(serve(mock).await)).unwrap();

        let err = client
            .get_entries(&EntryQuery::new("blogPost"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::RetriesExhausted { attempts: 3, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_bad_token_is_not_retried() {
        let mock = Mock::default();
        let calls = mock.calls.clone();
        let mut config = config(serve(mock).await);
        config.access_token = "wrong".to_string();
        let client = ContentfulClient::new(&config).unwrap();

        let err = client
            .get_entries(&EntryQuery::new("blogPost"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Unauthorized { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_content_type() {
        let client = ContentfulClient::new(&config(serve(Mock::default()).await)).unwrap();
        let err = client
            .get_entries(&EntryQuery::new("DOESNOTEXIST"))
            .await
            .unwrap_err();
        match err {
            SourceError::UnknownContentType { content_type, .. } => {
                assert_eq!(content_type, "DOESNOTEXIST")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_space_is_not_retried() {
        let mut config = config(serve(Mock::default()).await);
        config.space = "nope".to_string();
        let client = ContentfulClient::new(&config).unwrap();

        let err = client
            .get_entries(&EntryQuery::new("blogPost"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::SpaceNotFound { .. }));
    }

    #[test]
    fn test_missing_credentials() {
        let err = ContentfulClient::new(&ContentfulConfig::default()).err().unwrap();
        assert!(matches!(err, SourceError::Config(_)));
    }

    #[test]
    fn test_page_url() {
        let client = ContentfulClient::new(&config("https://cdn.example.com".to_string())).unwrap();
        let url = client.page_url(&EntryQuery::new("blogPost").field("slug", "a b"), 4);
        assert_eq!(
            url.as_str(),
            "https://cdn.example.com/spaces/space1/environments/master/entries?content_type=blogPost&fields.slug=a+b&limit=2&skip=4&include=1"
        );
    }

    #[test]
    fn test_backoff_is_capped_and_honours_rate_limit() {
        let client = ContentfulClient::new(&config("https://cdn.example.com".to_string())).unwrap();
        let delay = client.backoff(10, None);
        assert!(delay <= Duration::from_millis(5 + 250));
        let delay = client.backoff(1, Some(Duration::from_secs(2)));
        assert_eq!(delay, Duration::from_secs(2));
    }

    #[test]
    fn test_classify_error() {
        let err = classify_error(404, r#"{"sys":{"id":"NotFound"},"message":"The resource could not be found."}"#, "blogPost");
        assert!(matches!(err, SourceError::SpaceNotFound { ref message } if message == "The resource could not be found."));

        let err = classify_error(500, r#"{"sys":{"id":"ServerError"},"message":"boom"}"#, "blogPost");
        assert!(matches!(err, SourceError::Api { status: 500, ref id, .. } if id == "ServerError"));

        let err = classify_error(403, "forbidden", "blogPost");
        assert!(matches!(err, SourceError::Unauthorized { ref message } if message == "forbidden"));
    }
}

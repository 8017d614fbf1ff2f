//! Static-mode fetcher wrapping reqwest.
//!
//! Not a browser, just HTTP requests with a browser-like header set.
//! Handles redirects, timeouts, retry on 5xx, and backoff on 429.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use tracing::debug;

use super::{MarkupFetcher, USER_AGENT};
use crate::error::FetchError;

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_CZECH: &str = "cs,en;q=0.9";
const MAX_REDIRECTS: usize = 5;
const MAX_RETRIES: u32 = 2;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Plain HTTP GET transport. Cheap to clone; reqwest pools connections
/// behind the shared inner client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_CZECH));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .unwrap_or_default();

        Self { client, timeout }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl MarkupFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut retries = 0u32;

        loop {
            let resp = self.client.get(url).send().await;

            match resp {
                Ok(r) => {
                    let status = r.status().as_u16();

                    // Retry on 5xx
                    if status >= 500 && retries < MAX_RETRIES {
                        retries += 1;
                        let delay = Duration::from_millis(500 * 2u64.pow(retries - 1));
                        debug!("HTTP {status} from {url}, retry {retries}/{MAX_RETRIES}");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    // Backoff on 429
                    if status == 429 && retries < MAX_RETRIES {
                        retries += 1;
                        let retry_after = r
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|s| s.parse::<u64>().ok())
                            .unwrap_or(2);
                        let delay = Duration::from_secs(retry_after.min(10));
                        debug!("rate limited by {url}, backing off {delay:?}");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    if status >= 400 {
                        return Err(FetchError::Status { status });
                    }

                    return r
                        .text()
                        .await
                        .map_err(|e| FetchError::Transport(e.to_string()));
                }
                Err(e) if e.is_timeout() => {
                    return Err(FetchError::Timeout(self.timeout));
                }
                Err(e) => {
                    if retries < MAX_RETRIES {
                        retries += 1;
                        let delay = Duration::from_millis(500 * 2u64.pow(retries - 1));
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(FetchError::Transport(e.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{headers, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn success_returns_the_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cs/2012-89"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>zákon</html>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::default();
        let body = fetcher
            .fetch(&format!("{}/cs/2012-89", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<html>zákon</html>");
    }

    #[tokio::test]
    async fn sends_browser_like_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            // wiremock 0.6 compares header values comma-split, so the
            // expected list form of ACCEPT_CZECH is what must be given.
            .and(headers("accept-language", ACCEPT_CZECH.split(',').collect()))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::default();
        fetcher.fetch(&server.uri()).await.unwrap();
    }

    #[tokio::test]
    async fn client_errors_do_not_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::default();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404 }));
    }

    #[tokio::test]
    async fn server_errors_retry_then_surface_the_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3) // initial attempt + two retries
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::default();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503 }));
    }
}

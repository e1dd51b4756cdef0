//! Authenticated HTTP implementation of [`DocumentStore`] for the Feishu
//! open platform.

use std::cell::RefCell;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use markdown_docwriter_config::FeishuConfig;
use markdown_docwriter_engine::store::{DocumentStore, Method, TransportError};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const TOKEN_ENDPOINT: &str = "/auth/v3/tenant_access_token/internal";
/// Tenant tokens live two hours; cache for less.
const TOKEN_LIFETIME: Duration = Duration::from_secs(110 * 60);
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);
const TOKEN_EXPIRED_CODE: i64 = 99991663;
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    app_id: &'a str,
    app_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
    tenant_access_token: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<Value>,
}

/// How one HTTP response should be handled.
#[derive(Debug, PartialEq)]
enum Outcome {
    /// Final answer for this request: data, or `None` for an API error.
    Done(Option<Value>),
    TokenExpired,
    RateLimited(Duration),
}

fn classify(status: StatusCode, retry_after: Option<&str>, body: &str) -> Outcome {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let wait = retry_after
            .and_then(|s| s.trim().parse().ok())
            .map_or(DEFAULT_RETRY_AFTER, Duration::from_secs);
        return Outcome::RateLimited(wait);
    }
    if status != StatusCode::OK {
        log::error!("HTTP error {status}: {body}");
        return Outcome::Done(None);
    }

    let envelope: Envelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            log::error!("Unreadable response body: {e}");
            return Outcome::Done(None);
        }
    };
    match envelope.code {
        0 => Outcome::Done(Some(
            envelope.data.unwrap_or_else(|| Value::Object(Default::default())),
        )),
        TOKEN_EXPIRED_CODE => Outcome::TokenExpired,
        code => {
            log::error!("API error {code}: {}", envelope.msg);
            Outcome::Done(None)
        }
    }
}

pub struct HttpStore {
    client: Client,
    base_url: String,
    app_id: String,
    app_secret: String,
    max_retries: u32,
    retry_delay: Duration,
    token: RefCell<Option<CachedToken>>,
}

impl HttpStore {
    pub fn new(config: &FeishuConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_id: config.app_id.clone(),
            app_secret: config.app_secret.clone(),
            max_retries: config.max_retries.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
            token: RefCell::new(None),
        })
    }

    fn token(&self) -> Result<String, TransportError> {
        if let Some(token) = self.token.borrow().as_ref()
            && token.is_fresh(Instant::now())
        {
            return Ok(token.value.clone());
        }

        let value = self.fetch_token()?;
        *self.token.borrow_mut() = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + TOKEN_LIFETIME,
        });
        Ok(value)
    }

    fn fetch_token(&self) -> Result<String, TransportError> {
        let response: TokenResponse = self
            .client
            .post(format!("{}{TOKEN_ENDPOINT}", self.base_url))
            .json(&TokenRequest {
                app_id: &self.app_id,
                app_secret: &self.app_secret,
            })
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| TransportError::Auth(e.to_string()))?;

        if response.code != 0 {
            return Err(TransportError::Auth(format!(
                "{} (code {})",
                response.msg, response.code
            )));
        }
        log::debug!("Refreshed tenant access token");
        response
            .tenant_access_token
            .ok_or_else(|| TransportError::Auth("response carried no token".to_string()))
    }

    fn builder(&self, method: Method, url: &str) -> RequestBuilder {
        match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Delete => self.client.delete(url),
        }
    }

    fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, TransportError> {
        let url = format!("{}{endpoint}", self.base_url);
        let mut reason = String::new();

        for attempt in 1..=self.max_retries {
            let token = self.token()?;
            log::debug!("{method} {url} (attempt {attempt}/{})", self.max_retries);

            let mut request = self.builder(method, &url).bearer_auth(token);
            if let Some(body) = body {
                request = request.json(body);
            }

            let sent = request.send().and_then(|response| {
                let status = response.status();
                let retry_after = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let text = response.text()?;
                Ok((status, retry_after, text))
            });

            match sent {
                Ok((status, retry_after, text)) => {
                    match classify(status, retry_after.as_deref(), &text) {
                        Outcome::Done(data) => return Ok(data),
                        Outcome::TokenExpired => {
                            log::info!("Access token expired, refreshing");
                            *self.token.borrow_mut() = None;
                            reason = "access token expired".to_string();
                        }
                        Outcome::RateLimited(wait) => {
                            log::warn!("Rate limited, waiting {}s", wait.as_secs());
                            thread::sleep(wait);
                            reason = "rate limited".to_string();
                        }
                    }
                }
                Err(e) => {
                    log::warn!(
                        "{method} {url} failed (attempt {attempt}/{}): {e}",
                        self.max_retries
                    );
                    reason = e.to_string();
                    if attempt < self.max_retries {
                        thread::sleep(self.retry_delay * attempt);
                    }
                }
            }
        }

        log::error!("All {} attempts failed for {method} {url}", self.max_retries);
        Err(TransportError::Exhausted {
            method,
            endpoint: endpoint.to_string(),
            attempts: self.max_retries,
            reason,
        })
    }
}

impl DocumentStore for HttpStore {
    fn get(&self, endpoint: &str) -> Result<Option<Value>, TransportError> {
        self.request(Method::Get, endpoint, None)
    }

    fn post(&self, endpoint: &str, body: &Value) -> Result<Option<Value>, TransportError> {
        self.request(Method::Post, endpoint, Some(body))
    }

    fn delete(&self, endpoint: &str) -> Result<Option<Value>, TransportError> {
        self.request(Method::Delete, endpoint, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn success_unwraps_data() {
        let body = r#"{"code": 0, "msg": "ok", "data": {"document": {"document_id": "d"}}}"#;
        assert_eq!(
            classify(StatusCode::OK, None, body),
            Outcome::Done(Some(json!({"document": {"document_id": "d"}})))
        );
    }

    #[test]
    fn success_without_data_is_empty_object() {
        assert_eq!(
            classify(StatusCode::OK, None, r#"{"code": 0}"#),
            Outcome::Done(Some(json!({})))
        );
    }

    #[test]
    fn api_error_is_a_failed_request() {
        let body = r#"{"code": 1770001, "msg": "invalid param"}"#;
        assert_eq!(classify(StatusCode::OK, None, body), Outcome::Done(None));
    }

    #[test]
    fn expired_token_code_is_recognised() {
        let body = r#"{"code": 99991663, "msg": "token expired"}"#;
        assert_eq!(classify(StatusCode::OK, None, body), Outcome::TokenExpired);
    }

    #[rstest]
    #[case(Some("2"), 2)]
    #[case(Some(" 7 "), 7)]
    #[case(Some("soon"), 5)]
    #[case(None, 5)]
    fn rate_limit_honours_retry_after(#[case] header: Option<&str>, #[case] secs: u64) {
        assert_eq!(
            classify(StatusCode::TOO_MANY_REQUESTS, header, ""),
            Outcome::RateLimited(Duration::from_secs(secs))
        );
    }

    #[rstest]
    #[case(StatusCode::BAD_REQUEST)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR)]
    fn other_http_errors_fail_the_request(#[case] status: StatusCode) {
        assert_eq!(classify(status, None, "oops"), Outcome::Done(None));
    }

    #[test]
    fn garbage_body_fails_the_request() {
        assert_eq!(classify(StatusCode::OK, None, "<html>"), Outcome::Done(None));
    }

    #[test]
    fn token_freshness_leaves_refresh_margin() {
        let now = Instant::now();
        let fresh = CachedToken {
            value: "t".to_string(),
            expires_at: now + Duration::from_secs(10 * 60),
        };
        let stale = CachedToken {
            value: "t".to_string(),
            expires_at: now + Duration::from_secs(4 * 60),
        };
        assert!(fresh.is_fresh(now));
        assert!(!stale.is_fresh(now));
    }

    #[test]
    fn unreachable_host_fails_authentication() {
        let mut config = FeishuConfig::new("id", "secret");
        config.base_url = "http://127.0.0.1:9/".to_string();
        config.timeout_secs = 2;
        config.retry_delay_secs = 0;
        let store = HttpStore::new(&config).unwrap();

        assert!(matches!(store.get("/drive/v1/files/x"), Err(TransportError::Auth(_))));
    }
}

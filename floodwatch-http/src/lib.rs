//! Minimal HTTP client shared by the Floodwatch fetchers.
//!
//! - Request options: `Auth` (bearer/basic), query params, timeout, retries
//! - Retries 429/5xx with exponential backoff and `Retry-After` support
//! - Redacts sensitive query params and never logs secret values
//! - `get_json` for API endpoints, `get_text` for plain pages,
//!   `post_form` for the OAuth2 token exchange
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), floodwatch_http::HttpError> {
//! let client = floodwatch_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", floodwatch_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Security: bearer tokens are sanitized before use and logs only ever carry
//! the auth kind (bearer/basic/none), not the secret.

use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

/// Authentication strategies supported by the client.
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Authorization: Bearer <token>
    Bearer(&'a str),
    /// HTTP basic auth (used for the app-only token exchange).
    Basic { user: &'a str, pass: &'a str },
    None,
}

/// Per-request tuning knobs.
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Option<Auth<'a>>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>, // e.g. [("q", "term".into())]
    /// If true and `path` is an absolute URL, use it as-is (ignore base).
    pub allow_absolute: bool,
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
    pub max_retries: usize,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
            max_retries: 2,
        })
    }

    /// Override the default per-request timeout.
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// Override the default retry budget.
    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    /// GET a JSON endpoint and decode the response body.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let bytes = self.execute(Method::GET, path, None, opts).await?;
        let snippet = snip_body(&bytes);
        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            tracing::warn!(
                serde_err = %e,
                body_snippet = %snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }

    /// GET a plain page (HTML or text) as a lossily-decoded string.
    pub async fn get_text(&self, path: &str, opts: RequestOpts<'_>) -> Result<String, HttpError> {
        let bytes = self.execute(Method::GET, path, None, opts).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// POST a urlencoded form and decode the JSON response.
    pub async fn post_form<T>(
        &self,
        path: &str,
        form: &[(&str, &str)],
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let bytes = self.execute(Method::POST, path, Some(form), opts).await?;
        let snippet = snip_body(&bytes);
        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            tracing::warn!(
                serde_err = %e,
                body_snippet = %snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }

    /// Send with retries and return the successful response body.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        form: Option<&[(&str, &str)]>,
        opts: RequestOpts<'_>,
    ) -> Result<Vec<u8>, HttpError> {
        let url = if opts.allow_absolute {
            Url::parse(path).or_else(|_| self.base.join(path))
        } else {
            self.base.join(path)
        }
        .map_err(|e| HttpError::Url(e.to_string()))?;

        let mut attempt = 0usize;
        let max_retries = opts.retries.unwrap_or(self.max_retries);

        loop {
            let mut rb = self.inner.request(method.clone(), url.clone());

            let timeout = opts.timeout.unwrap_or(self.default_timeout);
            rb = rb.timeout(timeout);

            if let Some(q) = &opts.query {
                let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
                rb = rb.query(&pairs);
            }

            if let Some(fields) = form {
                rb = rb.form(fields);
            }

            match &opts.auth {
                Some(Auth::Bearer(tok)) => {
                    let tok = sanitize_api_key(tok)?;
                    rb = rb.bearer_auth(tok);
                }
                Some(Auth::Basic { user, pass }) => {
                    rb = rb.basic_auth(user, Some(pass));
                }
                Some(Auth::None) | None => {}
            }

            let auth_kind = match &opts.auth {
                Some(Auth::Bearer(_)) => "bearer",
                Some(Auth::Basic { .. }) => "basic",
                Some(Auth::None) | None => "none",
            };

            let attempt0 = attempt + 1;
            tracing::debug!(
                attempt = attempt0,
                max_retries,
                method = %method,
                host_path = %format!("{}{}", url.domain().unwrap_or("-"), url.path()),
                query = ?redact_query_pairs(opts.query.as_deref()),
                timeout_ms = timeout.as_millis() as u64,
                auth_kind,
                has_form = form.is_some(),
                "http.request.start"
            );

            let t0 = std::time::Instant::now();
            let resp = match rb.send().await {
                Ok(resp) => resp,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff_delay(attempt);
                        tracing::warn!(
                            attempt,
                            max_retries,
                            backoff_ms = delay.as_millis() as u64,
                            message = %message,
                            "http.retrying.network_send"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    return Err(HttpError::Network(message));
                }
            };
            let status = resp.status();
            let headers = resp.headers().clone();
            let bytes = match resp.bytes().await {
                Ok(bytes) => bytes,
                Err(err) => {
                    let message = err.to_string();
                    if attempt < max_retries {
                        attempt += 1;
                        let delay = backoff_delay(attempt);
                        tracing::warn!(
                            attempt,
                            max_retries,
                            backoff_ms = delay.as_millis() as u64,
                            message = %message,
                            "http.retrying.network_body"
                        );
                        sleep(delay).await;
                        continue;
                    }
                    return Err(HttpError::Network(message));
                }
            };
            let dur_ms = t0.elapsed().as_millis() as u64;

            let req_hdr_id = headers
                .get("x-request-id")
                .or_else(|| headers.get("x-correlation-id"))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");

            let remain = headers
                .get("x-rate-limit-remaining")
                .and_then(|v| v.to_str().ok());
            let reset = headers
                .get("x-rate-limit-reset")
                .and_then(|v| v.to_str().ok());

            tracing::debug!(
                %status,
                duration_ms = dur_ms,
                body_len = bytes.len(),
                x_request_id = %req_hdr_id,
                rate_limit.remaining = ?remain,
                rate_limit.reset = ?reset,
                "http.response"
            );

            if status.is_success() {
                return Ok(bytes.to_vec());
            }

            let snippet = snip_body(&bytes);
            let message = extract_error_message(&bytes);
            let request_id = req_hdr_id.to_string();

            let is_429 = status == StatusCode::TOO_MANY_REQUESTS;
            let is_5xx = status.is_server_error();

            if (is_429 || is_5xx) && attempt < max_retries {
                attempt += 1;
                let delay = if let Some(secs) = retry_after_delay_secs(&headers) {
                    Duration::from_secs(secs)
                } else {
                    let exp = backoff_delay(attempt);
                    if is_429 {
                        // floor for 429 when no Retry-After is present
                        exp.max(Duration::from_millis(1100))
                    } else {
                        exp
                    }
                };
                tracing::warn!(
                    %status,
                    attempt,
                    max_retries,
                    backoff_ms = delay.as_millis() as u64,
                    message = %message,
                    body_snippet = %snippet,
                    "http.retrying"
                );
                sleep(delay).await;
                continue;
            }

            tracing::warn!(
                %status,
                message = %message,
                x_request_id = %request_id,
                body_snippet = %snippet,
                "http.error"
            );
            return Err(HttpError::Api {
                status,
                message,
                request_id,
            });
        }
    }
}

fn backoff_delay(attempt: usize) -> Duration {
    Duration::from_millis(200u64.saturating_mul(1 << (attempt - 1)))
}

/// Pull a human-readable message out of common API error envelopes.
fn extract_error_message(body: &[u8]) -> String {
    // Twitter v2: {"errors":[{"message":"...","detail":"...","title":"..."}]}
    #[derive(Deserialize)]
    struct TwErrors {
        errors: Vec<TwErr>,
    }
    #[derive(Deserialize)]
    struct TwErr {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        title: String,
    }

    // Generic: {"message":"..."} or {"detail":"..."} or {"error":"..."}
    #[derive(Deserialize)]
    struct Msg {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(tw) = serde_json::from_slice::<TwErrors>(body) {
        if let Some(first) = tw.errors.into_iter().next() {
            if !first.message.is_empty() {
                return first.message;
            }
            if !first.detail.is_empty() {
                return first.detail;
            }
            if !first.title.is_empty() {
                return first.title;
            }
        }
    }
    if let Ok(m) = serde_json::from_slice::<Msg>(body) {
        if !m.message.is_empty() {
            return m.message;
        }
        if !m.detail.is_empty() {
            return m.detail;
        }
        if !m.error.is_empty() {
            return m.error;
        }
    }
    snip_body(body)
}

fn retry_after_delay_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())?
        .parse()
        .ok()
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        snip.truncate(500);
        snip.push_str("...");
    }
    snip
}

fn redact_query_pairs(q: Option<&[(&str, Cow<'_, str>)]>) -> Vec<(String, String)> {
    q.map(|pairs| {
        pairs
            .iter()
            .map(|(k, v)| {
                let is_secret = matches!(
                    k.to_ascii_lowercase().as_str(),
                    "access_token"
                        | "authorization"
                        | "auth"
                        | "key"
                        | "api_key"
                        | "token"
                        | "secret"
                        | "client_secret"
                        | "bearer"
                );
                (
                    (*k).to_string(),
                    if is_secret {
                        "<redacted>".to_string()
                    } else {
                        v.as_ref().to_string()
                    },
                )
            })
            .collect()
    })
    .unwrap_or_default()
}

fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    // 1) Trim outer spaces/quotes
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();

    // 2) Remove *all* ASCII whitespace (spaces, tabs, newlines, carriage returns)
    s.retain(|ch| !ch.is_ascii_whitespace());

    // 3) Ensure ASCII and no control chars
    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    // 4) Validate header value upfront for clear errors
    HeaderValue::from_str(&format!("Bearer {}", s))
        .map_err(|e| HttpError::Build(format!("invalid Authorization header: {e}")))?;
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_timeout_and_retries() {
        let client = HttpClient::new("https://api.example.com")
            .unwrap()
            .with_timeout(Duration::from_secs(40))
            .with_retries(5);
        assert_eq!(client.default_timeout, Duration::from_secs(40));
        assert_eq!(client.max_retries, 5);
    }

    #[test]
    fn sanitize_strips_quotes_and_whitespace() {
        let got = sanitize_api_key("  \"AAAA BBBB\nCCCC\"  ").unwrap();
        assert_eq!(got, "AAAABBBBCCCC");
    }

    #[test]
    fn sanitize_rejects_non_ascii() {
        assert!(sanitize_api_key("tökén").is_err());
    }

    #[test]
    fn redaction_hides_secret_params() {
        let q: Vec<(&str, Cow<'_, str>)> = vec![
            ("q", "from:houstontranstar".into()),
            ("access_token", "hunter2".into()),
        ];
        let redacted = redact_query_pairs(Some(&q));
        assert_eq!(redacted[0].1, "from:houstontranstar");
        assert_eq!(redacted[1].1, "<redacted>");
    }

    #[test]
    fn error_message_prefers_twitter_envelope() {
        let body = br#"{"errors":[{"message":"","detail":"window too wide","title":"Invalid Request"}]}"#;
        assert_eq!(extract_error_message(body), "window too wide");
    }

    #[test]
    fn error_message_falls_back_to_snippet() {
        assert_eq!(extract_error_message(b"oops"), "oops");
    }
}

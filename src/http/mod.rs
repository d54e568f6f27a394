//! Shared HTTP execution core.
//!
//! Every resource call goes through [`Client::new_request`] and
//! [`Client::do_request`]: auth injection, the preemptive rate check, the
//! network exchange, rate bookkeeping, pagination and error classification
//! all happen here.

pub mod classify;
pub mod link;

use crate::config::Config;
use crate::error::{DecodeError, Error, RateLimitError, Result};
use crate::rate::{Category, RateTracker};
use crate::resources::{AppsService, GroupsService, UsersService};
use crate::types::{Pagination, Rate};
use bytes::Bytes;
use chrono::Utc;
use log::{debug, info, warn};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

pub use classify::{check_response, parse_rate, request_id};
pub use link::parse_pagination;

pub const DEFAULT_USER_AGENT: &str = concat!("okta-client/", env!("CARGO_PKG_VERSION"));
pub const AUTH_SCHEME: &str = "SSWS";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// When set to a non-empty value, full request and response text is logged.
pub const ENV_DEBUG: &str = "OKTA_CLIENT_DEBUG";

/// Placeholder for calls that send no body.
pub const NO_BODY: Option<&()> = None;

const SENSITIVE_QUERY_KEYS: &[&str] = &[
    "token",
    "access_token",
    "api_key",
    "apikey",
    "client_secret",
    "password",
];

/// Metadata of one API response.
///
/// Returned alongside decoded values, and carried inside rate-limit and API
/// errors so it is available on failure too.
#[derive(Debug, Clone)]
pub struct Response {
    pub method: Method,
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub pagination: Pagination,
    pub rate: Rate,
    /// Value of the `X-Okta-Request-Id` header.
    pub request_id: Option<String>,
}

/// Cancellation and deadline for a single call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::default().deadline_at(Instant::now() + timeout)
    }

    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            cancel: token,
            deadline: None,
        }
    }

    #[must_use]
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Why the context is done, if it is.
    pub fn err(&self) -> Option<Error> {
        if self.cancel.is_cancelled() {
            return Some(Error::Cancelled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }

    async fn run<F: Future>(&self, fut: F) -> Result<F::Output> {
        if let Some(e) = self.err() {
            return Err(e);
        }
        let deadline = async {
            match self.deadline {
                Some(d) => tokio::time::sleep_until(d).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            _ = deadline => Err(Error::DeadlineExceeded),
            out = fut => Ok(out),
        }
    }
}

/// Okta API client.
///
/// Holds the per-category rate table for its whole lifetime; share one
/// instance (by reference or `Arc`) between concurrent callers.
pub struct Client {
    http: reqwest::Client,
    auth: HeaderValue,
    user_agent: Option<HeaderValue>,
    base_url: Url,
    rates: RateTracker,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

/// Default transport: rustls with a request timeout.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .use_rustls_tls()
        .build()
        .map_err(|e| Error::validation(format!("failed to build HTTP transport: {}", e)))
}

impl Client {
    /// Creates a client for `base_url`, which must end with `/`
    /// (e.g. `https://acme.okta.com/api/v1/`).
    pub fn new(
        api_token: &str,
        base_url: &str,
        http: Option<reqwest::Client>,
    ) -> Result<Self> {
        if api_token.is_empty() {
            return Err(Error::validation("API token is not present"));
        }
        if base_url.is_empty() {
            return Err(Error::validation("base URL is not present"));
        }
        let parsed = Url::parse(base_url)
            .map_err(|e| Error::validation(format!("base URL {:?} is invalid: {}", base_url, e)))?;
        if !base_url.ends_with('/') || !parsed.path().ends_with('/') {
            return Err(Error::validation(format!(
                "base URL must have a trailing slash, but {:?} does not",
                base_url
            )));
        }
        let mut auth = HeaderValue::from_str(&format!("{} {}", AUTH_SCHEME, api_token))
            .map_err(|_| Error::validation("API token contains invalid header characters"))?;
        auth.set_sensitive(true);
        let http = match http {
            Some(h) => h,
            None => build_http_client(DEFAULT_TIMEOUT)?,
        };
        Ok(Self {
            http,
            auth,
            user_agent: Some(HeaderValue::from_static(DEFAULT_USER_AGENT)),
            base_url: parsed,
            rates: RateTracker::new(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let http = build_http_client(Duration::from_secs(cfg.timeout_secs))?;
        Self::new(&cfg.api_token, &cfg.base_url, Some(http))?.with_user_agent(&cfg.user_agent)
    }

    /// Overrides the User-Agent header. An empty string sends none.
    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self> {
        self.user_agent = if user_agent.is_empty() {
            None
        } else {
            Some(
                HeaderValue::from_str(user_agent)
                    .map_err(|_| Error::validation("User-Agent contains invalid characters"))?,
            )
        };
        Ok(self)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn rates(&self) -> &RateTracker {
        &self.rates
    }

    /// Last known rate for `category`.
    pub fn rate(&self, category: Category) -> Rate {
        self.rates.get(category)
    }

    pub fn apps(&self) -> AppsService<'_> {
        AppsService::new(self)
    }

    pub fn groups(&self) -> GroupsService<'_> {
        GroupsService::new(self)
    }

    pub fn users(&self) -> UsersService<'_> {
        UsersService::new(self)
    }

    /// Builds a request for `path`, resolved against the base URL with
    /// standard URL-merge rules. Does no I/O.
    pub fn new_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Request> {
        let url = self.base_url.join(path)?;
        let mut req = reqwest::Request::new(method, url);
        let headers = req.headers_mut();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(ua) = &self.user_agent {
            headers.insert(USER_AGENT, ua.clone());
        }
        if let Some(body) = body {
            let payload = serde_json::to_vec(body).map_err(Error::Encode)?;
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *req.body_mut() = Some(payload.into());
        }
        Ok(req)
    }

    /// Runs `req` through the pipeline and returns the response metadata and
    /// the raw body of a 2xx answer.
    pub async fn do_request(
        &self,
        mut req: reqwest::Request,
        category: Category,
        ctx: &CallContext,
    ) -> Result<(Response, Bytes)> {
        let dump = debug_enabled();
        if dump {
            info!("Request:\n{}", dump_request(&req));
        }
        req.headers_mut().insert(AUTHORIZATION, self.auth.clone());
        let method = req.method().clone();
        let url = req.url().clone();

        if let Some(err) = self.check_rate_limit_before_do(&method, &url, category) {
            warn!(
                "{} {} not sent: {} rate limit still in effect",
                method,
                clean_url(&url),
                category
            );
            return Err(Error::RateLimit(Box::new(err)));
        }

        debug!("{} {} [{}]", method, clean_url(&url), category);
        let exchange = async {
            let res = self.http.execute(req).await?;
            let status = res.status();
            let headers = res.headers().clone();
            let body = res.bytes().await?;
            Ok::<_, reqwest::Error>((status, headers, body))
        };
        let (status, headers, body) = match ctx.run(exchange).await? {
            Ok(parts) => parts,
            Err(e) => {
                if let Some(cause) = ctx.err() {
                    return Err(cause);
                }
                let cleaned = clean_url(&url);
                let source = e.without_url();
                warn!("{} {} failed: {}", method, cleaned, source);
                if dump {
                    info!("Response:\n{}", dump_transport_error(&source));
                }
                return Err(Error::Transport {
                    method,
                    url: cleaned,
                    source,
                });
            }
        };

        let rate = parse_rate(&headers);
        self.rates.set(category, rate);
        let response = Response {
            method,
            url,
            status,
            pagination: parse_pagination(&headers),
            rate,
            request_id: request_id(&headers),
            headers,
        };
        if dump {
            info!("Response:\n{}", dump_response(&response, &body));
        }
        let response = check_response(response, &body)?;
        Ok((response, body))
    }

    /// Builds, sends and JSON-decodes one call. An empty body decodes to `None`.
    pub async fn execute<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        category: Category,
        ctx: &CallContext,
    ) -> Result<(Option<T>, Response)>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self.new_request(method, path, body)?;
        let (response, bytes) = self.do_request(req, category, ctx).await?;
        let value = decode_body(&response, &bytes)?;
        Ok((value, response))
    }

    /// Like [`Client::execute`] but hands back the body bytes verbatim.
    pub async fn execute_raw<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        category: Category,
        ctx: &CallContext,
    ) -> Result<(Bytes, Response)> {
        let req = self.new_request(method, path, body)?;
        let (response, bytes) = self.do_request(req, category, ctx).await?;
        Ok((bytes, response))
    }

    /// Fetches the page behind `pagination.next`, or `None` on the last page.
    ///
    /// The cursor URL is used as given, even if it points away from the base
    /// URL's origin.
    pub async fn next_page<T: DeserializeOwned>(
        &self,
        pagination: &Pagination,
        category: Category,
        ctx: &CallContext,
    ) -> Result<Option<(Option<T>, Response)>> {
        let Some(next) = &pagination.next else {
            return Ok(None);
        };
        if next.origin() != self.base_url.origin() {
            warn!(
                "following pagination cursor outside {}: {}",
                self.base_url.origin().ascii_serialization(),
                clean_url(next)
            );
        }
        self.execute(Method::GET, next.as_str(), NO_BODY, category, ctx)
            .await
            .map(Some)
    }

    fn check_rate_limit_before_do(
        &self,
        method: &Method,
        url: &Url,
        category: Category,
    ) -> Option<RateLimitError> {
        let rate = self.rates.get(category);
        if !rate.is_exhausted_at(Utc::now()) {
            return None;
        }
        let reset = rate
            .reset
            .map(|r| r.to_rfc3339())
            .unwrap_or_default();
        Some(RateLimitError {
            rate,
            message: format!(
                "API rate limit of {} still in effect until {}, not making remote request.",
                rate.limit, reset
            ),
            response: Response {
                method: method.clone(),
                url: url.clone(),
                status: StatusCode::FORBIDDEN,
                headers: HeaderMap::new(),
                pagination: Pagination::default(),
                rate,
                request_id: None,
            },
        })
    }
}

fn decode_body<T: DeserializeOwned>(response: &Response, body: &[u8]) -> Result<Option<T>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some).map_err(|source| {
        Error::Decode(Box::new(DecodeError {
            response: response.clone(),
            source,
        }))
    })
}

fn debug_enabled() -> bool {
    std::env::var(ENV_DEBUG).is_ok_and(|v| !v.is_empty())
}

/// Drops userinfo and masks the values of credential-like query parameters.
pub fn clean_url(url: &Url) -> String {
    let mut cleaned = url.clone();
    let _ = cleaned.set_username("");
    let _ = cleaned.set_password(None);
    let has_secret = url
        .query_pairs()
        .any(|(k, _)| SENSITIVE_QUERY_KEYS.contains(&k.to_ascii_lowercase().as_str()));
    if has_secret {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let v = if SENSITIVE_QUERY_KEYS.contains(&k.to_ascii_lowercase().as_str()) {
                    "REDACTED".to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), v)
            })
            .collect();
        cleaned.query_pairs_mut().clear().extend_pairs(pairs);
    }
    cleaned.to_string()
}

fn write_headers(out: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        let value = if value.is_sensitive() {
            "<redacted>"
        } else {
            value.to_str().unwrap_or("<binary>")
        };
        out.push_str(&format!("{}: {}\n", name, value));
    }
}

fn dump_request(req: &reqwest::Request) -> String {
    let mut out = format!("{} {}\n", req.method(), clean_url(req.url()));
    write_headers(&mut out, req.headers());
    if let Some(body) = req.body().and_then(|b| b.as_bytes()) {
        out.push('\n');
        out.push_str(&String::from_utf8_lossy(body));
    }
    out
}

fn dump_response(response: &Response, body: &[u8]) -> String {
    let mut out = format!("{}\n", response.status);
    write_headers(&mut out, &response.headers);
    out.push('\n');
    out.push_str(&String::from_utf8_lossy(body));
    out
}

fn dump_transport_error(err: &reqwest::Error) -> String {
    let mut out = format!("transport error: {}", err);
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        out.push_str(&format!(": {}", cause));
        source = std::error::Error::source(cause);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> Client {
        Client::new("tok", "https://acme.okta.com/api/v1/", None).unwrap()
    }

    #[test]
    fn construction_validation() {
        for (token, base) in [
            ("", "https://acme.okta.com/api/v1/"),
            ("tok", ""),
            ("tok", "https://acme.okta.com/api/v1"),
            ("tok", "https://acme.okta.com"),
            ("tok", "not a url/"),
        ] {
            let err = Client::new(token, base, None).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{} {}", token, base);
        }
    }

    #[test]
    fn request_without_body() {
        let req = client()
            .new_request(Method::GET, "users/00u1", NO_BODY)
            .unwrap();
        assert_eq!(req.url().as_str(), "https://acme.okta.com/api/v1/users/00u1");
        assert_eq!(req.headers()[ACCEPT], "application/json");
        assert_eq!(req.headers()[USER_AGENT], DEFAULT_USER_AGENT);
        assert!(req.headers().get(CONTENT_TYPE).is_none());
        assert!(req.headers().get(AUTHORIZATION).is_none());
        assert!(req.body().is_none());
    }

    #[test]
    fn request_with_body_keeps_literal_characters() {
        let body = json!({"url": "https://example.com/?a=1&b=<2>"});
        let req = client()
            .new_request(Method::POST, "apps?activate=true", Some(&body))
            .unwrap();
        assert_eq!(req.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(req.url().query(), Some("activate=true"));
        let sent = req.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(
            std::str::from_utf8(sent).unwrap(),
            r#"{"url":"https://example.com/?a=1&b=<2>"}"#
        );
    }

    #[test]
    fn empty_user_agent_sends_none() {
        let c = client().with_user_agent("").unwrap();
        let req = c.new_request(Method::DELETE, "groups/00g1", NO_BODY).unwrap();
        assert!(req.headers().get(USER_AGENT).is_none());
    }

    #[test]
    fn absolute_path_replaces_base() {
        let req = client()
            .new_request(Method::GET, "https://other.okta.com/api/v1/users?after=x", NO_BODY)
            .unwrap();
        assert_eq!(req.url().host_str(), Some("other.okta.com"));
    }

    #[test]
    fn preemptive_check_only_when_exhausted() {
        let c = client();
        let url = c.base_url().join("users").unwrap();
        assert!(c
            .check_rate_limit_before_do(&Method::GET, &url, Category::UsersCreateList)
            .is_none());

        c.rates().set(
            Category::UsersCreateList,
            Rate {
                limit: 600,
                remaining: 0,
                reset: Some(Utc::now() + chrono::Duration::seconds(60)),
            },
        );
        let err = c
            .check_rate_limit_before_do(&Method::GET, &url, Category::UsersCreateList)
            .unwrap();
        assert_eq!(err.response.status, StatusCode::FORBIDDEN);
        assert!(err.message.contains("still in effect"));
        assert!(c
            .check_rate_limit_before_do(&Method::GET, &url, Category::Core)
            .is_none());
    }

    #[test]
    fn url_cleaning() {
        let url = Url::parse("https://user:pw@acme.okta.com/api/v1/users?limit=2&token=s3cr3t").unwrap();
        assert_eq!(
            clean_url(&url),
            "https://acme.okta.com/api/v1/users?limit=2&token=REDACTED"
        );
        let plain = Url::parse("https://acme.okta.com/api/v1/users?q=a%20b").unwrap();
        assert_eq!(clean_url(&plain), plain.as_str());
    }

    #[test]
    fn whitespace_body_decodes_to_none() {
        let c = client();
        let resp = Response {
            method: Method::GET,
            url: c.base_url().clone(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            pagination: Pagination::default(),
            rate: Rate::default(),
            request_id: None,
        };
        let v: Option<serde_json::Value> = decode_body(&resp, b" \n").unwrap();
        assert!(v.is_none());
        let err = decode_body::<serde_json::Value>(&resp, b"{oops").unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn request_dump_masks_secrets() {
        let body = json!({"profile": {"name": "Everyone"}});
        let mut req = client()
            .new_request(Method::POST, "groups?token=s3cr3t", Some(&body))
            .unwrap();
        let mut session = HeaderValue::from_static("sid=abc123");
        session.set_sensitive(true);
        req.headers_mut().insert(reqwest::header::COOKIE, session);

        let out = dump_request(&req);
        assert!(out.starts_with("POST https://acme.okta.com/api/v1/groups?token=REDACTED\n"));
        assert!(out.contains("cookie: <redacted>\n"));
        assert!(out.contains("accept: application/json\n"));
        assert!(out.ends_with(r#"{"profile":{"name":"Everyone"}}"#));
        assert!(!out.contains("s3cr3t"));
        assert!(!out.contains("abc123"));
        // the request is dumped before the credential is attached
        assert!(!out.contains("authorization"));
        assert!(!out.contains("SSWS"));
    }

    #[test]
    fn response_dump_has_status_headers_and_body() {
        let c = client();
        let mut headers = HeaderMap::new();
        headers.insert("x-okta-request-id", HeaderValue::from_static("req-1"));
        let mut cookie = HeaderValue::from_static("JSESSIONID=xyz");
        cookie.set_sensitive(true);
        headers.insert(reqwest::header::SET_COOKIE, cookie);
        let resp = Response {
            method: Method::GET,
            url: c.base_url().join("users/me").unwrap(),
            status: StatusCode::NOT_FOUND,
            headers,
            pagination: Pagination::default(),
            rate: Rate::default(),
            request_id: Some("req-1".into()),
        };
        let out = dump_response(&resp, br#"{"errorCode":"E0000007"}"#);
        assert!(out.starts_with("404 Not Found\n"));
        assert!(out.contains("x-okta-request-id: req-1\n"));
        assert!(out.contains("set-cookie: <redacted>\n"));
        assert!(!out.contains("xyz"));
        assert!(out.ends_with("\n\n{\"errorCode\":\"E0000007\"}"));
    }

    #[tokio::test]
    async fn transport_error_dump_omits_url() {
        let err = reqwest::Client::new()
            .get("http://admin:pw@127.0.0.1:1/api/v1/users?token=s3cr3t")
            .send()
            .await
            .unwrap_err()
            .without_url();
        let out = dump_transport_error(&err);
        assert!(out.starts_with("transport error: "));
        assert!(!out.contains("s3cr3t"));
        assert!(!out.contains("admin:pw"));
    }

    #[tokio::test]
    async fn cancelled_context_short_circuits() {
        let ctx = CallContext::background();
        ctx.cancel();
        let out = ctx.run(async { 1 }).await;
        assert!(matches!(out, Err(Error::Cancelled)));

        let ctx = CallContext::with_timeout(Duration::from_millis(10));
        let out = ctx.run(std::future::pending::<()>()).await;
        assert!(matches!(out, Err(Error::DeadlineExceeded)));

        let ok = CallContext::background().run(async { 7 }).await.unwrap();
        assert_eq!(ok, 7);
    }
}

//! Transport boundary for all HTTP I/O.
//!
//! Everything that talks to GitHub goes through [`HttpTransport`], so the
//! fetch pipeline can be exercised in tests without sockets. Only GET is
//! needed: the aggregator never writes to GitHub.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use thiserror::Error;

/// Header name/value pairs, looked up case-insensitively through
/// [`header_get`].
pub type HttpHeaders = Vec<(String, String)>;

/// An outgoing GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HttpHeaders,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A 200 with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// A bodiless response, e.g. a 403 carrying rate limit headers.
    pub fn status(status: u16, headers: HttpHeaders) -> Self {
        Self {
            status,
            headers,
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("no mock response registered for GET {url}")]
    NoMockResponse { url: String },
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// First value of header `name`, ignoring ASCII case.
#[must_use]
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find_map(|(k, v)| k.eq_ignore_ascii_case(name).then_some(v.as_str()))
}

/// [`HttpTransport`] over a shared reqwest client.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Bound every call, connect through body, by `timeout`.
    pub fn with_timeout(timeout: StdDuration) -> Result<Self, HttpError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map(Self::new)
            .map_err(HttpError::from)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let builder = request
            .headers
            .iter()
            .fold(self.client.get(&request.url), |b, (k, v)| b.header(k, v));

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        // Non-UTF-8 header values are never ones GitHub's rate limiting uses.
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = resp.bytes().await?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
pub use mock::MockTransport;

#[cfg(test)]
mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex, MutexGuard};

    use super::*;

    enum Reply {
        Respond(HttpResponse),
        Fail(String),
    }

    #[derive(Default)]
    struct Routes {
        replies: HashMap<String, VecDeque<Reply>>,
        seen: Vec<HttpRequest>,
    }

    /// Scripted transport keyed by full URL. Replies registered for the
    /// same URL are served in order; unscripted URLs fail.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        routes: Arc<Mutex<Routes>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        fn routes(&self) -> MutexGuard<'_, Routes> {
            self.routes.lock().unwrap_or_else(|e| e.into_inner())
        }

        fn script(&self, url: impl Into<String>, reply: Reply) {
            self.routes()
                .replies
                .entry(url.into())
                .or_default()
                .push_back(reply);
        }

        pub fn push_response(&self, url: impl Into<String>, response: HttpResponse) {
            self.script(url, Reply::Respond(response));
        }

        /// Script a 200 with a JSON body.
        pub fn push_json(&self, url: impl Into<String>, body: serde_json::Value) {
            let mut response = HttpResponse::ok(body.to_string());
            response
                .headers
                .push(("Content-Type".to_string(), "application/json".to_string()));
            self.push_response(url, response);
        }

        pub fn push_status(&self, url: impl Into<String>, status: u16, headers: HttpHeaders) {
            self.push_response(url, HttpResponse::status(status, headers));
        }

        pub fn push_transport_error(&self, url: impl Into<String>, message: impl Into<String>) {
            self.script(url, Reply::Fail(message.into()));
        }

        /// Every request received, in order.
        pub fn requests(&self) -> Vec<HttpRequest> {
            self.routes().seen.clone()
        }

        pub fn requested_urls(&self) -> Vec<String> {
            self.routes().seen.iter().map(|r| r.url.clone()).collect()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let mut routes = self.routes();
            let url = request.url.clone();
            routes.seen.push(request);

            match routes.replies.get_mut(&url).and_then(VecDeque::pop_front) {
                Some(Reply::Respond(response)) => Ok(response),
                Some(Reply::Fail(message)) => Err(HttpError::Transport(message)),
                None => Err(HttpError::NoMockResponse { url }),
            }
        }
    }
}

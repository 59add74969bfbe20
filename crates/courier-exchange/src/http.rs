//! HTTP plumbing for the dispatcher: a configured `reqwest` client and an
//! exchange function that buffers the response body.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, Request, StatusCode};

use courier_core::config::HttpSettings;
use courier_core::{Content, Header};

use crate::task::{Deadline, Timed};

pub const CONTENT_TYPE: &str = "content-type";

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request body is a stream and cannot be re-sent")]
    Unclonable,
    #[error("request deadline exceeded")]
    Timeout,
    #[error("HTTP exchange failed: {0}")]
    Transport(#[source] reqwest::Error),
}

impl HttpError {
    /// The response that stands in for this failure: `504` on a timeout,
    /// `500` for anything else.
    pub fn response(&self) -> HttpResponse {
        match self {
            HttpError::Timeout => HttpResponse::gateway_timeout(),
            _ => HttpResponse::server_error(),
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpError::Timeout
        } else {
            HttpError::Transport(e)
        }
    }
}

/// Raw requests carry no deadline of their own.
impl Deadline for Request {}

/// Build the shared client from settings.
pub fn default_client(settings: &HttpSettings) -> Result<Client, HttpError> {
    let mut builder = Client::builder().pool_max_idle_per_host(settings.max_idle_per_host);
    if settings.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(settings.timeout_ms));
    }
    if !settings.user_agent.is_empty() {
        builder = builder.user_agent(settings.user_agent.clone());
    }
    builder.build().map_err(HttpError::Client)
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: Header,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: Header, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Empty `504 Gateway Timeout`.
    pub fn gateway_timeout() -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, Header::new(), Bytes::new())
    }

    /// Empty `500 Internal Server Error`.
    pub fn server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, Header::new(), Bytes::new())
    }

    /// The body as a content envelope tagged with the response's Content-Type.
    pub fn content(&self) -> Content {
        Content::new(self.headers.get(CONTENT_TYPE), self.body.clone())
    }
}

/// Send `request` and buffer the response, bounded by its deadline if any.
pub async fn execute(client: &Client, request: &Timed<Request>) -> Result<HttpResponse, HttpError> {
    let req = request.request().try_clone().ok_or(HttpError::Unclonable)?;
    let send = async {
        let resp = client.execute(req).await?;
        let status = resp.status();
        let mut headers = Header::new();
        for (name, value) in resp.headers() {
            headers.add(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
        let body = resp.bytes().await?;
        Ok::<_, HttpError>(HttpResponse::new(status, headers, body))
    };

    match request.deadline() {
        Some(deadline) => {
            tokio::time::timeout_at(deadline.into(), send)
                .await
                .map_err(|_| HttpError::Timeout)?
        }
        None => send.await,
    }
}

pub type HttpFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send>>;

/// Exchange function for [`crate::dispatch`] backed by `client`.
pub fn exchange(client: Client) -> impl Fn(Arc<Timed<Request>>) -> HttpFuture + Send + Sync + 'static {
    move |request| {
        let client = client.clone();
        Box::pin(async move { execute(&client, &request).await })
    }
}

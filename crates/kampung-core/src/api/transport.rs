//! Request pipeline shared by every API facade.
//!
//! Outgoing requests pick up the bearer token from the session store.
//! Responses are classified into `ApiError` kinds; a 401 comes back as
//! `ApiErrorKind::Unauthorized` and is never acted on here.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{ApiError, ApiResult};
use crate::session::SessionStore;

/// Standard User-Agent header for KampunG API requests.
pub const USER_AGENT: &str = concat!("kampung/", env!("CARGO_PKG_VERSION"));

/// Configured HTTP client bound to one API origin and one session store.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration, store: Arc<dyn SessionStore>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let body = self.execute::<()>(Method::GET, path, &[], None).await?;
        decode(&body)
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let body = self.execute::<()>(Method::GET, path, query, None).await?;
        decode(&body)
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let body = self.execute(Method::POST, path, &[], Some(body)).await?;
        decode(&body)
    }

    /// POST without a request body (toggle endpoints).
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let body = self.execute::<()>(Method::POST, path, &[], None).await?;
        decode(&body)
    }

    /// DELETE whose response body, if any, is ignored.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.execute::<()>(Method::DELETE, path, &[], None)
            .await
            .map(|_| ())
    }

    /// Raw POST returning the undecoded body, for endpoints with several
    /// possible response shapes.
    pub async fn post_raw<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<String> {
        self.execute(Method::POST, path, &[], Some(body)).await
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> ApiResult<String> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, path, "api request");

        let mut builder = self.http.request(method.clone(), url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let builder = self.authorize(builder);

        let response = builder.send().await.map_err(classify_send_error)?;
        let status = response.status();
        let text = response.text().await.map_err(classify_send_error)?;

        tracing::debug!(%method, path, status = status.as_u16(), "api response");
        if status.is_success() {
            Ok(text)
        } else {
            Err(ApiError::http_status(status.as_u16(), &text))
        }
    }

    /// Attaches `Authorization: Bearer <token>` when a token is stored.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.store.access_token() {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }
}

fn classify_send_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::timeout("Request timed out")
    } else if err.is_decode() {
        ApiError::parse(format!("Failed to read response body: {err}"))
    } else {
        ApiError::network(err.to_string())
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    // Empty bodies decode as JSON null so `()` and `Option<_>` targets work.
    let source = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(source).map_err(|err| ApiError {
        details: Some(body.to_string()),
        ..ApiError::parse(format!("Failed to decode response: {err}"))
    })
}

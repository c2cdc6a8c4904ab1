//! # HTTP Transport
//!
//! The single place requests leave the process.
//!
//! ## Request Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Request Pipeline                                │
//! │                                                                         │
//! │  ApiRequest ──► join base URL ──► Authorization: Bearer <token>?        │
//! │                                   X-Request-Id: <uuid v4>               │
//! │                                   body (JSON | form | multipart)        │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                                   reqwest::Client                       │
//! │                                          │                              │
//! │            ┌─────────────────────────────┼──────────────────────┐       │
//! │            ▼                             ▼                      ▼       │
//! │     no response               2xx                         401           │
//! │     ApiError::Network         decode T             session.expire(tok) │
//! │                                                    ApiError::Unauthorized│
//! │                               other status → ApiError::from_response    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The token is read once per request and reported back on a 401, so only the
//! session that was actually rejected gets cleared.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use showroom_core::ImportUpload;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::SessionStore;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

// =============================================================================
// Request Description
// =============================================================================

/// Request payload.
#[derive(Debug, Clone)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
    Multipart(ImportUpload),
}

/// A request relative to the API root.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Relative path without a leading slash, e.g. `vehicle-stock/4/adjust`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query<K: Into<String>>(mut self, pairs: Vec<(K, String)>) -> Self {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Internal(format!("failed to encode request body: {}", e)))?;
        self.body = Body::Json(value);
        Ok(self)
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Body::Form(fields);
        self
    }

    pub fn multipart(mut self, upload: ImportUpload) -> Self {
        self.body = Body::Multipart(upload);
        self
    }
}

// =============================================================================
// Transport
// =============================================================================

/// reqwest client bound to one backend and one session.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpTransport {
            client,
            base_url: config.base_url()?,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Sends a request and decodes a JSON response.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let bytes = self.send_raw(request).await?;
        serde_json::from_slice(&bytes).map_err(ApiError::from)
    }

    /// Sends a request whose response body is ignored (e.g. `204 No Content`).
    pub async fn send_empty(&self, request: ApiRequest) -> ApiResult<()> {
        self.send_raw(request).await.map(|_| ())
    }

    /// Sends a request and returns the raw response body.
    pub async fn send_raw(&self, request: ApiRequest) -> ApiResult<Vec<u8>> {
        let url = self.url_for(&request)?;
        let token = self.session.access_token().await;
        let request_id = Uuid::new_v4();
        let method = request.method.clone();
        let path = request.path.clone();

        let builder = self
            .client
            .request(request.method, url)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        let builder = match &token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => builder,
        };
        let builder = attach_body(builder, request.body)?;

        debug!(
            method = %method,
            path = %path,
            request_id = %request_id,
            authenticated = token.is_some(),
            "Sending request"
        );
        let started = Instant::now();

        let response = builder.send().await.map_err(|e| {
            warn!(method = %method, path = %path, request_id = %request_id, error = %e, "Request failed");
            ApiError::from(e)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::from)?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if status.is_success() {
            debug!(
                method = %method,
                path = %path,
                request_id = %request_id,
                status = status.as_u16(),
                elapsed_ms,
                "Request completed"
            );
            return Ok(body.to_vec());
        }

        warn!(
            method = %method,
            path = %path,
            request_id = %request_id,
            status = status.as_u16(),
            elapsed_ms,
            "Request rejected"
        );

        let err = ApiError::from_response(status.as_u16(), &body);
        if matches!(err, ApiError::Unauthorized) {
            self.session.expire(token.as_deref()).await;
        }
        Err(err)
    }

    fn url_for(&self, request: &ApiRequest) -> ApiResult<Url> {
        let mut url = self
            .base_url
            .join(request.path.trim_start_matches('/'))?;
        if !request.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }
}

fn attach_body(builder: RequestBuilder, body: Body) -> ApiResult<RequestBuilder> {
    Ok(match body {
        Body::Empty => builder,
        Body::Json(value) => builder.json(&value),
        Body::Form(fields) => builder.form(&fields),
        Body::Multipart(upload) => {
            let mut form = Form::new().part(
                "file",
                Part::bytes(upload.bytes).file_name(upload.file_name),
            );
            if let Some(branch_id) = upload.branch_id {
                form = form.text("branch_id", branch_id.to_string());
            }
            if let Some(sheet) = upload.sheet_name.filter(|s| !s.trim().is_empty()) {
                form = form.text("sheet_name", sheet);
            }
            builder.multipart(form)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> HttpTransport {
        let config = ClientConfig::for_base_url(base);
        HttpTransport::new(&config, Arc::new(SessionStore::in_memory())).unwrap()
    }

    #[test]
    fn test_url_joins_under_versioned_root() {
        let t = transport("http://localhost:8000/api/v1");
        let url = t.url_for(&ApiRequest::get("/branches")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/branches");
    }

    #[test]
    fn test_url_encodes_query() {
        let t = transport("http://localhost:8000/api/v1/");
        let request = ApiRequest::get("customers").query(vec![
            ("search", "Ravi & Sons".to_string()),
            ("limit", "50".to_string()),
        ]);
        let url = t.url_for(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/customers?search=Ravi+%26+Sons&limit=50"
        );
    }

    #[test]
    fn test_json_body_encoding() {
        let request = ApiRequest::post("vehicle-stock/1/adjust")
            .json(&showroom_core::StockAdjustment { adjustment: -2 })
            .unwrap();
        match request.body {
            Body::Json(value) => assert_eq!(value, serde_json::json!({ "adjustment": -2 })),
            other => panic!("unexpected body {:?}", other),
        }
    }
}

use crate::adapter::body_message;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

pub use reqwest::Method;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiErrorKind {
    Transport,
    Application,
    Unauthorized,
    Http,
    ShapeMismatch,
    Validation,
    Storage,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Network failure, DNS, timeout: the request never produced a response.
    #[error("{message}")]
    Transport { message: String, timed_out: bool },

    /// 2xx response carrying an explicit failure marker.
    #[error("{message}")]
    Application { message: String },

    /// 401 or 403.
    #[error("{message}")]
    Unauthorized { status: u16, message: String },

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("API connected, but no {entity} array found in response.")]
    ShapeMismatch { entity: &'static str },

    /// Rejected locally before any network call.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Storage(String),
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            ApiError::Transport { .. } => ApiErrorKind::Transport,
            ApiError::Application { .. } => ApiErrorKind::Application,
            ApiError::Unauthorized { .. } => ApiErrorKind::Unauthorized,
            ApiError::Http { .. } => ApiErrorKind::Http,
            ApiError::ShapeMismatch { .. } => ApiErrorKind::ShapeMismatch,
            ApiError::Validation(_) => ApiErrorKind::Validation,
            ApiError::Storage(_) => ApiErrorKind::Storage,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind() == ApiErrorKind::Unauthorized
    }

    pub fn transport(message: impl Into<String>) -> Self {
        ApiError::Transport {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout() -> Self {
        ApiError::Transport {
            message: "Request timed out".to_string(),
            timed_out: true,
        }
    }

    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::timeout();
        }
        Self::transport(e.to_string())
    }

    /// Error for a non-2xx response. The body's own message wins over the
    /// generic status text.
    pub fn from_status(response: &ApiResponse) -> Self {
        let status = response.status;
        let message = body_message(&response.body)
            .unwrap_or_else(|| format!("Request failed with status code {status}"));
        if response.is_unauthorized() {
            ApiError::Unauthorized { status, message }
        } else {
            ApiError::Http { status, message }
        }
    }
}

impl From<crate::storage::StorageError> for ApiError {
    fn from(e: crate::storage::StorageError) -> Self {
        ApiError::Storage(e.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Clone, Debug, PartialEq)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// Sent as `multipart/form-data`, fields in order.
    Multipart(Vec<(String, FormValue)>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: RequestBody,
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            bearer: None,
            body: RequestBody::Empty,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, fields: Vec<(String, FormValue)>) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON; `Null` for empty or non-JSON bodies.
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, 401 | 403)
    }
}

/// Sends one request. Non-2xx responses are `Ok`; only a missing response is an error.
#[async_trait(?Send)]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse>;
}

/// Transport over `reqwest` (the Fetch API in the browser).
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_auth_headers(
        mut req: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    fn multipart_form(fields: Vec<(String, FormValue)>) -> ApiResult<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in fields {
            form = match value {
                FormValue::Text(text) => form.text(name, text),
                FormValue::File {
                    file_name,
                    mime,
                    bytes,
                } => {
                    let part = reqwest::multipart::Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&mime)
                        .map_err(|e| ApiError::Validation(format!("invalid file type: {e}")))?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

#[async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let ApiRequest {
            method,
            url,
            bearer,
            body,
            timeout,
        } = request;

        let mut req = self.client.request(method, url);
        req = Self::with_auth_headers(req, bearer.as_deref());

        req = match body {
            RequestBody::Empty => req,
            RequestBody::Json(value) => req.json(&value),
            RequestBody::Multipart(fields) => req.multipart(Self::multipart_form(fields)?),
        };

        // On wasm this aborts the fetch through an `AbortSignal`.
        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }

        let res = req.send().await.map_err(ApiError::from_reqwest)?;
        let status = res.status().as_u16();
        let text = res.text().await.map_err(ApiError::from_reqwest)?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        Ok(ApiResponse { status, body })
    }
}

//! HTTP request core shared by every façade.
//!
//! # Design
//! `ApiClient` is the single chokepoint for outgoing calls. Each call is
//! split into `build_request` (pure: URL, headers, body) and
//! `parse_response` (pure: classify status and body), with the
//! [`Transport`] executing the round-trip in between. Both halves are public
//! so hosts that drive their own I/O can reuse the classification.
//!
//! No retries, timeouts or caching happen here. Every failure propagates to
//! the caller unchanged.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, FALLBACK_MESSAGE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
use crate::session::Session;
use crate::transport::Transport;

/// What a call sends along with the request line.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

impl Payload {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(Payload::Json)
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

/// Outcome of a successful call.
///
/// `Empty` means the server sent nothing to parse (204, or a non-JSON
/// content type), which is distinct from a JSON payload that happens to be
/// empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Data(T),
    Empty,
}

impl<T> Reply<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Reply::Empty)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Reply::Data(data) => Some(data),
            Reply::Empty => None,
        }
    }

    /// The payload, or `MissingBody` when the server sent none.
    pub fn require(self) -> Result<T, ApiError> {
        self.into_option().ok_or(ApiError::MissingBody)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Client for the marketplace REST backend.
pub struct ApiClient {
    base_url: String,
    session: Session,
    transport: Box<dyn Transport>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session, transport: impl Transport + 'static) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            transport: Box::new(transport),
        }
    }

    /// Client wired with the blocking transport and the configured token store.
    #[cfg(feature = "ureq")]
    pub fn from_config(config: &crate::config::ClientConfig) -> Self {
        let session = match &config.token_file {
            Some(path) => Session::new(crate::session::FileTokenStore::new(path)),
            None => Session::anonymous(),
        };
        Self::new(&config.base_url, session, crate::transport::UreqTransport::new())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        payload: Payload,
    ) -> Result<HttpRequest, ApiError> {
        let mut headers = Vec::new();

        let body = match payload {
            Payload::Empty => None,
            Payload::Json(value) => {
                let text =
                    serde_json::to_string(&value).map_err(|e| ApiError::Serialization(e.to_string()))?;
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(RequestBody::Json(text))
            }
            // The transport picks the boundary, so it also owns the content type.
            Payload::Multipart(form) => Some(RequestBody::Multipart(form)),
        };

        if let Some(token) = self.session.token() {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }

        Ok(HttpRequest {
            method,
            url: format!("{}{endpoint}", self.base_url),
            headers,
            body,
            with_credentials: true,
        })
    }

    pub fn parse_response<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<Reply<T>, ApiError> {
        if !response.is_success() {
            let err = error_from_response(&response);
            log::warn!("request failed with {} {}: {err}", response.status, response.status_text);
            return Err(err);
        }
        if response.status == 204 || !response.is_json() {
            return Ok(Reply::Empty);
        }
        serde_json::from_str(&response.body)
            .map(Reply::Data)
            .map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Build, execute and classify one call.
    pub fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        payload: Payload,
    ) -> Result<Reply<T>, ApiError> {
        let request = self.build_request(method, endpoint, payload)?;
        log::debug!("{} {}", request.method, request.url);
        let response = self.transport.execute(request).inspect_err(|e| {
            log::warn!("{method} {endpoint} did not complete: {e}");
        })?;
        self.parse_response(response)
    }

    /// Like [`request`](Self::request) for calls whose response body is irrelevant.
    pub fn send(&self, method: HttpMethod, endpoint: &str, payload: Payload) -> Result<(), ApiError> {
        self.request::<IgnoredAny>(method, endpoint, payload).map(|_| ())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Map a non-2xx response to `ApiError::Api`.
///
/// The message is the backend's `{"message": ...}` when present, otherwise the
/// status text, otherwise [`FALLBACK_MESSAGE`].
fn error_from_response(response: &HttpResponse) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .or_else(|| (!response.status_text.is_empty()).then(|| response.status_text.clone()))
        .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

    ApiError::Api {
        message,
        status: response.status,
        status_text: response.status_text.clone(),
    }
}

//! Execution of [`HttpRequest`] values.
//!
//! # Design
//! The core never performs I/O itself; it hands finished requests to a
//! [`Transport`]. Non-2xx statuses come back as ordinary `HttpResponse`
//! data so the request core can classify them. Only failures to send the
//! request or read the response are errors at this layer.
//!
//! [`UreqTransport`] is the blocking transport shipped with the crate. Hosts
//! with their own HTTP stack implement the trait instead.

use std::sync::Arc;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "ureq")]
mod ureq_transport {
    use ureq::config::Config;
    use ureq::typestate::WithBody;
    use ureq::{Agent, RequestBuilder};
    use uuid::Uuid;

    use super::Transport;
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};

    /// Blocking transport backed by a `ureq` agent.
    ///
    /// The shared agent keeps a cookie jar, so cookie sessions set by the
    /// backend ride along with every later request that asks for
    /// credentials. Requests with `with_credentials: false` go through a
    /// throwaway agent with an empty jar and leave the shared one untouched.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        config: Config,
        agent: Agent,
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            // Status codes are data for the request core, not transport errors.
            let config = Agent::config_builder().http_status_as_error(false).build();
            let agent = Agent::new_with_config(config.clone());
            Self { config, agent }
        }

        fn agent_for(&self, with_credentials: bool) -> Agent {
            if with_credentials {
                self.agent.clone()
            } else {
                Agent::new_with_config(self.config.clone())
            }
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            let HttpRequest {
                method,
                url,
                headers,
                body,
                with_credentials,
            } = request;
            let agent = self.agent_for(with_credentials);

            let (payload, content_type) = match body {
                None => (None, None),
                Some(RequestBody::Json(text)) => (Some(text.into_bytes()), None),
                Some(RequestBody::Multipart(form)) => {
                    let boundary = format!("tutor-{}", Uuid::new_v4().simple());
                    (
                        Some(form.encode(&boundary)),
                        Some(MultipartForm::content_type(&boundary)),
                    )
                }
            };

            let result = match method {
                HttpMethod::Get => with_headers(agent.get(&url), &headers).call(),
                HttpMethod::Delete => with_headers(agent.delete(&url), &headers).call(),
                HttpMethod::Post => send(with_headers(agent.post(&url), &headers), content_type, payload),
                HttpMethod::Put => send(with_headers(agent.put(&url), &headers), content_type, payload),
                HttpMethod::Patch => send(with_headers(agent.patch(&url), &headers), content_type, payload),
            };

            let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

            let status = response.status();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            Ok(HttpResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                headers,
                body,
            })
        }
    }

    fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn send(
        builder: RequestBuilder<WithBody>,
        content_type: Option<String>,
        payload: Option<Vec<u8>>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        let builder = match content_type {
            Some(ct) => builder.header("content-type", ct.as_str()),
            None => builder,
        };
        match payload {
            Some(bytes) => builder.send(&bytes[..]),
            None => builder.send_empty(),
        }
    }
}

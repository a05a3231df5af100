//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Replays queued outcomes in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: HttpResponse) {
        self.outcomes.lock().unwrap().push_back(Ok(response));
    }

    pub fn fail(&self, reason: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Transport(reason.to_string())));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.seen.lock().unwrap().last().cloned().expect("no request recorded")
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.seen.lock().unwrap().push(request);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".to_string())))
    }
}

pub fn json_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        status_text: String::new(),
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: body.to_string(),
    }
}

pub fn text_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        status_text: String::new(),
        headers: vec![("content-type".to_string(), "text/html".to_string())],
        body: body.to_string(),
    }
}

pub fn empty_response(status: u16) -> HttpResponse {
    HttpResponse {
        status,
        status_text: String::new(),
        headers: Vec::new(),
        body: String::new(),
    }
}

pub fn error_response(status: u16, status_text: &str, message: &str) -> HttpResponse {
    HttpResponse {
        status_text: status_text.to_string(),
        ..json_response(status, &serde_json::json!({ "message": message }).to_string())
    }
}

/// Client over a fresh scripted transport, plus a handle to that transport.
pub fn scripted_client() -> (crate::ApiClient, std::sync::Arc<ScriptedTransport>) {
    let transport = std::sync::Arc::new(ScriptedTransport::new());
    let client = crate::ApiClient::new(
        "http://localhost:3000",
        crate::Session::anonymous(),
        transport.clone(),
    );
    (client, transport)
}

pub fn body_json(request: &HttpRequest) -> serde_json::Value {
    match &request.body {
        Some(crate::http::RequestBody::Json(text)) => serde_json::from_str(text).unwrap(),
        other => panic!("expected JSON body, got {other:?}"),
    }
}

//! In-memory stand-in for the tutoring marketplace REST backend.
//!
//! Serves the same routes the client talks to, with bearer-token auth,
//! `{"message": ...}` error bodies and 204 answers where the real backend
//! sends no content. State lives in a [`SharedDb`] so tests can inspect it or
//! flip [`Faults`] between calls.

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

mod account;
mod auth;
mod catalog;
mod inbox;
pub mod models;
pub mod state;

pub use models::*;
pub use state::{Db, Faults, SharedDb, SEED_PASSWORD, STUDENT_EMAIL, STUDENT_ID, TEACHER_EMAIL, TEACHER_ID};

/// Error answer: a status plus `{"message": ...}`.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    message: String,
}

impl Failure {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: &str) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, Failure>;

/// Cookie carrying the session token for clients that send credentials.
pub const SESSION_COOKIE: &str = "tutor_session";

/// Session token from the bearer header, else from the session cookie.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    bearer.or_else(|| {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value)
    })
}

/// Resolve the request's session token to its user.
pub(crate) fn caller(db: &Db, headers: &HeaderMap) -> ApiResult<User> {
    let token = session_token(headers).ok_or_else(|| Failure::unauthorized("Authentication required"))?;
    db.tokens
        .get(token)
        .and_then(|user_id| db.users.get(user_id))
        .cloned()
        .ok_or_else(|| Failure::unauthorized("Session expired, please sign in again"))
}

pub(crate) fn require_teacher(user: &User) -> ApiResult<()> {
    if user.role == "teacher" {
        Ok(())
    } else {
        Err(Failure::forbidden("Teacher account required"))
    }
}

pub fn app() -> Router {
    app_with_state(Db::seeded().shared())
}

pub fn app_with_state(db: SharedDb) -> Router {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/auth/profile", get(auth::profile))
        .route("/auth/logout", post(auth::logout))
        .route("/lessons", get(catalog::list_lessons).post(catalog::create_lesson))
        .route(
            "/lessons/{id}",
            get(catalog::get_lesson)
                .put(catalog::update_lesson)
                .delete(catalog::delete_lesson),
        )
        .route(
            "/lessons/{id}/ratings",
            get(catalog::list_ratings).post(catalog::create_rating),
        )
        .route("/student/lessons", get(catalog::student_lessons))
        .route(
            "/student/purchases",
            get(catalog::student_purchases).post(catalog::student_purchase),
        )
        .route(
            "/teacher/lessons",
            get(catalog::teacher_lessons).post(catalog::teacher_create_lesson),
        )
        .route("/teacher/lessons/{id}/students", get(catalog::teacher_lesson_students))
        .route("/teacher/stats", get(catalog::teacher_stats))
        .route("/purchases", get(catalog::list_purchases))
        .route("/purchases/checkout", post(catalog::checkout))
        .route("/payments/initiate-mobile-money", post(catalog::initiate_mobile_money))
        .route("/payments/initiate-bank-transfer", post(catalog::initiate_bank_transfer))
        .route("/users/upload-avatar", post(account::upload_avatar))
        .route("/users/profile", patch(account::update_profile))
        .route("/users/password", patch(account::change_password))
        .route(
            "/users/notification-preferences",
            get(account::preferences).put(account::update_preferences),
        )
        .route("/users/account", axum::routing::delete(account::delete_account))
        .route("/users/data-export", get(account::data_export))
        .route("/notifications", get(inbox::list_notifications))
        .route("/notifications/read-all", patch(inbox::mark_all_read))
        .route("/notifications/unread-count", get(inbox::unread_count))
        .route("/notifications/{id}/read", patch(inbox::mark_read))
        .route("/support/tickets", post(inbox::create_ticket))
        .route(
            "/chat/conversations",
            get(inbox::conversations).post(inbox::start_conversation),
        )
        .route(
            "/chat/conversations/{id}/messages",
            get(inbox::messages).post(inbox::send_message),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, Db::seeded().shared()).await
}

pub async fn run_with_state(listener: TcpListener, db: SharedDb) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "mock backend listening");
    }
    axum::serve(listener, app_with_state(db)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn caller_requires_bearer_scheme() {
        let mut db = Db::seeded();
        let token = db.issue_token(STUDENT_ID);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&token).unwrap());
        assert_eq!(caller(&db, &headers).unwrap_err().status, StatusCode::UNAUTHORIZED);

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        assert_eq!(caller(&db, &headers).unwrap().id, STUDENT_ID);
    }

    #[test]
    fn session_cookie_stands_in_for_bearer() {
        let mut db = Db::seeded();
        let token = db.issue_token(TEACHER_ID);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={token}")).unwrap(),
        );
        assert_eq!(caller(&db, &headers).unwrap().id, TEACHER_ID);

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(caller(&db, &headers).unwrap_err().status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn unknown_token_is_unauthorized() {
        let db = Db::seeded();
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer nope"));
        let failure = caller(&db, &headers).unwrap_err();
        assert_eq!(failure.status, StatusCode::UNAUTHORIZED);
        assert!(failure.message.contains("sign in"));
    }

    #[test]
    fn students_are_not_teachers() {
        let db = Db::seeded();
        assert!(require_teacher(&db.users[STUDENT_ID]).is_err());
        assert!(require_teacher(&db.users[TEACHER_ID]).is_ok());
    }
}

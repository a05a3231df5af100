use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::{AuthSession, Credentials, ForgotPassword, Registration, User};
use crate::state::{new_id, SharedDb};
use crate::{caller, session_token, ApiResult, Failure, SESSION_COOKIE};

/// Issues a token in the body and the same token as a session cookie.
pub async fn login(
    State(db): State<SharedDb>,
    Json(input): Json<Credentials>,
) -> ApiResult<([(header::HeaderName, String); 1], Json<AuthSession>)> {
    let mut db = db.write().await;
    let user = db
        .user_by_email(&input.email)
        .filter(|u| db.passwords.get(&u.id) == Some(&input.password))
        .cloned()
        .ok_or_else(|| Failure::unauthorized("Invalid credentials"))?;
    let token = db.issue_token(&user.id);
    tracing::debug!(user = %user.id, "login");
    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly");
    Ok(([(header::SET_COOKIE, cookie)], Json(AuthSession { token, user })))
}

pub async fn register(
    State(db): State<SharedDb>,
    Json(input): Json<Registration>,
) -> ApiResult<(StatusCode, Json<AuthSession>)> {
    if !matches!(input.role.as_str(), "student" | "teacher") {
        return Err(Failure::bad_request("Role must be student or teacher"));
    }
    let mut db = db.write().await;
    if db.user_by_email(&input.email).is_some() {
        return Err(Failure::new(StatusCode::CONFLICT, "Email already registered"));
    }
    let user = User {
        id: new_id("u"),
        email: input.email,
        first_name: input.first_name,
        last_name: input.last_name,
        role: input.role,
        avatar_url: None,
        phone: None,
        bio: None,
        created_at: Utc::now(),
    };
    db.insert_user(user.clone(), &input.password);
    let token = db.issue_token(&user.id);
    Ok((StatusCode::CREATED, Json(AuthSession { token, user })))
}

pub async fn forgot_password(Json(input): Json<ForgotPassword>) -> Json<Value> {
    tracing::debug!(email = %input.email, "password reset requested");
    Json(json!({ "message": "If that account exists, a reset link has been sent" }))
}

#[derive(Deserialize)]
pub struct ResetPassword {
    token: String,
    password: String,
}

pub async fn reset_password(Json(input): Json<ResetPassword>) -> ApiResult<Json<Value>> {
    if input.token.is_empty() || input.password.is_empty() {
        return Err(Failure::bad_request("Reset link is invalid or has expired"));
    }
    Ok(Json(json!({ "message": "Password has been reset" })))
}

pub async fn profile(State(db): State<SharedDb>, headers: HeaderMap) -> ApiResult<Json<User>> {
    let db = db.read().await;
    caller(&db, &headers).map(Json)
}

pub async fn logout(State(db): State<SharedDb>, headers: HeaderMap) -> StatusCode {
    if let Some(token) = session_token(&headers) {
        db.write().await.tokens.remove(token);
    }
    StatusCode::NO_CONTENT
}

//! Profile, password, preferences, export and account deletion.

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};

use crate::models::{NotificationPreferences, PasswordChange, ProfileUpdate, User};
use crate::state::SharedDb;
use crate::{caller, ApiResult, Failure};

pub async fn upload_avatar(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let user = caller(&*db.read().await, &headers)?;

    let mut avatar = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Failure::bad_request(&e.body_text()))?
    {
        if field.name() == Some("avatar") {
            let file_name = field.file_name().unwrap_or("avatar").to_string();
            let bytes = field.bytes().await.map_err(|e| Failure::bad_request(&e.body_text()))?;
            if bytes.is_empty() {
                return Err(Failure::bad_request("Avatar file is empty"));
            }
            avatar = Some(file_name);
        }
    }
    let file_name = avatar.ok_or_else(|| Failure::bad_request("No avatar file uploaded"))?;

    let url = format!("https://images.example.com/avatars/{}/{file_name}", user.id);
    if let Some(stored) = db.write().await.users.get_mut(&user.id) {
        stored.avatar_url = Some(url.clone());
    }
    Ok(Json(json!({ "avatarUrl": url })))
}

pub async fn update_profile(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<ProfileUpdate>,
) -> ApiResult<Json<User>> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    let stored = db
        .users
        .get_mut(&user.id)
        .ok_or_else(|| Failure::not_found("User"))?;
    if let Some(first_name) = input.first_name {
        stored.first_name = first_name;
    }
    if let Some(last_name) = input.last_name {
        stored.last_name = last_name;
    }
    if let Some(phone) = input.phone {
        stored.phone = Some(phone);
    }
    if let Some(bio) = input.bio {
        stored.bio = Some(bio);
    }
    Ok(Json(stored.clone()))
}

pub async fn change_password(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<PasswordChange>,
) -> ApiResult<Json<Value>> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    if db.passwords.get(&user.id) != Some(&input.current_password) {
        return Err(Failure::bad_request("Current password is incorrect"));
    }
    if input.new_password.len() < 8 {
        return Err(Failure::bad_request("Password must be at least 8 characters"));
    }
    db.passwords.insert(user.id, input.new_password);
    Ok(Json(json!({ "message": "Password updated" })))
}

pub async fn preferences(
    State(db): State<SharedDb>,
    headers: HeaderMap,
) -> ApiResult<Json<NotificationPreferences>> {
    let db = db.read().await;
    let user = caller(&db, &headers)?;
    Ok(Json(db.preferences.get(&user.id).cloned().unwrap_or_default()))
}

pub async fn update_preferences(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<NotificationPreferences>,
) -> ApiResult<Json<NotificationPreferences>> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    db.preferences.insert(user.id, input.clone());
    Ok(Json(input))
}

pub async fn delete_account(State(db): State<SharedDb>, headers: HeaderMap) -> ApiResult<StatusCode> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    db.remove_user(&user.id);
    tracing::info!(user = %user.id, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn data_export(State(db): State<SharedDb>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let db = db.read().await;
    let user = caller(&db, &headers)?;
    let purchases: Vec<_> = db.purchases.iter().filter(|p| p.student_id == user.id).collect();
    let ratings: Vec<_> = db.ratings.iter().filter(|r| r.student_id == user.id).collect();
    Ok(Json(json!({
        "user": user,
        "purchases": purchases,
        "ratings": ratings,
        "notifications": db.notifications.get(&user.id).cloned().unwrap_or_default(),
        "preferences": db.preferences.get(&user.id).cloned().unwrap_or_default(),
    })))
}

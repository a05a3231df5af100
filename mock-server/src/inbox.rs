//! Notifications, support tickets and chat.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::models::{
    ChatMessage, Conversation, NewConversation, NewMessage, NewSupportTicket, Notification, SupportTicket,
};
use crate::state::{new_id, Db, SharedDb};
use crate::{caller, ApiResult, Failure};

fn writes_enabled(db: &Db) -> ApiResult<()> {
    if db.faults.notification_writes {
        Err(Failure::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Notification service unavailable",
        ))
    } else {
        Ok(())
    }
}

pub async fn list_notifications(
    State(db): State<SharedDb>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Notification>>> {
    let db = db.read().await;
    let user = caller(&db, &headers)?;
    Ok(Json(db.notifications.get(&user.id).cloned().unwrap_or_default()))
}

pub async fn mark_read(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    writes_enabled(&db)?;
    let notification = db
        .notifications
        .get_mut(&user.id)
        .and_then(|inbox| inbox.iter_mut().find(|n| n.id == id))
        .ok_or_else(|| Failure::not_found("Notification"))?;
    notification.is_read = true;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_read(State(db): State<SharedDb>, headers: HeaderMap) -> ApiResult<StatusCode> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    writes_enabled(&db)?;
    if let Some(inbox) = db.notifications.get_mut(&user.id) {
        inbox.iter_mut().for_each(|n| n.is_read = true);
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unread_count(State(db): State<SharedDb>, headers: HeaderMap) -> ApiResult<Json<Value>> {
    let db = db.read().await;
    let user = caller(&db, &headers)?;
    let count = db
        .notifications
        .get(&user.id)
        .map(|inbox| inbox.iter().filter(|n| !n.is_read).count())
        .unwrap_or(0);
    Ok(Json(json!({ "count": count })))
}

pub async fn create_ticket(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<NewSupportTicket>,
) -> ApiResult<(StatusCode, Json<SupportTicket>)> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    if input.subject.trim().is_empty() || input.message.trim().is_empty() {
        return Err(Failure::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Subject and message are required",
        ));
    }
    let ticket = SupportTicket {
        id: new_id("t"),
        subject: input.subject,
        status: "open".to_string(),
        created_at: Utc::now(),
    };
    tracing::debug!(ticket = %ticket.id, category = ?input.category, "support ticket opened");
    db.tickets.push(ticket.clone());
    db.notify(
        &user.id,
        "system",
        "Support ticket received",
        &format!("We received \"{}\"", ticket.subject),
    );
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn conversations(
    State(db): State<SharedDb>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Conversation>>> {
    let db = db.read().await;
    let user = caller(&db, &headers)?;
    Ok(Json(
        db.conversations
            .iter()
            .filter(|c| c.participant_ids.contains(&user.id))
            .cloned()
            .collect(),
    ))
}

pub async fn start_conversation(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Json(input): Json<NewConversation>,
) -> ApiResult<(StatusCode, Json<Conversation>)> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    if !db.users.contains_key(&input.participant_id) {
        return Err(Failure::not_found("User"));
    }
    let conversation = Conversation {
        id: new_id("c"),
        participant_ids: vec![user.id, input.participant_id],
        lesson_id: input.lesson_id,
        last_message: None,
        updated_at: Utc::now(),
    };
    db.conversations.push(conversation.clone());
    Ok((StatusCode::CREATED, Json(conversation)))
}

fn joined_conversation<'a>(db: &'a mut Db, user_id: &str, id: &str) -> ApiResult<&'a mut Conversation> {
    let conversation = db
        .conversations
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| Failure::not_found("Conversation"))?;
    if !conversation.participant_ids.iter().any(|p| p == user_id) {
        return Err(Failure::forbidden("You are not part of this conversation"));
    }
    Ok(conversation)
}

pub async fn messages(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    joined_conversation(&mut db, &user.id, &id)?;
    Ok(Json(
        db.messages
            .iter()
            .filter(|m| m.conversation_id == id)
            .cloned()
            .collect(),
    ))
}

pub async fn send_message(
    State(db): State<SharedDb>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<NewMessage>,
) -> ApiResult<(StatusCode, Json<ChatMessage>)> {
    let mut db = db.write().await;
    let user = caller(&db, &headers)?;
    if input.content.trim().is_empty() {
        return Err(Failure::new(StatusCode::UNPROCESSABLE_ENTITY, "Message cannot be empty"));
    }
    let message = ChatMessage {
        id: new_id("m"),
        conversation_id: id.clone(),
        sender_id: user.id.clone(),
        content: input.content,
        created_at: Utc::now(),
    };
    let conversation = joined_conversation(&mut db, &user.id, &id)?;
    conversation.last_message = Some(message.clone());
    conversation.updated_at = message.created_at;
    let recipients: Vec<String> = conversation
        .participant_ids
        .iter()
        .filter(|p| **p != user.id)
        .cloned()
        .collect();

    db.messages.push(message.clone());
    for recipient in recipients {
        db.notify(&recipient, "message", "New message", &format!("{} sent you a message", user.full_name()));
    }
    Ok((StatusCode::CREATED, Json(message)))
}

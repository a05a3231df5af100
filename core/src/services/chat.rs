use crate::client::{ApiClient, Payload};
use crate::endpoints;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{ChatMessage, Conversation, NewConversation, NewMessage};

/// Student/teacher messaging.
pub struct Chat<'a> {
    api: &'a ApiClient,
}

impl<'a> Chat<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn conversations(&self) -> Result<Vec<Conversation>, ApiError> {
        self.api
            .request(HttpMethod::Get, endpoints::CHAT_CONVERSATIONS, Payload::Empty)?
            .require()
    }

    pub fn start_conversation(&self, conversation: &NewConversation) -> Result<Conversation, ApiError> {
        self.api
            .request(HttpMethod::Post, endpoints::CHAT_CONVERSATIONS, Payload::json(conversation)?)?
            .require()
    }

    pub fn messages(&self, conversation_id: &str) -> Result<Vec<ChatMessage>, ApiError> {
        self.api
            .request(
                HttpMethod::Get,
                &endpoints::conversation_messages(conversation_id),
                Payload::Empty,
            )?
            .require()
    }

    pub fn send_message(&self, conversation_id: &str, content: &str) -> Result<ChatMessage, ApiError> {
        if content.trim().is_empty() {
            return Err(ApiError::Validation("Message cannot be empty".to_string()));
        }
        let body = NewMessage {
            content: content.to_string(),
        };
        self.api
            .request(
                HttpMethod::Post,
                &endpoints::conversation_messages(conversation_id),
                Payload::json(&body)?,
            )?
            .require()
    }
}

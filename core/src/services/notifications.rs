use crate::client::{ApiClient, Payload};
use crate::endpoints;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{Notification, UnreadCount};

/// Notification inbox endpoints. See
/// [`NotificationPanel`](crate::NotificationPanel) for the optimistic
/// consumer built on top of them.
pub struct Notifications<'a> {
    api: &'a ApiClient,
}

impl<'a> Notifications<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn list(&self) -> Result<Vec<Notification>, ApiError> {
        self.api
            .request(HttpMethod::Get, endpoints::NOTIFICATIONS, Payload::Empty)?
            .require()
    }

    pub fn mark_as_read(&self, id: &str) -> Result<(), ApiError> {
        self.api
            .send(HttpMethod::Patch, &endpoints::notification_read(id), Payload::Empty)
    }

    pub fn mark_all_as_read(&self) -> Result<(), ApiError> {
        self.api
            .send(HttpMethod::Patch, endpoints::NOTIFICATIONS_READ_ALL, Payload::Empty)
    }

    pub fn unread_count(&self) -> Result<u32, ApiError> {
        let reply: UnreadCount = self
            .api
            .request(HttpMethod::Get, endpoints::NOTIFICATIONS_UNREAD_COUNT, Payload::Empty)?
            .require()?;
        Ok(reply.count)
    }
}

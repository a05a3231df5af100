//! Account settings: profile, avatar, password, notification preferences,
//! data export and account deletion.

use crate::client::{ApiClient, Payload};
use crate::endpoints;
use crate::error::ApiError;
use crate::http::{HttpMethod, MultipartForm};
use crate::types::{AvatarResult, FileAttachment, NotificationPreferences, PasswordChange, ProfileUpdate, User};

/// Text the user must type to confirm account deletion.
pub const DELETE_CONFIRMATION: &str = "DELETE";

pub struct Users<'a> {
    api: &'a ApiClient,
}

impl<'a> Users<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn upload_avatar(&self, avatar: &FileAttachment) -> Result<AvatarResult, ApiError> {
        let form = MultipartForm::new().file(
            "avatar",
            avatar.file_name.as_str(),
            avatar.content_type.as_str(),
            avatar.bytes.clone(),
        );
        self.api
            .request(HttpMethod::Post, endpoints::USERS_UPLOAD_AVATAR, Payload::Multipart(form))?
            .require()
    }

    pub fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.api
            .request(HttpMethod::Patch, endpoints::USERS_PROFILE, Payload::json(update)?)?
            .require()
    }

    pub fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError> {
        if change.new_password != change.confirm_password {
            return Err(ApiError::Validation("New passwords do not match".to_string()));
        }
        self.api
            .send(HttpMethod::Patch, endpoints::USERS_PASSWORD, Payload::json(change)?)
    }

    pub fn notification_preferences(&self) -> Result<NotificationPreferences, ApiError> {
        self.api
            .request(HttpMethod::Get, endpoints::USERS_NOTIFICATION_PREFERENCES, Payload::Empty)?
            .require()
    }

    pub fn update_notification_preferences(
        &self,
        preferences: &NotificationPreferences,
    ) -> Result<NotificationPreferences, ApiError> {
        self.api
            .request(
                HttpMethod::Put,
                endpoints::USERS_NOTIFICATION_PREFERENCES,
                Payload::json(preferences)?,
            )?
            .require()
    }

    /// Permanently delete the account and end the session.
    ///
    /// `confirmation` must equal [`DELETE_CONFIRMATION`]; anything else is
    /// rejected before a request is built.
    pub fn delete_account(&self, confirmation: &str) -> Result<(), ApiError> {
        if confirmation != DELETE_CONFIRMATION {
            return Err(ApiError::Validation(format!(
                "Type {DELETE_CONFIRMATION} to confirm account deletion"
            )));
        }
        self.api.send(HttpMethod::Delete, endpoints::USERS_ACCOUNT, Payload::Empty)?;
        log::info!("account deleted");
        self.api.session().clear()
    }

    pub fn data_export(&self) -> Result<serde_json::Value, ApiError> {
        self.api
            .request(HttpMethod::Get, endpoints::USERS_DATA_EXPORT, Payload::Empty)?
            .require()
    }
}

//! Authentication endpoints. Login and registration start a session; logout
//! ends it.

use crate::client::{ApiClient, Payload};
use crate::endpoints;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{Acknowledgement, AuthSession, Credentials, ForgotPassword, Registration, ResetPassword, User};

pub struct Auth<'a> {
    api: &'a ApiClient,
}

impl<'a> Auth<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        let session: AuthSession = self
            .api
            .request(HttpMethod::Post, endpoints::AUTH_LOGIN, Payload::json(credentials)?)?
            .require()?;
        self.api.session().set_token(&session.token)?;
        log::info!("signed in as {}", session.user.email);
        Ok(session)
    }

    pub fn register(&self, registration: &Registration) -> Result<AuthSession, ApiError> {
        let session: AuthSession = self
            .api
            .request(HttpMethod::Post, endpoints::AUTH_REGISTER, Payload::json(registration)?)?
            .require()?;
        self.api.session().set_token(&session.token)?;
        Ok(session)
    }

    pub fn forgot_password(&self, request: &ForgotPassword) -> Result<Option<Acknowledgement>, ApiError> {
        self.api
            .request(HttpMethod::Post, endpoints::AUTH_FORGOT_PASSWORD, Payload::json(request)?)
            .map(|reply| reply.into_option())
    }

    pub fn reset_password(&self, request: &ResetPassword) -> Result<Option<Acknowledgement>, ApiError> {
        self.api
            .request(HttpMethod::Post, endpoints::AUTH_RESET_PASSWORD, Payload::json(request)?)
            .map(|reply| reply.into_option())
    }

    pub fn profile(&self) -> Result<User, ApiError> {
        self.api
            .request(HttpMethod::Get, endpoints::AUTH_PROFILE, Payload::Empty)?
            .require()
    }

    /// Ends the session. The local token is dropped even when the backend
    /// call fails; the call's error is still returned.
    pub fn logout(&self) -> Result<(), ApiError> {
        let result = self.api.send(HttpMethod::Post, endpoints::AUTH_LOGOUT, Payload::Empty);
        self.api.session().clear()?;
        result
    }
}

use crate::client::{ApiClient, Payload};
use crate::endpoints;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{NewSupportTicket, SupportTicket};

pub struct Support<'a> {
    api: &'a ApiClient,
}

impl<'a> Support<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn create_ticket(&self, ticket: &NewSupportTicket) -> Result<SupportTicket, ApiError> {
        self.api
            .request(HttpMethod::Post, endpoints::SUPPORT_TICKETS, Payload::json(ticket)?)?
            .require()
    }
}

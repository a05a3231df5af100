use crate::client::{ApiClient, Payload};
use crate::endpoints;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{Checkout, CheckoutResult, Purchase};

/// Cart checkout and purchase history.
pub struct Purchases<'a> {
    api: &'a ApiClient,
}

impl<'a> Purchases<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn checkout(&self, checkout: &Checkout) -> Result<CheckoutResult, ApiError> {
        if checkout.lesson_ids.is_empty() {
            return Err(ApiError::Validation("Your cart is empty".to_string()));
        }
        self.api
            .request(HttpMethod::Post, endpoints::PURCHASES_CHECKOUT, Payload::json(checkout)?)?
            .require()
    }

    pub fn list(&self) -> Result<Vec<Purchase>, ApiError> {
        self.api
            .request(HttpMethod::Get, endpoints::PURCHASES, Payload::Empty)?
            .require()
    }
}

use crate::client::{ApiClient, Payload};
use crate::endpoints;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{BankTransferPayment, MobileMoneyPayment, PaymentInitiation};

/// Payment initiation. Settlement happens at the gateway, out of band.
pub struct Payments<'a> {
    api: &'a ApiClient,
}

impl<'a> Payments<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn initiate_mobile_money(&self, payment: &MobileMoneyPayment) -> Result<PaymentInitiation, ApiError> {
        self.api
            .request(HttpMethod::Post, endpoints::PAYMENTS_MOBILE_MONEY, Payload::json(payment)?)?
            .require()
    }

    pub fn initiate_bank_transfer(&self, payment: &BankTransferPayment) -> Result<PaymentInitiation, ApiError> {
        self.api
            .request(HttpMethod::Post, endpoints::PAYMENTS_BANK_TRANSFER, Payload::json(payment)?)?
            .require()
    }
}

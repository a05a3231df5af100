//! Typed API client for the tutoring marketplace backend.
//!
//! # Overview
//! Students browse and buy lessons, teachers publish them, and every user
//! manages notifications, payments and account settings through a REST
//! backend. This crate is the client side of that contract: a single request
//! core, one typed façade per backend resource, and an optimistic
//! notification inbox built on top.
//!
//! # Design
//! - `ApiClient` builds `HttpRequest` values and classifies `HttpResponse`
//!   values; a [`Transport`] performs the round-trip in between.
//! - The bearer token lives in an explicit [`Session`] owned by the client.
//! - Façades (`client.lessons()`, `client.users()`, ...) borrow the client
//!   and map each method onto one endpoint.
//! - [`NotificationPanel`] applies read markers before the backend confirms
//!   them and rolls back failed bulk updates via [`optimistic`].

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod notification_panel;
pub mod optimistic;
pub mod services;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{ApiClient, Payload, Reply};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, RequestBody};
pub use notification_panel::{Filter, NotificationPanel, PanelState, PendingAction};
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;

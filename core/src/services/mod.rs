//! Typed façades over the request core, one per backend resource.
//!
//! # Design
//! A façade borrows the [`ApiClient`] and maps each method onto exactly one
//! endpoint. Façades hold no state and do no orchestration; the only logic
//! they carry is input validation that must happen before a request exists
//! and the session hooks around login, logout and account deletion.

mod auth;
mod chat;
mod lessons;
mod notifications;
mod payments;
mod purchases;
mod ratings;
mod student;
mod support;
mod teacher;
mod users;

pub use auth::Auth;
pub use chat::Chat;
pub use lessons::Lessons;
pub use notifications::Notifications;
pub use payments::Payments;
pub use purchases::Purchases;
pub use ratings::{Ratings, MAX_SCORE, MIN_SCORE};
pub use student::Student;
pub use support::Support;
pub use teacher::Teacher;
pub use users::{Users, DELETE_CONFIRMATION};

use crate::client::ApiClient;

impl ApiClient {
    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    pub fn lessons(&self) -> Lessons<'_> {
        Lessons::new(self)
    }

    pub fn ratings(&self) -> Ratings<'_> {
        Ratings::new(self)
    }

    pub fn student(&self) -> Student<'_> {
        Student::new(self)
    }

    pub fn teacher(&self) -> Teacher<'_> {
        Teacher::new(self)
    }

    pub fn purchases(&self) -> Purchases<'_> {
        Purchases::new(self)
    }

    pub fn payments(&self) -> Payments<'_> {
        Payments::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn notifications(&self) -> Notifications<'_> {
        Notifications::new(self)
    }

    pub fn support(&self) -> Support<'_> {
        Support::new(self)
    }

    pub fn chat(&self) -> Chat<'_> {
        Chat::new(self)
    }
}

//! Backend endpoint paths, relative to the configured base URL.
//!
//! Ids are percent-encoded as single path segments, so an id can never
//! reach a different route.

use urlencoding::encode;

pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTH_REGISTER: &str = "/auth/register";
pub const AUTH_FORGOT_PASSWORD: &str = "/auth/forgot-password";
pub const AUTH_RESET_PASSWORD: &str = "/auth/reset-password";
pub const AUTH_PROFILE: &str = "/auth/profile";
pub const AUTH_LOGOUT: &str = "/auth/logout";

pub const LESSONS: &str = "/lessons";

pub const STUDENT_LESSONS: &str = "/student/lessons";
pub const STUDENT_PURCHASES: &str = "/student/purchases";

pub const TEACHER_LESSONS: &str = "/teacher/lessons";
pub const TEACHER_STATS: &str = "/teacher/stats";

pub const PURCHASES: &str = "/purchases";
pub const PURCHASES_CHECKOUT: &str = "/purchases/checkout";

pub const USERS_UPLOAD_AVATAR: &str = "/users/upload-avatar";
pub const USERS_PROFILE: &str = "/users/profile";
pub const USERS_PASSWORD: &str = "/users/password";
pub const USERS_NOTIFICATION_PREFERENCES: &str = "/users/notification-preferences";
pub const USERS_ACCOUNT: &str = "/users/account";
pub const USERS_DATA_EXPORT: &str = "/users/data-export";

pub const PAYMENTS_MOBILE_MONEY: &str = "/payments/initiate-mobile-money";
pub const PAYMENTS_BANK_TRANSFER: &str = "/payments/initiate-bank-transfer";

pub const NOTIFICATIONS: &str = "/notifications";
pub const NOTIFICATIONS_READ_ALL: &str = "/notifications/read-all";
pub const NOTIFICATIONS_UNREAD_COUNT: &str = "/notifications/unread-count";

pub const SUPPORT_TICKETS: &str = "/support/tickets";

pub const CHAT_CONVERSATIONS: &str = "/chat/conversations";

pub fn lesson(id: &str) -> String {
    format!("{LESSONS}/{}", encode(id))
}

pub fn lesson_ratings(id: &str) -> String {
    format!("{LESSONS}/{}/ratings", encode(id))
}

pub fn teacher_lesson_students(id: &str) -> String {
    format!("{TEACHER_LESSONS}/{}/students", encode(id))
}

pub fn notification_read(id: &str) -> String {
    format!("{NOTIFICATIONS}/{}/read", encode(id))
}

pub fn conversation_messages(id: &str) -> String {
    format!("{CHAT_CONVERSATIONS}/{}/messages", encode(id))
}

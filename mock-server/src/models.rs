use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

#[derive(Deserialize)]
pub struct ForgotPassword {
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub level: String,
    pub price: f64,
    pub duration_minutes: u32,
    pub teacher_id: String,
    pub teacher_name: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub average_rating: Option<f64>,
    pub rating_count: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLesson {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub level: String,
    pub price: f64,
    pub duration_minutes: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub level: Option<String>,
    pub price: Option<f64>,
    pub duration_minutes: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: String,
    pub lesson_id: String,
    pub student_id: String,
    pub student_name: Option<String>,
    pub score: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct NewRating {
    pub score: u8,
    pub comment: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    pub lesson_id: String,
    pub student_id: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub lesson_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    pub lesson_ids: Vec<String>,
    pub payment_method: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResult {
    pub purchases: Vec<Purchase>,
    pub total_amount: f64,
    pub currency: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub purchase_id: String,
    pub amount: f64,
    pub currency: String,
    pub phone_number: Option<String>,
    pub provider: Option<String>,
    pub account_number: Option<String>,
    pub bank_name: Option<String>,
}

#[derive(Serialize)]
pub struct PaymentInitiation {
    pub reference: String,
    pub status: String,
    pub instructions: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonStudent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherStats {
    pub total_lessons: u32,
    pub total_students: u32,
    pub total_revenue: f64,
    pub average_rating: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub lesson_updates: bool,
    pub purchase_updates: bool,
    pub marketing: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: true,
            lesson_updates: true,
            purchase_updates: true,
            marketing: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Deserialize)]
pub struct NewSupportTicket {
    pub subject: String,
    pub message: String,
    pub category: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    pub id: String,
    pub subject: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub participant_ids: Vec<String>,
    pub lesson_id: Option<String>,
    pub last_message: Option<ChatMessage>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConversation {
    pub participant_id: String,
    pub lesson_id: Option<String>,
}

#[derive(Deserialize)]
pub struct NewMessage {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_serializes_type_field() {
        let n = Notification {
            id: "n1".to_string(),
            kind: "purchase".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            created_at: "2024-03-01T10:00:00Z".parse().unwrap(),
            is_read: false,
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "purchase");
        assert_eq!(json["isRead"], false);
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn lesson_update_all_fields_optional() {
        let input: LessonUpdate = serde_json::from_str("{}").unwrap();
        assert!(input.title.is_none());
        assert!(input.price.is_none());
    }

    #[test]
    fn registration_requires_role() {
        let result: Result<Registration, _> = serde_json::from_str(
            r#"{"firstName":"A","lastName":"B","email":"a@b.c","password":"pw"}"#,
        );
        assert!(result.is_err());
    }
}

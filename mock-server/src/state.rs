use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    ChatMessage, Conversation, Lesson, Notification, NotificationPreferences, Purchase, Rating, SupportTicket, User,
};

pub const STUDENT_ID: &str = "u-student";
pub const STUDENT_EMAIL: &str = "ada@example.com";
pub const TEACHER_ID: &str = "u-teacher";
pub const TEACHER_EMAIL: &str = "grace@example.com";
/// Password of both seeded accounts.
pub const SEED_PASSWORD: &str = "password123";

pub type SharedDb = Arc<RwLock<Db>>;

/// Switches tests flip to make endpoints misbehave.
#[derive(Clone, Copy, Debug, Default)]
pub struct Faults {
    /// Mark-read endpoints answer 500.
    pub notification_writes: bool,
}

#[derive(Debug, Default)]
pub struct Db {
    pub users: HashMap<String, User>,
    pub passwords: HashMap<String, String>,
    pub tokens: HashMap<String, String>,
    pub lessons: Vec<Lesson>,
    pub ratings: Vec<Rating>,
    pub purchases: Vec<Purchase>,
    pub notifications: HashMap<String, Vec<Notification>>,
    pub preferences: HashMap<String, NotificationPreferences>,
    pub tickets: Vec<SupportTicket>,
    pub conversations: Vec<Conversation>,
    pub messages: Vec<ChatMessage>,
    pub faults: Faults,
}

pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

fn at(ts: &str) -> DateTime<Utc> {
    ts.parse().unwrap_or_else(|_| Utc::now())
}

impl Db {
    pub fn shared(self) -> SharedDb {
        Arc::new(RwLock::new(self))
    }

    /// One student, one teacher, two lessons, one purchase, three notifications.
    pub fn seeded() -> Self {
        let mut db = Db::default();

        db.insert_user(
            User {
                id: STUDENT_ID.to_string(),
                email: STUDENT_EMAIL.to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                role: "student".to_string(),
                avatar_url: None,
                phone: None,
                bio: None,
                created_at: at("2024-01-01T00:00:00Z"),
            },
            SEED_PASSWORD,
        );
        db.insert_user(
            User {
                id: TEACHER_ID.to_string(),
                email: TEACHER_EMAIL.to_string(),
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                role: "teacher".to_string(),
                avatar_url: None,
                phone: None,
                bio: Some("Mathematics and computing".to_string()),
                created_at: at("2024-01-01T00:00:00Z"),
            },
            SEED_PASSWORD,
        );

        for (id, title, subject, price) in [
            ("l1", "Algebra Basics", "math", 15.0),
            ("l2", "Intro to Chemistry", "chemistry", 20.0),
        ] {
            db.lessons.push(Lesson {
                id: id.to_string(),
                title: title.to_string(),
                description: format!("{title} in short video lessons"),
                subject: subject.to_string(),
                level: "beginner".to_string(),
                price,
                duration_minutes: 45,
                teacher_id: TEACHER_ID.to_string(),
                teacher_name: Some("Grace Hopper".to_string()),
                video_url: Some(format!("https://videos.example.com/{id}.mp4")),
                thumbnail_url: None,
                average_rating: None,
                rating_count: 0,
                created_at: at("2024-02-01T08:00:00Z"),
            });
        }

        db.purchases.push(Purchase {
            id: "p0".to_string(),
            lesson_id: "l2".to_string(),
            student_id: STUDENT_ID.to_string(),
            amount: 20.0,
            currency: "USD".to_string(),
            status: "completed".to_string(),
            created_at: at("2024-02-10T12:00:00Z"),
        });

        let inbox = [
            ("n1", "purchase", "Purchase confirmed", "Intro to Chemistry is in your library", false),
            ("n2", "system", "Welcome", "Thanks for joining", true),
            ("n3", "lesson", "New lesson", "Algebra Basics was just published", false),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (id, kind, title, description, is_read))| Notification {
            id: id.to_string(),
            kind: kind.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            created_at: at(&format!("2024-03-0{}T10:00:00Z", i + 1)),
            is_read,
        })
        .collect();
        db.notifications.insert(STUDENT_ID.to_string(), inbox);

        db
    }

    pub fn insert_user(&mut self, user: User, password: &str) {
        self.passwords.insert(user.id.clone(), password.to_string());
        self.notifications.entry(user.id.clone()).or_default();
        self.users.insert(user.id.clone(), user);
    }

    pub fn issue_token(&mut self, user_id: &str) -> String {
        let token = new_id("tok");
        self.tokens.insert(token.clone(), user_id.to_string());
        token
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email.eq_ignore_ascii_case(email))
    }

    pub fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    pub fn has_purchased(&self, student_id: &str, lesson_id: &str) -> bool {
        self.purchases
            .iter()
            .any(|p| p.student_id == student_id && p.lesson_id == lesson_id)
    }

    /// Drop the user and everything only they own.
    pub fn remove_user(&mut self, user_id: &str) {
        self.users.remove(user_id);
        self.passwords.remove(user_id);
        self.tokens.retain(|_, owner| owner != user_id);
        self.notifications.remove(user_id);
        self.preferences.remove(user_id);
    }

    pub fn notify(&mut self, user_id: &str, kind: &str, title: &str, description: &str) {
        self.notifications
            .entry(user_id.to_string())
            .or_default()
            .push(Notification {
                id: new_id("n"),
                kind: kind.to_string(),
                title: title.to_string(),
                description: description.to_string(),
                created_at: Utc::now(),
                is_read: false,
            });
    }

    /// Recompute a lesson's rating aggregate.
    pub fn refresh_rating(&mut self, lesson_id: &str) {
        let scores: Vec<f64> = self
            .ratings
            .iter()
            .filter(|r| r.lesson_id == lesson_id)
            .map(|r| f64::from(r.score))
            .collect();
        if let Some(lesson) = self.lessons.iter_mut().find(|l| l.id == lesson_id) {
            lesson.rating_count = scores.len() as u32;
            lesson.average_rating =
                (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_student_inbox() {
        let db = Db::seeded();
        let inbox = &db.notifications[STUDENT_ID];
        assert_eq!(inbox.len(), 3);
        assert_eq!(inbox.iter().filter(|n| !n.is_read).count(), 2);
        assert!(db.has_purchased(STUDENT_ID, "l2"));
    }

    #[test]
    fn removing_user_revokes_tokens() {
        let mut db = Db::seeded();
        let token = db.issue_token(STUDENT_ID);
        db.remove_user(STUDENT_ID);
        assert!(!db.tokens.contains_key(&token));
        assert!(db.user_by_email(STUDENT_EMAIL).is_none());
    }

    #[test]
    fn rating_aggregate_tracks_scores() {
        let mut db = Db::seeded();
        for score in [4, 5] {
            db.ratings.push(Rating {
                id: new_id("r"),
                lesson_id: "l1".to_string(),
                student_id: STUDENT_ID.to_string(),
                student_name: None,
                score,
                comment: None,
                created_at: Utc::now(),
            });
        }
        db.refresh_rating("l1");
        let lesson = db.lesson("l1").unwrap();
        assert_eq!(lesson.rating_count, 2);
        assert_eq!(lesson.average_rating, Some(4.5));
    }
}

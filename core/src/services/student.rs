use crate::client::{ApiClient, Payload};
use crate::endpoints;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{Lesson, Purchase, PurchaseRequest};

/// The signed-in student's library and purchases.
pub struct Student<'a> {
    api: &'a ApiClient,
}

impl<'a> Student<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Lessons the student has bought.
    pub fn lessons(&self) -> Result<Vec<Lesson>, ApiError> {
        self.api
            .request(HttpMethod::Get, endpoints::STUDENT_LESSONS, Payload::Empty)?
            .require()
    }

    pub fn purchases(&self) -> Result<Vec<Purchase>, ApiError> {
        self.api
            .request(HttpMethod::Get, endpoints::STUDENT_PURCHASES, Payload::Empty)?
            .require()
    }

    pub fn purchase(&self, lesson_id: &str) -> Result<Purchase, ApiError> {
        let body = PurchaseRequest {
            lesson_id: lesson_id.to_string(),
        };
        self.api
            .request(HttpMethod::Post, endpoints::STUDENT_PURCHASES, Payload::json(&body)?)?
            .require()
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{body_json, json_response, scripted_client};
    use crate::types::PurchaseStatus;

    #[test]
    fn purchase_posts_lesson_id() {
        let (client, transport) = scripted_client();
        transport.push(json_response(
            201,
            r#"{"id":"p1","lessonId":"l1","studentId":"s1","amount":15.0,"currency":"USD","status":"pending","createdAt":"2024-02-03T00:00:00Z"}"#,
        ));

        let purchase = client.student().purchase("l1").unwrap();
        assert_eq!(purchase.status, PurchaseStatus::Pending);

        let req = transport.last_request();
        assert_eq!(req.url, "http://localhost:3000/student/purchases");
        assert_eq!(body_json(&req), serde_json::json!({"lessonId": "l1"}));
    }

    #[test]
    fn library_lists_lessons() {
        let (client, transport) = scripted_client();
        transport.push(json_response(200, "[]"));
        assert!(client.student().lessons().unwrap().is_empty());
        assert_eq!(transport.last_request().url, "http://localhost:3000/student/lessons");
    }
}

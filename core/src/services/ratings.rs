use crate::client::{ApiClient, Payload};
use crate::endpoints;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{NewRating, Rating};

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// Student ratings attached to a lesson.
pub struct Ratings<'a> {
    api: &'a ApiClient,
}

impl<'a> Ratings<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn list(&self, lesson_id: &str) -> Result<Vec<Rating>, ApiError> {
        self.api
            .request(HttpMethod::Get, &endpoints::lesson_ratings(lesson_id), Payload::Empty)?
            .require()
    }

    pub fn create(&self, lesson_id: &str, rating: &NewRating) -> Result<Rating, ApiError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&rating.score) {
            return Err(ApiError::Validation(format!(
                "Rating must be between {MIN_SCORE} and {MAX_SCORE} stars"
            )));
        }
        self.api
            .request(HttpMethod::Post, &endpoints::lesson_ratings(lesson_id), Payload::json(rating)?)?
            .require()
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{body_json, json_response, scripted_client};
    use crate::types::NewRating;
    use crate::ApiError;

    #[test]
    fn create_posts_rating() {
        let (client, transport) = scripted_client();
        transport.push(json_response(
            201,
            r#"{"id":"r1","lessonId":"l1","studentId":"s1","score":4,"comment":"Clear","createdAt":"2024-02-02T00:00:00Z"}"#,
        ));

        let rating = client
            .ratings()
            .create(
                "l1",
                &NewRating {
                    score: 4,
                    comment: Some("Clear".to_string()),
                },
            )
            .unwrap();
        assert_eq!(rating.score, 4);

        let req = transport.last_request();
        assert_eq!(req.url, "http://localhost:3000/lessons/l1/ratings");
        assert_eq!(body_json(&req)["score"], 4);
    }

    #[test]
    fn out_of_range_score_never_hits_network() {
        let (client, transport) = scripted_client();
        let err = client
            .ratings()
            .create("l1", &NewRating { score: 0, comment: None })
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn list_returns_ratings() {
        let (client, transport) = scripted_client();
        transport.push(json_response(200, "[]"));
        assert!(client.ratings().list("l1").unwrap().is_empty());
    }
}

use crate::client::{ApiClient, Payload};
use crate::endpoints;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{Lesson, LessonUpdate, LessonUpload};

/// Public lesson catalogue and lesson management.
pub struct Lessons<'a> {
    api: &'a ApiClient,
}

impl<'a> Lessons<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn list(&self) -> Result<Vec<Lesson>, ApiError> {
        self.api
            .request(HttpMethod::Get, endpoints::LESSONS, Payload::Empty)?
            .require()
    }

    pub fn get(&self, id: &str) -> Result<Lesson, ApiError> {
        self.api
            .request(HttpMethod::Get, &endpoints::lesson(id), Payload::Empty)?
            .require()
    }

    /// Upload a new lesson with its video as a multipart form.
    pub fn create(&self, upload: &LessonUpload) -> Result<Lesson, ApiError> {
        self.api
            .request(HttpMethod::Post, endpoints::LESSONS, Payload::Multipart(upload.to_form()))?
            .require()
    }

    pub fn update(&self, id: &str, update: &LessonUpdate) -> Result<Lesson, ApiError> {
        self.api
            .request(HttpMethod::Put, &endpoints::lesson(id), Payload::json(update)?)?
            .require()
    }

    pub fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api.send(HttpMethod::Delete, &endpoints::lesson(id), Payload::Empty)
    }
}

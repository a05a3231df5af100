use crate::client::{ApiClient, Payload};
use crate::endpoints;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::types::{Lesson, LessonStudent, NewLesson, TeacherStats};

/// Teacher dashboard: own lessons, enrolled students, earnings.
pub struct Teacher<'a> {
    api: &'a ApiClient,
}

impl<'a> Teacher<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn lessons(&self) -> Result<Vec<Lesson>, ApiError> {
        self.api
            .request(HttpMethod::Get, endpoints::TEACHER_LESSONS, Payload::Empty)?
            .require()
    }

    pub fn create_lesson(&self, lesson: &NewLesson) -> Result<Lesson, ApiError> {
        self.api
            .request(HttpMethod::Post, endpoints::TEACHER_LESSONS, Payload::json(lesson)?)?
            .require()
    }

    pub fn lesson_students(&self, lesson_id: &str) -> Result<Vec<LessonStudent>, ApiError> {
        self.api
            .request(
                HttpMethod::Get,
                &endpoints::teacher_lesson_students(lesson_id),
                Payload::Empty,
            )?
            .require()
    }

    pub fn stats(&self) -> Result<TeacherStats, ApiError> {
        self.api
            .request(HttpMethod::Get, endpoints::TEACHER_STATS, Payload::Empty)?
            .require()
    }
}

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::Course,
    repositories::paginate,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, course: Course) -> AppResult<Course>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>>;
    async fn list(&self, offset: i64, limit: i64) -> AppResult<(Vec<Course>, i64)>;
    async fn list_for_instructor(&self, instructor_id: &str) -> AppResult<Vec<Course>>;
    async fn list_for_student(&self, student_id: &str) -> AppResult<Vec<Course>>;
    async fn update(&self, course: Course) -> AppResult<Course>;
}

#[derive(Default)]
pub struct InMemoryCourseRepository {
    courses: Arc<RwLock<HashMap<String, Course>>>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered(&self, keep: impl Fn(&Course) -> bool) -> Vec<Course> {
        let courses = self.courses.read().await;
        let mut items: Vec<_> = courses.values().filter(|c| keep(*c)).cloned().collect();
        items.sort_by(|a, b| a.code.cmp(&b.code));
        items
    }
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn create(&self, course: Course) -> AppResult<Course> {
        let mut courses = self.courses.write().await;
        if courses
            .values()
            .any(|c| c.code == course.code && c.academic_year_id == course.academic_year_id)
        {
            return Err(AppError::AlreadyExists(format!(
                "Course '{}' already exists in this academic year",
                course.code
            )));
        }

        courses.insert(course.id.clone(), course.clone());
        Ok(course)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.get(id).cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> AppResult<(Vec<Course>, i64)> {
        let items = self.filtered(|_| true).await;
        Ok(paginate(items, offset, limit))
    }

    async fn list_for_instructor(&self, instructor_id: &str) -> AppResult<Vec<Course>> {
        Ok(self.filtered(|c| c.is_instructor(instructor_id)).await)
    }

    async fn list_for_student(&self, student_id: &str) -> AppResult<Vec<Course>> {
        Ok(self.filtered(|c| c.is_enrolled(student_id)).await)
    }

    async fn update(&self, course: Course) -> AppResult<Course> {
        let mut courses = self.courses.write().await;
        if !courses.contains_key(&course.id) {
            return Err(AppError::NotFound(format!(
                "Course with id '{}' not found",
                course.id
            )));
        }

        courses.insert(course.id.clone(), course.clone());
        Ok(course)
    }
}

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::quiz_submission::{QuizSubmission, SubmissionStatus},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizSubmissionRepository: Send + Sync {
    async fn create(&self, submission: QuizSubmission) -> AppResult<QuizSubmission>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizSubmission>>;
    async fn find_in_progress(
        &self,
        student_id: &str,
        quiz_id: &str,
    ) -> AppResult<Option<QuizSubmission>>;
    /// Every attempt of one student at one quiz, oldest first.
    async fn list_by_student_and_quiz(
        &self,
        student_id: &str,
        quiz_id: &str,
    ) -> AppResult<Vec<QuizSubmission>>;
    async fn list_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizSubmission>>;
    async fn count_attempts(&self, student_id: &str, quiz_id: &str) -> AppResult<usize>;
    async fn update(&self, submission: QuizSubmission) -> AppResult<QuizSubmission>;
}

#[derive(Default)]
pub struct InMemoryQuizSubmissionRepository {
    submissions: Arc<RwLock<HashMap<String, QuizSubmission>>>,
}

impl InMemoryQuizSubmissionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizSubmissionRepository for InMemoryQuizSubmissionRepository {
    async fn create(&self, submission: QuizSubmission) -> AppResult<QuizSubmission> {
        let mut submissions = self.submissions.write().await;
        if submissions.contains_key(&submission.id) {
            return Err(AppError::AlreadyExists(format!(
                "Submission with id '{}' already exists",
                submission.id
            )));
        }
        // one open attempt per student and quiz
        if submission.status == SubmissionStatus::InProgress
            && submissions.values().any(|s| {
                s.student_id == submission.student_id
                    && s.quiz_id == submission.quiz_id
                    && s.status == SubmissionStatus::InProgress
            })
        {
            return Err(AppError::AlreadyExists(format!(
                "Student '{}' already has an attempt in progress for quiz '{}'",
                submission.student_id, submission.quiz_id
            )));
        }

        submissions.insert(submission.id.clone(), submission.clone());
        Ok(submission)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizSubmission>> {
        let submissions = self.submissions.read().await;
        Ok(submissions.get(id).cloned())
    }

    async fn find_in_progress(
        &self,
        student_id: &str,
        quiz_id: &str,
    ) -> AppResult<Option<QuizSubmission>> {
        let submissions = self.submissions.read().await;
        Ok(submissions
            .values()
            .find(|s| {
                s.student_id == student_id
                    && s.quiz_id == quiz_id
                    && s.status == SubmissionStatus::InProgress
            })
            .cloned())
    }

    async fn list_by_student_and_quiz(
        &self,
        student_id: &str,
        quiz_id: &str,
    ) -> AppResult<Vec<QuizSubmission>> {
        let submissions = self.submissions.read().await;
        let mut items: Vec<_> = submissions
            .values()
            .filter(|s| s.student_id == student_id && s.quiz_id == quiz_id)
            .cloned()
            .collect();
        items.sort_by_key(|s| s.attempt_number);
        Ok(items)
    }

    async fn list_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizSubmission>> {
        let submissions = self.submissions.read().await;
        let mut items: Vec<_> = submissions
            .values()
            .filter(|s| s.quiz_id == quiz_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.student_id
                .cmp(&b.student_id)
                .then(a.attempt_number.cmp(&b.attempt_number))
        });
        Ok(items)
    }

    async fn count_attempts(&self, student_id: &str, quiz_id: &str) -> AppResult<usize> {
        let submissions = self.submissions.read().await;
        Ok(submissions
            .values()
            .filter(|s| s.student_id == student_id && s.quiz_id == quiz_id)
            .count())
    }

    async fn update(&self, submission: QuizSubmission) -> AppResult<QuizSubmission> {
        let mut submissions = self.submissions.write().await;
        if !submissions.contains_key(&submission.id) {
            return Err(AppError::NotFound(format!(
                "Submission with id '{}' not found",
                submission.id
            )));
        }

        submissions.insert(submission.id.clone(), submission.clone());
        Ok(submission)
    }
}

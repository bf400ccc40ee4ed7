use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::grading::round2;
use crate::models::domain::quiz_question::QuizQuestion;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Quiz {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_by: String,
    pub status: QuizStatus,
    pub questions: Vec<QuizQuestion>,
    pub passing_score: f64, // on the grading scale, 10 of 20 by default
    pub max_attempts: Option<i32>,
    pub time_limit_minutes: Option<i32>,
    pub available_from: Option<DateTime<Utc>>,
    pub available_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
pub enum QuizStatus {
    Draft,
    Published,
    Closed,
}

impl Quiz {
    pub fn new_draft(course_id: &str, title: &str, created_by: &str) -> Self {
        Quiz {
            id: Uuid::new_v4().to_string(),
            course_id: course_id.to_string(),
            title: title.to_string(),
            description: None,
            created_by: created_by.to_string(),
            status: QuizStatus::Draft,
            questions: Vec::new(),
            passing_score: 10.0,
            max_attempts: None,
            time_limit_minutes: None,
            available_from: None,
            available_until: None,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }

    pub fn question(&self, question_id: &str) -> Option<&QuizQuestion> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn total_points(&self) -> f64 {
        round2(self.questions.iter().map(|q| q.points).sum())
    }

    pub fn next_question_order(&self) -> i16 {
        self.questions.iter().map(|q| q.order).max().unwrap_or(0) + 1
    }

    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        self.status == QuizStatus::Published
            && self.available_from.map_or(true, |from| now >= from)
            && self.available_until.map_or(true, |until| now <= until)
    }

    /// Point in time after which a submission started at `started_at`
    /// no longer accepts answers.
    pub fn deadline_for(&self, started_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.time_limit_minutes
            .map(|minutes| started_at + Duration::minutes(i64::from(minutes)))
    }

    pub fn ensure_draft(&self) -> AppResult<()> {
        if self.status != QuizStatus::Draft {
            return Err(AppError::InvalidState(format!(
                "Quiz '{}' is {:?}; only drafts can be edited",
                self.id, self.status
            )));
        }
        Ok(())
    }

    pub fn add_question(&mut self, question: QuizQuestion) -> AppResult<()> {
        self.ensure_draft()?;
        if self.question(&question.id).is_some() {
            return Err(AppError::AlreadyExists(format!(
                "Question with id '{}' already exists",
                question.id
            )));
        }
        self.questions.push(question);
        self.questions.sort_by_key(|q| q.order);
        self.modified_at = Some(Utc::now());
        Ok(())
    }

    pub fn remove_question(&mut self, question_id: &str) -> AppResult<QuizQuestion> {
        self.ensure_draft()?;
        let index = self
            .questions
            .iter()
            .position(|q| q.id == question_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Question with id '{}' not found", question_id))
            })?;
        self.modified_at = Some(Utc::now());
        Ok(self.questions.remove(index))
    }

    pub fn publish(&mut self) -> AppResult<()> {
        self.ensure_draft()?;
        if self.questions.is_empty() {
            return Err(AppError::ValidationError(format!(
                "Quiz '{}' cannot be published without questions",
                self.id
            )));
        }
        for question in &self.questions {
            question.validate_gradable()?;
        }
        if let (Some(from), Some(until)) = (self.available_from, self.available_until) {
            if from >= until {
                return Err(AppError::ValidationError(
                    "available_from must be before available_until".to_string(),
                ));
            }
        }

        self.status = QuizStatus::Published;
        self.modified_at = Some(Utc::now());
        Ok(())
    }

    pub fn close(&mut self) -> AppResult<()> {
        if self.status != QuizStatus::Published {
            return Err(AppError::InvalidState(format!(
                "Quiz '{}' is {:?}; only published quizzes can be closed",
                self.id, self.status
            )));
        }
        self.status = QuizStatus::Closed;
        self.modified_at = Some(Utc::now());
        Ok(())
    }
}

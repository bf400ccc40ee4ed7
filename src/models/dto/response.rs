use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::answer::AnswerGrade;
use crate::models::domain::quiz_submission::{QuizSubmission, SubmissionStatus};
use crate::models::domain::{User, UserRole};

#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            full_name: user.full_name(),
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionResultDto {
    pub question_id: String,
    pub points_earned: f64,
    pub points_possible: f64,
    pub is_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    pub manually_graded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResultDto {
    pub submission_id: String,
    pub quiz_id: String,
    pub student_id: String,
    pub attempt_number: i32,
    pub status: SubmissionStatus,
    pub total_points_earned: f64,
    pub total_points_possible: f64,
    pub score: f64,
    pub percentage: f64,
    pub passed: bool,
    pub questions: Vec<QuestionResultDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graded_at: Option<DateTime<Utc>>,
}

impl From<&QuizSubmission> for SubmissionResultDto {
    fn from(submission: &QuizSubmission) -> Self {
        let questions = submission
            .responses
            .iter()
            .filter_map(|response| {
                response.grade.as_ref().map(|grade: &AnswerGrade| QuestionResultDto {
                    question_id: response.question_id.clone(),
                    points_earned: grade.points_earned,
                    points_possible: grade.points_possible,
                    is_correct: grade.is_correct,
                    similarity_score: grade.similarity_score,
                    manually_graded: response.manually_graded,
                })
            })
            .collect();

        SubmissionResultDto {
            submission_id: submission.id.clone(),
            quiz_id: submission.quiz_id.clone(),
            student_id: submission.student_id.clone(),
            attempt_number: submission.attempt_number,
            status: submission.status,
            total_points_earned: submission.total_points_earned,
            total_points_possible: submission.total_points_possible,
            score: submission.score,
            percentage: submission.percentage,
            passed: submission.passed,
            questions,
            submitted_at: submission.submitted_at,
            graded_at: submission.graded_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizStatisticsDto {
    pub quiz_id: String,
    pub graded_submissions: usize,
    pub average_score: f64,
    pub highest_score: f64,
    pub lowest_score: f64,
    pub pass_rate: f64, // percentage of graded submissions that passed
}

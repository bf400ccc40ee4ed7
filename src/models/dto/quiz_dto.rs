use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::quiz::{Quiz, QuizStatus};
use crate::models::domain::quiz_question::{QuestionKind, QuizQuestion};

/// Quiz as shown to students: correct options and expected answers are
/// stripped.
#[derive(Debug, Clone, Serialize)]
pub struct QuizForStudentDto {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: QuizStatus,
    pub total_points: f64,
    pub max_attempts: Option<i32>,
    pub time_limit_minutes: Option<i32>,
    pub available_from: Option<DateTime<Utc>>,
    pub available_until: Option<DateTime<Utc>>,
    pub questions: Vec<QuestionForStudentDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionForStudentDto {
    pub id: String,
    pub order: i16,
    pub prompt: String,
    pub points: f64,
    #[serde(flatten)]
    pub kind: QuestionKindForStudentDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKindForStudentDto {
    MultipleChoice {
        options: Vec<OptionForStudentDto>,
        allow_multiple: bool,
    },
    ShortAnswer,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionForStudentDto {
    pub id: String,
    pub text: String,
}

impl From<&QuizQuestion> for QuestionForStudentDto {
    fn from(question: &QuizQuestion) -> Self {
        let kind = match &question.kind {
            QuestionKind::MultipleChoice {
                options,
                allow_multiple,
            } => QuestionKindForStudentDto::MultipleChoice {
                options: options
                    .iter()
                    .map(|o| OptionForStudentDto {
                        id: o.id.clone(),
                        text: o.text.clone(),
                    })
                    .collect(),
                allow_multiple: *allow_multiple,
            },
            QuestionKind::ShortAnswer { .. } => QuestionKindForStudentDto::ShortAnswer,
        };

        QuestionForStudentDto {
            id: question.id.clone(),
            order: question.order,
            prompt: question.prompt.clone(),
            points: question.points,
            kind,
        }
    }
}

impl From<&Quiz> for QuizForStudentDto {
    fn from(quiz: &Quiz) -> Self {
        QuizForStudentDto {
            id: quiz.id.clone(),
            course_id: quiz.course_id.clone(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            status: quiz.status,
            total_points: quiz.total_points(),
            max_attempts: quiz.max_attempts,
            time_limit_minutes: quiz.time_limit_minutes,
            available_from: quiz.available_from,
            available_until: quiz.available_until,
            questions: quiz.questions.iter().map(QuestionForStudentDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizSummaryDto {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub status: QuizStatus,
    pub question_count: usize,
    pub total_points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl From<&Quiz> for QuizSummaryDto {
    fn from(quiz: &Quiz) -> Self {
        QuizSummaryDto {
            id: quiz.id.clone(),
            course_id: quiz.course_id.clone(),
            title: quiz.title.clone(),
            status: quiz.status,
            question_count: quiz.questions.len(),
            total_points: quiz.total_points(),
            modified_at: quiz.modified_at,
        }
    }
}

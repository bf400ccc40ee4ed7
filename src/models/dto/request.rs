use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::domain::quiz_question::{QuestionKind, QuestionOption};
use crate::models::domain::quiz_submission::SubmittedAnswer;
use crate::models::domain::user::UserRole;

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.]+$").expect("USERNAME_REGEX is a valid regex pattern")
});

static ACADEMIC_YEAR_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{4}$").expect("ACADEMIC_YEAR_LABEL_REGEX is a valid regex pattern")
});

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    #[validate(
        length(min = 3, max = 50),
        regex(
            path = *USERNAME_REGEX,
            message = "Username must be alphanumeric with dots or underscores"
        )
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub role: UserRole,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAcademicYearRequest {
    #[validate(regex(
        path = *ACADEMIC_YEAR_LABEL_REGEX,
        message = "Label must look like 2025-2026"
    ))]
    pub label: String,

    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 2, max = 20))]
    pub code: String,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub academic_year_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuizRequest {
    pub course_id: String,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(range(min = 0.0))]
    pub passing_score: Option<f64>,

    #[validate(range(min = 1, max = 100))]
    pub max_attempts: Option<i32>,

    #[validate(range(min = 1, max = 600))]
    pub time_limit_minutes: Option<i32>,

    pub available_from: Option<DateTime<Utc>>,
    pub available_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub prompt: String,

    #[validate(range(min = 0.01, max = 1000.0))]
    pub points: f64,

    pub order: Option<i16>,

    #[validate(custom(function = "validate_question_kind"))]
    pub kind: QuestionKindInput,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKindInput {
    MultipleChoice {
        options: Vec<QuestionOptionInput>,
        #[serde(default)]
        allow_multiple: bool,
    },
    ShortAnswer {
        expected_answer: String,
        #[serde(default)]
        accepted_answers: Vec<String>,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuestionOptionInput {
    pub text: String,
    pub is_correct: bool,
}

fn validate_question_kind(kind: &QuestionKindInput) -> Result<(), ValidationError> {
    match kind {
        QuestionKindInput::MultipleChoice { options, .. } => {
            if options.len() > 20 {
                return Err(ValidationError::new("too_many_options"));
            }
            if options.iter().any(|o| o.text.trim().is_empty()) {
                return Err(ValidationError::new("blank_option"));
            }
        }
        QuestionKindInput::ShortAnswer {
            expected_answer,
            accepted_answers,
        } => {
            if expected_answer.trim().is_empty() {
                return Err(ValidationError::new("blank_expected_answer"));
            }
            if accepted_answers.iter().any(|a| a.trim().is_empty()) {
                return Err(ValidationError::new("blank_accepted_answer"));
            }
        }
    }
    Ok(())
}

impl From<QuestionKindInput> for QuestionKind {
    fn from(input: QuestionKindInput) -> Self {
        match input {
            QuestionKindInput::MultipleChoice {
                options,
                allow_multiple,
            } => QuestionKind::MultipleChoice {
                options: options
                    .into_iter()
                    .map(|o| QuestionOption::new(o.text.trim(), o.is_correct))
                    .collect(),
                allow_multiple,
            },
            QuestionKindInput::ShortAnswer {
                expected_answer,
                accepted_answers,
            } => QuestionKind::ShortAnswer {
                expected_answer: expected_answer.trim().to_string(),
                accepted_answers: accepted_answers
                    .into_iter()
                    .map(|a| a.trim().to_string())
                    .collect(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveAnswerRequest {
    #[validate(length(min = 1))]
    pub question_id: String,
    pub answer: SubmittedAnswer,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OverridePointsRequest {
    #[validate(length(min = 1))]
    pub question_id: String,

    #[validate(range(min = 0.0))]
    pub points: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: None,
            limit: None,
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Falls back to `default_limit` and never exceeds `max_limit`.
    pub fn limit_within(&self, default_limit: i64, max_limit: i64) -> i64 {
        self.limit.unwrap_or(default_limit).clamp(1, max_limit.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn user_request(username: &str, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            username: username.to_string(),
            email: email.to_string(),
            role: UserRole::Student,
        }
    }

    #[test]
    fn test_valid_create_user_request() {
        assert!(user_request("johndoe", "john@example.com").validate().is_ok());
    }

    #[test]
    fn test_invalid_email() {
        assert!(user_request("johndoe", "invalid-email").validate().is_err());
    }

    #[test]
    fn test_username_too_short_or_with_spaces() {
        assert!(user_request("ab", "john@example.com").validate().is_err());
        assert!(user_request("john doe", "john@example.com").validate().is_err());
    }

    #[test]
    fn test_academic_year_label_format() {
        let date = |y| NaiveDate::from_ymd_opt(y, 9, 1).expect("valid date");
        let ok = CreateAcademicYearRequest {
            label: "2025-2026".to_string(),
            starts_on: date(2025),
            ends_on: date(2026),
        };
        let bad = CreateAcademicYearRequest {
            label: "next year".to_string(),
            ..ok.clone()
        };

        assert!(ok.validate().is_ok());
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_add_question_request_from_json() {
        let json = r#"{
            "prompt": "Pick the primes",
            "points": 2.5,
            "kind": {
                "type": "multiple_choice",
                "allow_multiple": true,
                "options": [
                    {"text": "2", "is_correct": true},
                    {"text": "4", "is_correct": false}
                ]
            }
        }"#;
        let request: AddQuestionRequest = serde_json::from_str(json).expect("request parses");

        assert!(request.validate().is_ok());
        let kind: QuestionKind = request.kind.into();
        match kind {
            QuestionKind::MultipleChoice {
                options,
                allow_multiple,
            } => {
                assert!(allow_multiple);
                assert_eq!(options.len(), 2);
                assert_ne!(options[0].id, options[1].id);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_blank_option_is_reported_on_kind() {
        let request = AddQuestionRequest {
            prompt: "Pick the primes".to_string(),
            points: 1.0,
            order: None,
            kind: QuestionKindInput::MultipleChoice {
                options: vec![QuestionOptionInput {
                    text: " ".to_string(),
                    is_correct: true,
                }],
                allow_multiple: false,
            },
        };
        let errors = request.validate().expect_err("blank option rejected");
        assert!(errors.field_errors().contains_key("kind"));

        let json = serde_json::to_value(&request.kind).expect("kind serializes");
        assert_eq!(json["type"], "multiple_choice");
        assert_eq!(json["options"][0]["is_correct"], true);
    }

    #[test]
    fn test_add_question_rejects_blank_expected_answer_and_zero_points() {
        let request = AddQuestionRequest {
            prompt: "Capital of Peru?".to_string(),
            points: 1.0,
            order: None,
            kind: QuestionKindInput::ShortAnswer {
                expected_answer: "  ".to_string(),
                accepted_answers: vec![],
            },
        };
        assert!(request.validate().is_err());

        let request = AddQuestionRequest {
            points: 0.0,
            kind: QuestionKindInput::ShortAnswer {
                expected_answer: "Lima".to_string(),
                accepted_answers: vec![],
            },
            ..request
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_pagination_defaults_and_clamping() {
        let params = PaginationParams::default();
        assert_eq!(params.offset(), 0);
        assert_eq!(params.limit_within(20, 100), 20);
        assert_eq!(params.limit_within(10, 50), 10);

        let params = PaginationParams {
            offset: Some(-5),
            limit: Some(1000),
        };
        assert_eq!(params.offset(), 0);
        assert_eq!(params.limit_within(20, 100), 100);
        assert!(params.validate().is_err());

        let params = PaginationParams {
            offset: None,
            limit: Some(80),
        };
        assert_eq!(params.limit_within(10, 50), 50);
    }

    #[test]
    fn test_large_limit_is_clamped_not_rejected() {
        let params = PaginationParams {
            offset: Some(0),
            limit: Some(200),
        };
        assert!(params.validate().is_ok());
        assert_eq!(params.limit_within(20, 500), 200);
        assert_eq!(params.limit_within(20, 100), 100);

        let params = PaginationParams {
            offset: Some(0),
            limit: Some(0),
        };
        assert!(params.validate().is_err());
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizQuestion {
    pub id: String,
    pub order: i16,
    pub prompt: String,
    pub points: f64,
    pub kind: QuestionKind,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<QuestionOption>,
        allow_multiple: bool, // multiple-select when true
    },
    ShortAnswer {
        expected_answer: String,
        #[serde(default)]
        accepted_answers: Vec<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

impl QuestionOption {
    pub fn new(text: &str, is_correct: bool) -> Self {
        QuestionOption {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            is_correct,
        }
    }
}

impl QuizQuestion {
    pub fn multiple_choice(
        order: i16,
        prompt: &str,
        points: f64,
        options: Vec<QuestionOption>,
        allow_multiple: bool,
    ) -> Self {
        QuizQuestion {
            id: Uuid::new_v4().to_string(),
            order,
            prompt: prompt.to_string(),
            points,
            kind: QuestionKind::MultipleChoice {
                options,
                allow_multiple,
            },
        }
    }

    pub fn short_answer(
        order: i16,
        prompt: &str,
        points: f64,
        expected_answer: &str,
        accepted_answers: Vec<String>,
    ) -> Self {
        QuizQuestion {
            id: Uuid::new_v4().to_string(),
            order,
            prompt: prompt.to_string(),
            points,
            kind: QuestionKind::ShortAnswer {
                expected_answer: expected_answer.to_string(),
                accepted_answers,
            },
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            QuestionKind::MultipleChoice { .. } => "multiple_choice",
            QuestionKind::ShortAnswer { .. } => "short_answer",
        }
    }

    /// Ids of the correct options; empty for short-answer questions.
    pub fn correct_option_ids(&self) -> Vec<&str> {
        match &self.kind {
            QuestionKind::MultipleChoice { options, .. } => options
                .iter()
                .filter(|o| o.is_correct)
                .map(|o| o.id.as_str())
                .collect(),
            QuestionKind::ShortAnswer { .. } => Vec::new(),
        }
    }

    /// Checks the question is gradable. Run before a quiz is published.
    pub fn validate_gradable(&self) -> AppResult<()> {
        if !self.points.is_finite() || self.points <= 0.0 {
            return Err(AppError::ValidationError(format!(
                "Question '{}' must be worth a positive number of points",
                self.id
            )));
        }

        match &self.kind {
            QuestionKind::MultipleChoice {
                options,
                allow_multiple,
            } => {
                if options.len() < 2 {
                    return Err(AppError::ValidationError(format!(
                        "Question '{}' needs at least two options",
                        self.id
                    )));
                }
                let correct = options.iter().filter(|o| o.is_correct).count();
                if correct == 0 {
                    return Err(AppError::ValidationError(format!(
                        "Question '{}' has no correct option",
                        self.id
                    )));
                }
                if !allow_multiple && correct != 1 {
                    return Err(AppError::ValidationError(format!(
                        "Single-select question '{}' must have exactly one correct option",
                        self.id
                    )));
                }
            }
            QuestionKind::ShortAnswer {
                expected_answer, ..
            } => {
                if expected_answer.trim().is_empty() {
                    return Err(AppError::ValidationError(format!(
                        "Question '{}' has an empty expected answer",
                        self.id
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(correct: &[bool]) -> Vec<QuestionOption> {
        correct
            .iter()
            .enumerate()
            .map(|(i, c)| QuestionOption::new(&format!("Option {}", i), *c))
            .collect()
    }

    #[test]
    fn question_kind_is_tagged_in_json() {
        let question = QuizQuestion::short_answer(1, "Capital of France?", 2.0, "Paris", vec![]);
        let json = serde_json::to_value(&question).expect("question should serialize");

        assert_eq!(json["kind"]["type"], "short_answer");
        assert_eq!(json["kind"]["expected_answer"], "Paris");
    }

    #[test]
    fn accepted_answers_default_to_empty() {
        let json = r#"{"type":"short_answer","expected_answer":"Paris"}"#;
        let kind: QuestionKind = serde_json::from_str(json).expect("kind should deserialize");

        assert_eq!(
            kind,
            QuestionKind::ShortAnswer {
                expected_answer: "Paris".to_string(),
                accepted_answers: vec![],
            }
        );
    }

    #[test]
    fn rejects_unknown_kind() {
        let parsed = serde_json::from_str::<QuestionKind>(r#"{"type":"essay"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn single_select_requires_exactly_one_correct_option() {
        let question =
            QuizQuestion::multiple_choice(1, "Pick one", 1.0, options(&[true, true, false]), false);
        assert!(question.validate_gradable().is_err());

        let question =
            QuizQuestion::multiple_choice(1, "Pick one", 1.0, options(&[true, false, false]), false);
        assert!(question.validate_gradable().is_ok());
    }

    #[test]
    fn multiple_select_requires_a_correct_option() {
        let question =
            QuizQuestion::multiple_choice(1, "Pick any", 1.0, options(&[false, false]), true);
        assert!(question.validate_gradable().is_err());
    }

    #[test]
    fn rejects_non_positive_points_and_blank_expected_answer() {
        let question = QuizQuestion::short_answer(1, "Q", 0.0, "answer", vec![]);
        assert!(question.validate_gradable().is_err());

        let question = QuizQuestion::short_answer(1, "Q", 1.0, "   ", vec![]);
        assert!(question.validate_gradable().is_err());
    }

    #[test]
    fn correct_option_ids_only_lists_correct_options() {
        let question =
            QuizQuestion::multiple_choice(1, "Pick any", 1.0, options(&[true, false, true]), true);
        assert_eq!(question.correct_option_ids().len(), 2);
    }
}

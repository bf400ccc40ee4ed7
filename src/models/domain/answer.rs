use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::grading::{round2, GradingPolicy, TextSimilarityCalculator};
use crate::models::domain::quiz_question::{QuestionKind, QuestionOption, QuizQuestion};

/// Outcome of grading one answer.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AnswerGrade {
    pub points_earned: f64,
    pub points_possible: f64,
    pub is_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

impl AnswerGrade {
    pub fn unanswered(points_possible: f64) -> Self {
        AnswerGrade {
            points_earned: 0.0,
            points_possible,
            is_correct: false,
            similarity_score: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MultipleChoiceAnswer {
    pub selected_option_ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ShortAnswer {
    pub text: String,
}

impl MultipleChoiceAnswer {
    pub fn new<I, S>(selected_option_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MultipleChoiceAnswer {
            selected_option_ids: selected_option_ids.into_iter().map(Into::into).collect(),
        }
    }

    fn selected_set(&self) -> HashSet<&str> {
        self.selected_option_ids.iter().map(String::as_str).collect()
    }

    /// Rejects selections that reference foreign options, or more than one
    /// option on a single-select question.
    pub fn validate_against(&self, question: &QuizQuestion) -> AppResult<()> {
        let (options, allow_multiple) = choice_options(question)?;

        let selected = self.selected_set();
        if let Some(unknown) = selected
            .iter()
            .find(|id| !options.iter().any(|o| o.id == **id))
        {
            return Err(AppError::ValidationError(format!(
                "Option '{}' does not belong to question '{}'",
                unknown, question.id
            )));
        }

        if !allow_multiple && selected.len() > 1 {
            return Err(AppError::ValidationError(format!(
                "Question '{}' accepts a single option",
                question.id
            )));
        }

        Ok(())
    }

    /// Grades the selection.
    ///
    /// Single-select questions are all-or-nothing. Multiple-select questions
    /// earn `max(0, correct_fraction - incorrect_penalty_fraction)` of the
    /// points, where the correct fraction is over the correct options and the
    /// penalty fraction is over the incorrect ones. The answer is correct only
    /// when the selected set equals the correct set.
    pub fn grade(&self, question: &QuizQuestion) -> AppResult<AnswerGrade> {
        self.validate_against(question)?;
        let (options, allow_multiple) = choice_options(question)?;

        let selected = self.selected_set();
        let correct: HashSet<&str> = question.correct_option_ids().into_iter().collect();
        let is_correct = !selected.is_empty() && selected == correct;

        let points_earned = if !allow_multiple {
            if is_correct {
                question.points
            } else {
                0.0
            }
        } else {
            let hits = selected.intersection(&correct).count();
            let misses = selected.len() - hits;
            let incorrect_total = options.len() - correct.len();

            let correct_fraction = if correct.is_empty() {
                0.0
            } else {
                hits as f64 / correct.len() as f64
            };
            let penalty_fraction = if incorrect_total == 0 {
                0.0
            } else {
                misses as f64 / incorrect_total as f64
            };

            round2((correct_fraction - penalty_fraction).max(0.0) * question.points)
        };

        Ok(AnswerGrade {
            points_earned,
            points_possible: question.points,
            is_correct,
            similarity_score: None,
        })
    }
}

fn choice_options(question: &QuizQuestion) -> AppResult<(&[QuestionOption], bool)> {
    match &question.kind {
        QuestionKind::MultipleChoice {
            options,
            allow_multiple,
        } => Ok((options.as_slice(), *allow_multiple)),
        QuestionKind::ShortAnswer { .. } => Err(AppError::ValidationError(format!(
            "Question '{}' is not a multiple-choice question",
            question.id
        ))),
    }
}

impl ShortAnswer {
    pub fn new(text: &str) -> Self {
        ShortAnswer {
            text: text.to_string(),
        }
    }

    /// Scores free text against one expected answer. At or above the
    /// threshold the answer is correct and earns `similarity * points`;
    /// below it earns nothing.
    pub fn score(
        student_answer: &str,
        expected_answer: &str,
        points_possible: f64,
        threshold: f64,
    ) -> AnswerGrade {
        let similarity = TextSimilarityCalculator::similarity(student_answer, expected_answer);
        let is_correct = similarity >= threshold;
        let points_earned = if is_correct {
            round2(similarity * points_possible)
        } else {
            0.0
        };

        AnswerGrade {
            points_earned,
            points_possible,
            is_correct,
            similarity_score: Some(similarity),
        }
    }

    /// Grades against the expected answer and every accepted alternative,
    /// keeping the best match.
    pub fn grade(&self, question: &QuizQuestion, policy: &GradingPolicy) -> AppResult<AnswerGrade> {
        let QuestionKind::ShortAnswer {
            expected_answer,
            accepted_answers,
        } = &question.kind
        else {
            return Err(AppError::ValidationError(format!(
                "Question '{}' is not a short-answer question",
                question.id
            )));
        };

        let best = std::iter::once(expected_answer)
            .chain(accepted_answers.iter())
            .map(|expected| {
                Self::score(
                    &self.text,
                    expected,
                    question.points,
                    policy.similarity_threshold,
                )
            })
            .max_by(|a, b| {
                a.similarity_score
                    .unwrap_or(0.0)
                    .total_cmp(&b.similarity_score.unwrap_or(0.0))
            })
            .unwrap_or_else(|| AnswerGrade::unanswered(question.points));

        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `total` options; the first `correct` of them are correct.
    fn multi_select(correct: usize, total: usize, points: f64) -> QuizQuestion {
        let options = (0..total)
            .map(|i| QuestionOption {
                id: format!("opt-{}", i),
                text: format!("Option {}", i),
                is_correct: i < correct,
            })
            .collect();
        QuizQuestion::multiple_choice(1, "Select all that apply", points, options, true)
    }

    fn single_select() -> QuizQuestion {
        let options = vec![
            QuestionOption {
                id: "a".to_string(),
                text: "Paris".to_string(),
                is_correct: true,
            },
            QuestionOption {
                id: "b".to_string(),
                text: "Lyon".to_string(),
                is_correct: false,
            },
        ];
        QuizQuestion::multiple_choice(1, "Capital of France?", 3.0, options, false)
    }

    #[test]
    fn all_and_only_correct_options_earn_full_credit() {
        let question = multi_select(2, 4, 4.0);
        let grade = MultipleChoiceAnswer::new(["opt-1", "opt-0"])
            .grade(&question)
            .expect("answer should grade");

        assert!(grade.is_correct);
        assert_eq!(grade.points_earned, 4.0);
        assert_eq!(grade.points_possible, 4.0);
    }

    #[test]
    fn partial_selection_earns_partial_credit() {
        let question = multi_select(2, 4, 4.0);
        let grade = MultipleChoiceAnswer::new(["opt-0"])
            .grade(&question)
            .expect("answer should grade");

        assert!(!grade.is_correct);
        assert_eq!(grade.points_earned, 2.0);
    }

    #[test]
    fn extra_incorrect_selection_lowers_score_monotonically() {
        let question = multi_select(2, 5, 6.0);

        let clean = MultipleChoiceAnswer::new(["opt-0", "opt-1"])
            .grade(&question)
            .expect("answer should grade");
        let one_wrong = MultipleChoiceAnswer::new(["opt-0", "opt-1", "opt-2"])
            .grade(&question)
            .expect("answer should grade");
        let two_wrong = MultipleChoiceAnswer::new(["opt-0", "opt-1", "opt-2", "opt-3"])
            .grade(&question)
            .expect("answer should grade");

        assert!(clean.points_earned > one_wrong.points_earned);
        assert!(one_wrong.points_earned > two_wrong.points_earned);
        // 1 - 1/3 of 6 points
        assert_eq!(one_wrong.points_earned, 4.0);
        assert!(!one_wrong.is_correct);
    }

    #[test]
    fn selecting_everything_earns_nothing() {
        let question = multi_select(2, 4, 4.0);
        let grade = MultipleChoiceAnswer::new(["opt-0", "opt-1", "opt-2", "opt-3"])
            .grade(&question)
            .expect("answer should grade");

        assert_eq!(grade.points_earned, 0.0);
    }

    #[test]
    fn score_never_goes_negative() {
        let question = multi_select(2, 4, 4.0);
        let grade = MultipleChoiceAnswer::new(["opt-2", "opt-3"])
            .grade(&question)
            .expect("answer should grade");

        assert_eq!(grade.points_earned, 0.0);
    }

    #[test]
    fn duplicate_selections_count_once() {
        let question = multi_select(2, 4, 4.0);
        let grade = MultipleChoiceAnswer::new(["opt-0", "opt-0", "opt-1"])
            .grade(&question)
            .expect("answer should grade");

        assert!(grade.is_correct);
        assert_eq!(grade.points_earned, 4.0);
    }

    #[test]
    fn empty_selection_is_not_correct() {
        let question = multi_select(2, 4, 4.0);
        let grade = MultipleChoiceAnswer::new(Vec::<String>::new())
            .grade(&question)
            .expect("answer should grade");

        assert!(!grade.is_correct);
        assert_eq!(grade.points_earned, 0.0);
    }

    #[test]
    fn single_select_is_all_or_nothing() {
        let question = single_select();

        let right = MultipleChoiceAnswer::new(["a"]).grade(&question).expect("grades");
        let wrong = MultipleChoiceAnswer::new(["b"]).grade(&question).expect("grades");

        assert!(right.is_correct);
        assert_eq!(right.points_earned, 3.0);
        assert!(!wrong.is_correct);
        assert_eq!(wrong.points_earned, 0.0);
    }

    #[test]
    fn single_select_rejects_two_options() {
        let question = single_select();
        let result = MultipleChoiceAnswer::new(["a", "b"]).grade(&question);

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let question = multi_select(2, 4, 4.0);
        let result = MultipleChoiceAnswer::new(["opt-9"]).grade(&question);

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn short_answer_exact_match_earns_full_points() {
        let grade = ShortAnswer::score("Paris", "paris", 5.0, 0.60);

        assert!(grade.is_correct);
        assert_eq!(grade.similarity_score, Some(1.0));
        assert_eq!(grade.points_earned, 5.0);
    }

    #[test]
    fn short_answer_above_threshold_earns_scaled_points() {
        let grade = ShortAnswer::score("The mitochondria", "mitochondria", 10.0, 0.60);

        assert!(grade.is_correct);
        assert_eq!(grade.points_earned, 6.5);
    }

    #[test]
    fn short_answer_below_threshold_earns_nothing() {
        let grade = ShortAnswer::score("ribosome", "mitochondria", 10.0, 0.60);

        assert!(!grade.is_correct);
        assert_eq!(grade.points_earned, 0.0);
        assert!(grade.similarity_score.unwrap_or(1.0) < 0.60);
    }

    #[test]
    fn short_answer_uses_best_accepted_answer() {
        let question = QuizQuestion::short_answer(
            1,
            "Largest planet?",
            2.0,
            "Jupiter",
            vec!["the planet jupiter".to_string(), "Jove".to_string()],
        );
        let grade = ShortAnswer::new("jove")
            .grade(&question, &GradingPolicy::default())
            .expect("answer should grade");

        assert!(grade.is_correct);
        assert_eq!(grade.points_earned, 2.0);
    }

    #[test]
    fn short_answer_rejects_multiple_choice_question() {
        let result = ShortAnswer::new("a").grade(&single_select(), &GradingPolicy::default());
        assert!(result.is_err());
    }
}

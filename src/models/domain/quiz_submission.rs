use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::grading::{round2, GradingPolicy};
use crate::models::domain::answer::{AnswerGrade, MultipleChoiceAnswer, ShortAnswer};
use crate::models::domain::quiz::Quiz;
use crate::models::domain::quiz_question::{QuestionKind, QuizQuestion};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
pub enum SubmissionStatus {
    InProgress,
    Submitted,
    Graded,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmittedAnswer {
    MultipleChoice(MultipleChoiceAnswer),
    ShortAnswer(ShortAnswer),
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuestionResponse {
    pub question_id: String,
    pub answer: SubmittedAnswer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<AnswerGrade>,
    #[serde(default)]
    pub manually_graded: bool,
}

/// One student's attempt at a quiz.
///
/// Moves `InProgress -> Submitted -> Graded`. Answers can only change while
/// in progress, and totals are only meaningful once graded. A failed
/// transition leaves the submission untouched.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizSubmission {
    pub id: String,
    pub quiz_id: String,
    pub student_id: String,
    pub attempt_number: i32,
    pub status: SubmissionStatus,
    pub responses: Vec<QuestionResponse>,
    pub total_points_earned: f64,
    pub total_points_possible: f64,
    pub score: f64,
    pub percentage: f64,
    pub passed: bool,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub graded_at: Option<DateTime<Utc>>,
}

impl QuizSubmission {
    pub fn start(quiz_id: &str, student_id: &str, attempt_number: i32, now: DateTime<Utc>) -> Self {
        QuizSubmission {
            id: Uuid::new_v4().to_string(),
            quiz_id: quiz_id.to_string(),
            student_id: student_id.to_string(),
            attempt_number,
            status: SubmissionStatus::InProgress,
            responses: Vec::new(),
            total_points_earned: 0.0,
            total_points_possible: 0.0,
            score: 0.0,
            percentage: 0.0,
            passed: false,
            started_at: now,
            submitted_at: None,
            graded_at: None,
        }
    }

    pub fn response_for(&self, question_id: &str) -> Option<&QuestionResponse> {
        self.responses.iter().find(|r| r.question_id == question_id)
    }

    fn ensure_status(&self, expected: SubmissionStatus, action: &str) -> AppResult<()> {
        if self.status != expected {
            return Err(AppError::InvalidState(format!(
                "Cannot {} submission '{}' while it is {:?}",
                action, self.id, self.status
            )));
        }
        Ok(())
    }

    /// Records (or replaces) the answer to one question.
    pub fn save_answer(
        &mut self,
        quiz: &Quiz,
        question_id: &str,
        answer: SubmittedAnswer,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.ensure_status(SubmissionStatus::InProgress, "answer")?;

        if let Some(deadline) = quiz.deadline_for(self.started_at) {
            if now > deadline {
                return Err(AppError::InvalidState(format!(
                    "Time limit for submission '{}' expired at {}",
                    self.id, deadline
                )));
            }
        }

        let question = quiz.question(question_id).ok_or_else(|| {
            AppError::NotFound(format!("Question with id '{}' not found", question_id))
        })?;

        match (&question.kind, &answer) {
            (QuestionKind::MultipleChoice { .. }, SubmittedAnswer::MultipleChoice(choice)) => {
                choice.validate_against(question)?
            }
            (QuestionKind::ShortAnswer { .. }, SubmittedAnswer::ShortAnswer(_)) => {}
            _ => {
                return Err(AppError::ValidationError(format!(
                    "Question '{}' expects a {} answer",
                    question.id,
                    question.kind_name()
                )))
            }
        }

        let response = QuestionResponse {
            question_id: question_id.to_string(),
            answer,
            grade: None,
            manually_graded: false,
        };
        match self
            .responses
            .iter_mut()
            .find(|r| r.question_id == question_id)
        {
            Some(existing) => *existing = response,
            None => self.responses.push(response),
        }

        Ok(())
    }

    pub fn submit(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        self.ensure_status(SubmissionStatus::InProgress, "submit")?;
        self.status = SubmissionStatus::Submitted;
        self.submitted_at = Some(now);
        Ok(())
    }

    /// Grades every response against the quiz and aggregates the totals.
    /// Unanswered questions count towards the points possible only.
    pub fn grade(&mut self, quiz: &Quiz, policy: &GradingPolicy, now: DateTime<Utc>) -> AppResult<()> {
        self.ensure_status(SubmissionStatus::Submitted, "grade")?;

        let grades = self
            .responses
            .iter()
            .map(|response| {
                let question = quiz.question(&response.question_id).ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Question with id '{}' not found",
                        response.question_id
                    ))
                })?;
                grade_response(question, &response.answer, policy)
            })
            .collect::<AppResult<Vec<_>>>()?;

        for (response, grade) in self.responses.iter_mut().zip(grades) {
            response.grade = Some(grade);
            response.manually_graded = false;
        }

        self.recompute_totals(quiz, policy);
        self.status = SubmissionStatus::Graded;
        self.graded_at = Some(now);
        Ok(())
    }

    /// Replaces the automatic grade of a short answer with a reviewer's.
    pub fn override_short_answer_points(
        &mut self,
        quiz: &Quiz,
        question_id: &str,
        points: f64,
        policy: &GradingPolicy,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.ensure_status(SubmissionStatus::Graded, "regrade")?;

        let question = quiz.question(question_id).ok_or_else(|| {
            AppError::NotFound(format!("Question with id '{}' not found", question_id))
        })?;
        if !matches!(question.kind, QuestionKind::ShortAnswer { .. }) {
            return Err(AppError::ValidationError(format!(
                "Only short answers can be graded manually, '{}' is {}",
                question_id,
                question.kind_name()
            )));
        }
        if !points.is_finite() || points < 0.0 || points > question.points {
            return Err(AppError::ValidationError(format!(
                "Points must be within [0, {}], got {}",
                question.points, points
            )));
        }

        let response = self
            .responses
            .iter_mut()
            .find(|r| r.question_id == question_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Submission '{}' has no answer for question '{}'",
                    self.id, question_id
                ))
            })?;

        let similarity_score = response.grade.as_ref().and_then(|g| g.similarity_score);
        response.grade = Some(AnswerGrade {
            points_earned: round2(points),
            points_possible: question.points,
            is_correct: points >= question.points * policy.similarity_threshold,
            similarity_score,
        });
        response.manually_graded = true;

        self.recompute_totals(quiz, policy);
        self.graded_at = Some(now);
        Ok(())
    }

    fn recompute_totals(&mut self, quiz: &Quiz, policy: &GradingPolicy) {
        let earned: f64 = self
            .responses
            .iter()
            .filter_map(|r| r.grade.as_ref())
            .map(|g| g.points_earned)
            .sum();
        let possible = quiz.total_points();

        self.total_points_earned = round2(earned);
        self.total_points_possible = possible;
        if possible > 0.0 {
            self.score = round2(earned / possible * policy.score_scale);
            self.percentage = round2(earned / possible * 100.0);
        } else {
            self.score = 0.0;
            self.percentage = 0.0;
        }
        self.passed = self.score >= quiz.passing_score;
    }
}

fn grade_response(
    question: &QuizQuestion,
    answer: &SubmittedAnswer,
    policy: &GradingPolicy,
) -> AppResult<AnswerGrade> {
    match answer {
        SubmittedAnswer::MultipleChoice(choice) => choice.grade(question),
        SubmittedAnswer::ShortAnswer(text) => text.grade(question, policy),
    }
}

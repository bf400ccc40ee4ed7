use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::errors::AppResult;
use crate::grading::GradingPolicy;
use crate::models::domain::{Quiz, QuizSubmission};
use crate::models::dto::request::SaveAnswerRequest;

/// A quiz plus one student's answers, graded outside any course workflow.
#[derive(Debug, Clone, Deserialize)]
pub struct GradeRequest {
    pub quiz: Quiz,
    #[serde(default = "default_student_id")]
    pub student_id: String,
    pub answers: Vec<SaveAnswerRequest>,
}

fn default_student_id() -> String {
    "anonymous".to_string()
}

impl GradeRequest {
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Runs a whole submission (answer, submit, grade) in one pass.
pub fn grade_request(
    request: GradeRequest,
    policy: &GradingPolicy,
    now: DateTime<Utc>,
) -> AppResult<QuizSubmission> {
    for question in &request.quiz.questions {
        question.validate_gradable()?;
    }

    let mut submission = QuizSubmission::start(&request.quiz.id, &request.student_id, 1, now);
    for answer in request.answers {
        answer.validate()?;
        submission.save_answer(&request.quiz, &answer.question_id, answer.answer, now)?;
    }
    submission.submit(now)?;
    submission.grade(&request.quiz, policy, now)?;

    log::debug!(
        "Graded {} answers for quiz {}: {}",
        submission.responses.len(),
        request.quiz.id,
        submission.score
    );
    Ok(submission)
}

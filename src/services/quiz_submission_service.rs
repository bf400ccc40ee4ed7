use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    auth::{require_active, require_course_staff, require_role},
    errors::{AppError, AppResult},
    grading::{round2, GradingPolicy},
    models::{
        domain::{
            Course, NotificationKind, Quiz, QuizStatus, QuizSubmission, SubmissionStatus, User,
            UserRole,
        },
        dto::{
            request::{OverridePointsRequest, SaveAnswerRequest},
            response::{QuizStatisticsDto, SubmissionResultDto},
        },
    },
    repositories::{CourseRepository, QuizRepository, QuizSubmissionRepository},
    services::notification_service::NotificationService,
};

pub struct QuizSubmissionService {
    submissions: Arc<dyn QuizSubmissionRepository>,
    quizzes: Arc<dyn QuizRepository>,
    courses: Arc<dyn CourseRepository>,
    notifications: Arc<NotificationService>,
    policy: GradingPolicy,
}

impl QuizSubmissionService {
    pub fn new(
        submissions: Arc<dyn QuizSubmissionRepository>,
        quizzes: Arc<dyn QuizRepository>,
        courses: Arc<dyn CourseRepository>,
        notifications: Arc<NotificationService>,
        policy: GradingPolicy,
    ) -> Self {
        Self {
            submissions,
            quizzes,
            courses,
            notifications,
            policy,
        }
    }

    async fn find_quiz_and_course(&self, quiz_id: &str) -> AppResult<(Quiz, Course)> {
        let quiz = self
            .quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))?;
        let course = self
            .courses
            .find_by_id(&quiz.course_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Course with id '{}' not found", quiz.course_id))
            })?;
        Ok((quiz, course))
    }

    async fn find_submission(&self, id: &str) -> AppResult<QuizSubmission> {
        self.submissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Submission with id '{}' not found", id)))
    }

    /// Loads a submission that belongs to `actor`.
    async fn find_own_submission(&self, actor: &User, id: &str) -> AppResult<QuizSubmission> {
        require_active(actor)?;
        let submission = self.find_submission(id).await?;
        if submission.student_id != actor.id {
            return Err(AppError::Forbidden(
                "You can only work on your own submissions".to_string(),
            ));
        }
        Ok(submission)
    }

    /// Opens a new attempt, or hands back the one already in progress.
    pub async fn start_submission(&self, actor: &User, quiz_id: &str) -> AppResult<QuizSubmission> {
        require_role(actor, UserRole::Student)?;
        let (quiz, course) = self.find_quiz_and_course(quiz_id).await?;
        if !course.is_enrolled(&actor.id) {
            return Err(AppError::Forbidden(format!(
                "You are not enrolled in course {}",
                course.code
            )));
        }

        if let Some(existing) = self.submissions.find_in_progress(&actor.id, quiz_id).await? {
            log::debug!(
                "Resuming submission {} of {} for quiz {}",
                existing.id,
                actor.username,
                quiz_id
            );
            return Ok(existing);
        }

        let now = Utc::now();
        if !quiz.is_open_at(now) {
            return Err(AppError::InvalidState(format!(
                "Quiz '{}' is not open for submissions",
                quiz.title
            )));
        }

        let attempts = self.submissions.count_attempts(&actor.id, quiz_id).await?;
        if let Some(max_attempts) = quiz.max_attempts {
            if attempts >= max_attempts as usize {
                return Err(AppError::InvalidState(format!(
                    "Maximum number of attempts ({}) reached for quiz '{}'",
                    max_attempts, quiz.title
                )));
            }
        }

        let submission = QuizSubmission::start(quiz_id, &actor.id, attempts as i32 + 1, now);
        let submission = match self.submissions.create(submission).await {
            Ok(created) => created,
            // a concurrent start won; hand back its attempt
            Err(AppError::AlreadyExists(reason)) => {
                return self
                    .submissions
                    .find_in_progress(&actor.id, quiz_id)
                    .await?
                    .ok_or(AppError::AlreadyExists(reason));
            }
            Err(e) => return Err(e),
        };
        log::info!(
            "User {} started attempt {} of quiz '{}'",
            actor.username,
            submission.attempt_number,
            quiz.title
        );
        Ok(submission)
    }

    pub async fn save_answer(
        &self,
        actor: &User,
        submission_id: &str,
        request: SaveAnswerRequest,
    ) -> AppResult<QuizSubmission> {
        request.validate()?;
        let mut submission = self.find_own_submission(actor, submission_id).await?;
        let (quiz, _) = self.find_quiz_and_course(&submission.quiz_id).await?;
        if quiz.status != QuizStatus::Published {
            return Err(AppError::InvalidState(format!(
                "Quiz '{}' no longer accepts answers",
                quiz.title
            )));
        }

        submission.save_answer(&quiz, &request.question_id, request.answer, Utc::now())?;
        self.submissions.update(submission).await
    }

    /// Hands the submission in, grades it and tells the student.
    pub async fn submit_submission(&self, actor: &User, submission_id: &str) -> AppResult<SubmissionResultDto> {
        let mut submission = self.find_own_submission(actor, submission_id).await?;
        let (quiz, _) = self.find_quiz_and_course(&submission.quiz_id).await?;

        let now = Utc::now();
        submission.submit(now)?;
        submission.grade(&quiz, &self.policy, now)?;
        let submission = self.submissions.update(submission).await?;
        log::info!(
            "Graded submission {} of {}: {}/{} ({}%)",
            submission.id,
            actor.username,
            submission.score,
            self.policy.score_scale,
            submission.percentage
        );

        self.notifications
            .notify(
                &submission.student_id,
                NotificationKind::SubmissionGraded,
                &format!("'{}' graded", quiz.title),
                &format!(
                    "You scored {} out of {}",
                    submission.score, self.policy.score_scale
                ),
            )
            .await?;
        Ok(SubmissionResultDto::from(&submission))
    }

    /// Visible to the student who owns it, the course staff and admins.
    pub async fn get_submission(&self, actor: &User, submission_id: &str) -> AppResult<QuizSubmission> {
        require_active(actor)?;
        let submission = self.find_submission(submission_id).await?;
        if submission.student_id == actor.id {
            return Ok(submission);
        }
        let (_, course) = self.find_quiz_and_course(&submission.quiz_id).await?;
        require_course_staff(actor, &course)?;
        Ok(submission)
    }

    pub async fn list_my_submissions(&self, actor: &User, quiz_id: &str) -> AppResult<Vec<SubmissionResultDto>> {
        require_active(actor)?;
        Ok(self
            .submissions
            .list_by_student_and_quiz(&actor.id, quiz_id)
            .await?
            .iter()
            .map(SubmissionResultDto::from)
            .collect())
    }

    pub async fn list_submissions_for_quiz(
        &self,
        actor: &User,
        quiz_id: &str,
    ) -> AppResult<Vec<SubmissionResultDto>> {
        let (_, course) = self.find_quiz_and_course(quiz_id).await?;
        require_course_staff(actor, &course)?;
        Ok(self
            .submissions
            .list_by_quiz(quiz_id)
            .await?
            .iter()
            .map(SubmissionResultDto::from)
            .collect())
    }

    pub async fn override_short_answer_points(
        &self,
        actor: &User,
        submission_id: &str,
        request: OverridePointsRequest,
    ) -> AppResult<SubmissionResultDto> {
        request.validate()?;
        let mut submission = self.find_submission(submission_id).await?;
        let (quiz, course) = self.find_quiz_and_course(&submission.quiz_id).await?;
        require_course_staff(actor, &course)?;

        submission.override_short_answer_points(
            &quiz,
            &request.question_id,
            request.points,
            &self.policy,
            Utc::now(),
        )?;
        let submission = self.submissions.update(submission).await?;
        log::info!(
            "User {} set question {} of submission {} to {} points",
            actor.username,
            request.question_id,
            submission.id,
            request.points
        );

        self.notifications
            .notify(
                &submission.student_id,
                NotificationKind::GradeUpdated,
                &format!("Grade updated for '{}'", quiz.title),
                &format!(
                    "Your score is now {} out of {}",
                    submission.score, self.policy.score_scale
                ),
            )
            .await?;
        Ok(SubmissionResultDto::from(&submission))
    }

    /// Aggregates over graded submissions only.
    pub async fn quiz_statistics(&self, actor: &User, quiz_id: &str) -> AppResult<QuizStatisticsDto> {
        let (_, course) = self.find_quiz_and_course(quiz_id).await?;
        require_course_staff(actor, &course)?;

        let scores: Vec<(f64, bool)> = self
            .submissions
            .list_by_quiz(quiz_id)
            .await?
            .iter()
            .filter(|s| s.status == SubmissionStatus::Graded)
            .map(|s| (s.score, s.passed))
            .collect();

        if scores.is_empty() {
            return Ok(QuizStatisticsDto {
                quiz_id: quiz_id.to_string(),
                graded_submissions: 0,
                average_score: 0.0,
                highest_score: 0.0,
                lowest_score: 0.0,
                pass_rate: 0.0,
            });
        }

        let count = scores.len() as f64;
        let total: f64 = scores.iter().map(|(score, _)| score).sum();
        let passed = scores.iter().filter(|(_, passed)| *passed).count() as f64;
        let highest = scores
            .iter()
            .map(|(score, _)| *score)
            .fold(f64::MIN, f64::max);
        let lowest = scores
            .iter()
            .map(|(score, _)| *score)
            .fold(f64::MAX, f64::min);

        Ok(QuizStatisticsDto {
            quiz_id: quiz_id.to_string(),
            graded_submissions: scores.len(),
            average_score: round2(total / count),
            highest_score: highest,
            lowest_score: lowest,
            pass_rate: round2(passed / count * 100.0),
        })
    }
}

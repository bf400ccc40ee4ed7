use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{require_course_member, require_course_staff},
    errors::{AppError, AppResult},
    grading::GradingPolicy,
    models::{
        domain::{Course, NotificationKind, Quiz, QuizQuestion, QuizStatus, User},
        dto::{
            quiz_dto::{QuizForStudentDto, QuizSummaryDto},
            request::{AddQuestionRequest, CreateQuizRequest},
        },
    },
    repositories::{CourseRepository, QuizRepository},
    services::notification_service::NotificationService,
};

pub struct QuizService {
    quizzes: Arc<dyn QuizRepository>,
    courses: Arc<dyn CourseRepository>,
    notifications: Arc<NotificationService>,
    policy: GradingPolicy,
}

impl QuizService {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        courses: Arc<dyn CourseRepository>,
        notifications: Arc<NotificationService>,
        policy: GradingPolicy,
    ) -> Self {
        Self {
            quizzes,
            courses,
            notifications,
            policy,
        }
    }

    async fn find_course(&self, id: &str) -> AppResult<Course> {
        self.courses
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course with id '{}' not found", id)))
    }

    pub async fn find_quiz(&self, id: &str) -> AppResult<Quiz> {
        self.quizzes
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))
    }

    /// Loads a quiz together with its course after checking the actor may
    /// edit it.
    async fn find_quiz_as_staff(&self, actor: &User, id: &str) -> AppResult<(Quiz, Course)> {
        let quiz = self.find_quiz(id).await?;
        let course = self.find_course(&quiz.course_id).await?;
        require_course_staff(actor, &course)?;
        Ok((quiz, course))
    }

    pub async fn create_quiz(&self, actor: &User, request: CreateQuizRequest) -> AppResult<Quiz> {
        request.validate()?;
        let course = self.find_course(&request.course_id).await?;
        require_course_staff(actor, &course)?;

        if let (Some(from), Some(until)) = (request.available_from, request.available_until) {
            if from >= until {
                return Err(AppError::ValidationError(
                    "available_from must be before available_until".to_string(),
                ));
            }
        }

        let mut quiz = Quiz::new_draft(&course.id, &request.title, &actor.id);
        quiz.description = request.description;
        if let Some(passing_score) = request.passing_score {
            if passing_score > self.policy.score_scale {
                return Err(AppError::ValidationError(format!(
                    "Passing score {} exceeds the grading scale of {}",
                    passing_score, self.policy.score_scale
                )));
            }
            quiz.passing_score = passing_score;
        } else {
            quiz.passing_score = self.policy.score_scale / 2.0;
        }
        quiz.max_attempts = request.max_attempts;
        quiz.time_limit_minutes = request.time_limit_minutes;
        quiz.available_from = request.available_from;
        quiz.available_until = request.available_until;

        let quiz = self.quizzes.create(quiz).await?;
        log::info!(
            "User {} created quiz '{}' in course {}",
            actor.username,
            quiz.title,
            course.code
        );
        Ok(quiz)
    }

    pub async fn add_question(
        &self,
        actor: &User,
        quiz_id: &str,
        request: AddQuestionRequest,
    ) -> AppResult<Quiz> {
        request.validate()?;
        let (mut quiz, _) = self.find_quiz_as_staff(actor, quiz_id).await?;

        let order = request.order.unwrap_or_else(|| quiz.next_question_order());
        let question = QuizQuestion {
            id: uuid::Uuid::new_v4().to_string(),
            order,
            prompt: request.prompt,
            points: request.points,
            kind: request.kind.into(),
        };
        log::debug!(
            "Adding {} question {} to quiz {}",
            question.kind_name(),
            question.id,
            quiz.id
        );
        quiz.add_question(question)?;
        self.quizzes.update(quiz).await
    }

    pub async fn remove_question(&self, actor: &User, quiz_id: &str, question_id: &str) -> AppResult<Quiz> {
        let (mut quiz, _) = self.find_quiz_as_staff(actor, quiz_id).await?;
        quiz.remove_question(question_id)?;
        self.quizzes.update(quiz).await
    }

    /// Publishes a draft and notifies every enrolled student.
    pub async fn publish_quiz(&self, actor: &User, quiz_id: &str) -> AppResult<Quiz> {
        let (mut quiz, course) = self.find_quiz_as_staff(actor, quiz_id).await?;
        quiz.publish()?;
        let quiz = self.quizzes.update(quiz).await?;
        log::info!(
            "Published quiz '{}' ({} questions, {} points)",
            quiz.title,
            quiz.questions.len(),
            quiz.total_points()
        );

        self.notifications
            .notify_many(
                &course.student_ids,
                NotificationKind::QuizPublished,
                &format!("New quiz in {}", course.code),
                &format!("'{}' is now available", quiz.title),
            )
            .await?;
        Ok(quiz)
    }

    pub async fn close_quiz(&self, actor: &User, quiz_id: &str) -> AppResult<Quiz> {
        let (mut quiz, _) = self.find_quiz_as_staff(actor, quiz_id).await?;
        quiz.close()?;
        log::info!("Closed quiz '{}'", quiz.title);
        self.quizzes.update(quiz).await
    }

    /// Full quiz including answers, for course staff.
    pub async fn get_quiz(&self, actor: &User, quiz_id: &str) -> AppResult<Quiz> {
        let (quiz, _) = self.find_quiz_as_staff(actor, quiz_id).await?;
        Ok(quiz)
    }

    pub async fn get_quiz_for_student(&self, actor: &User, quiz_id: &str) -> AppResult<QuizForStudentDto> {
        let quiz = self.find_quiz(quiz_id).await?;
        let course = self.find_course(&quiz.course_id).await?;
        require_course_member(actor, &course)?;

        if quiz.status == QuizStatus::Draft && !course.is_staff(actor) {
            return Err(AppError::NotFound(format!(
                "Quiz with id '{}' not found",
                quiz_id
            )));
        }
        Ok(QuizForStudentDto::from(&quiz))
    }

    /// Staff see drafts too; students only published and closed quizzes.
    pub async fn list_quizzes_for_course(&self, actor: &User, course_id: &str) -> AppResult<Vec<QuizSummaryDto>> {
        let course = self.find_course(course_id).await?;
        require_course_member(actor, &course)?;
        let is_staff = course.is_staff(actor);

        Ok(self
            .quizzes
            .list_by_course(course_id)
            .await?
            .iter()
            .filter(|q| is_staff || q.status != QuizStatus::Draft)
            .map(QuizSummaryDto::from)
            .collect())
    }
}

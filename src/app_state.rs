use std::sync::Arc;

use crate::{
    config::Config,
    errors::AppResult,
    grading::GradingPolicy,
    repositories::{
        InMemoryAcademicYearRepository, InMemoryCourseRepository, InMemoryNotificationRepository,
        InMemoryQuizRepository, InMemoryQuizSubmissionRepository, InMemoryUserRepository,
    },
    services::{
        CourseService, NotificationService, QuizService, QuizSubmissionService, UserService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub course_service: Arc<CourseService>,
    pub quiz_service: Arc<QuizService>,
    pub submission_service: Arc<QuizSubmissionService>,
    pub notification_service: Arc<NotificationService>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires every service on top of in-memory repositories.
    pub fn in_memory(config: Config) -> AppResult<Self> {
        config.validate()?;
        let policy = GradingPolicy::from(&config);

        let users = Arc::new(InMemoryUserRepository::new());
        let courses = Arc::new(InMemoryCourseRepository::new());
        let quizzes = Arc::new(InMemoryQuizRepository::new());

        let notification_service = Arc::new(NotificationService::new(Arc::new(
            InMemoryNotificationRepository::new(),
        )));
        let user_service = Arc::new(UserService::new(users.clone()).with_page_sizes(&config));
        let course_service = Arc::new(CourseService::new(
            Arc::new(InMemoryAcademicYearRepository::new()),
            courses.clone(),
            users,
            notification_service.clone(),
        ));
        let quiz_service = Arc::new(QuizService::new(
            quizzes.clone(),
            courses.clone(),
            notification_service.clone(),
            policy,
        ));
        let submission_service = Arc::new(QuizSubmissionService::new(
            Arc::new(InMemoryQuizSubmissionRepository::new()),
            quizzes,
            courses,
            notification_service.clone(),
            policy,
        ));

        Ok(Self {
            user_service,
            course_service,
            quiz_service,
            submission_service,
            notification_service,
            config: Arc::new(config),
        })
    }
}

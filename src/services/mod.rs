pub mod course_service;
pub mod notification_service;
pub mod quiz_service;
pub mod quiz_submission_service;
pub mod user_service;

pub use course_service::CourseService;
pub use notification_service::NotificationService;
pub use quiz_service::QuizService;
pub use quiz_submission_service::QuizSubmissionService;
pub use user_service::UserService;

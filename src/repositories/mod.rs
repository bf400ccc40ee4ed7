pub mod academic_year_repository;
pub mod course_repository;
pub mod notification_repository;
pub mod quiz_repository;
pub mod quiz_submission_repository;
pub mod user_repository;

pub use academic_year_repository::{AcademicYearRepository, InMemoryAcademicYearRepository};
pub use course_repository::{CourseRepository, InMemoryCourseRepository};
pub use notification_repository::{InMemoryNotificationRepository, NotificationRepository};
pub use quiz_repository::{InMemoryQuizRepository, QuizRepository};
pub use quiz_submission_repository::{InMemoryQuizSubmissionRepository, QuizSubmissionRepository};
pub use user_repository::{InMemoryUserRepository, UserRepository};

/// Slices an already sorted result set and reports the unpaged total.
pub(crate) fn paginate<T>(items: Vec<T>, offset: i64, limit: i64) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let page = items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect();
    (page, total)
}

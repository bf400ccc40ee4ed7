pub mod academic_year;
pub mod answer;
pub mod course;
pub mod notification;
pub mod quiz;
pub mod quiz_question;
pub mod quiz_submission;
pub mod user;
pub use academic_year::AcademicYear;
pub use course::Course;
pub use notification::{Notification, NotificationKind};
pub use quiz::{Quiz, QuizStatus};
pub use quiz_question::{QuestionKind, QuestionOption, QuizQuestion};
pub use quiz_submission::{QuizSubmission, SubmissionStatus, SubmittedAnswer};
pub use user::{User, UserRole};

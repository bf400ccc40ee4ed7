use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
pub enum NotificationKind {
    QuizPublished,
    SubmissionGraded,
    GradeUpdated,
    CourseEnrollment,
}

impl Notification {
    pub fn new(user_id: &str, kind: NotificationKind, title: &str, message: &str) -> Self {
        Notification {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            kind,
            title: title.to_string(),
            message: message.to_string(),
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_notification_is_unread() {
        let notification = Notification::new(
            "student-1",
            NotificationKind::SubmissionGraded,
            "Quiz graded",
            "You scored 15/20",
        );

        assert!(!notification.is_read);
        assert_eq!(notification.kind, NotificationKind::SubmissionGraded);
    }

    #[test]
    fn notification_round_trips_through_json() {
        let notification = Notification::new("u", NotificationKind::QuizPublished, "t", "m");
        let json = serde_json::to_string(&notification).expect("notification should serialize");
        let parsed: Notification = serde_json::from_str(&json).expect("should deserialize");

        assert_eq!(parsed, notification);
    }
}

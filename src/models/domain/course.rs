use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::user::{User, UserRole};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Course {
    pub id: String,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub academic_year_id: String,
    pub instructor_ids: Vec<String>,
    pub student_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Course {
    pub fn new(code: &str, title: &str, description: Option<String>, academic_year_id: &str) -> Self {
        Course {
            id: Uuid::new_v4().to_string(),
            code: code.trim().to_uppercase(),
            title: title.to_string(),
            description,
            academic_year_id: academic_year_id.to_string(),
            instructor_ids: Vec::new(),
            student_ids: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn is_instructor(&self, user_id: &str) -> bool {
        self.instructor_ids.iter().any(|id| id == user_id)
    }

    pub fn is_enrolled(&self, user_id: &str) -> bool {
        self.student_ids.iter().any(|id| id == user_id)
    }

    /// Admins and the course's own instructors manage its content. A user
    /// listed as instructor loses staff rights once their role changes.
    pub fn is_staff(&self, user: &User) -> bool {
        user.is_admin() || (user.role == UserRole::Instructor && self.is_instructor(&user.id))
    }

    pub fn is_member(&self, user: &User) -> bool {
        self.is_staff(user) || self.is_enrolled(&user.id)
    }

    /// Returns false when the student was already enrolled.
    pub fn enroll(&mut self, student_id: &str) -> bool {
        if self.is_enrolled(student_id) {
            return false;
        }
        self.student_ids.push(student_id.to_string());
        true
    }

    pub fn unenroll(&mut self, student_id: &str) -> bool {
        let before = self.student_ids.len();
        self.student_ids.retain(|id| id != student_id);
        before != self.student_ids.len()
    }

    pub fn add_instructor(&mut self, instructor_id: &str) -> bool {
        if self.is_instructor(instructor_id) {
            return false;
        }
        self.instructor_ids.push(instructor_id.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_normalized() {
        let course = Course::new(" cs101 ", "Intro", None, "year-1");
        assert_eq!(course.code, "CS101");
    }

    #[test]
    fn enroll_is_idempotent() {
        let mut course = Course::new("CS101", "Intro", None, "year-1");
        assert!(course.enroll("student-1"));
        assert!(!course.enroll("student-1"));
        assert_eq!(course.student_ids.len(), 1);

        assert!(course.unenroll("student-1"));
        assert!(!course.unenroll("student-1"));
    }

    #[test]
    fn staff_includes_admins_and_instructors() {
        let mut course = Course::new("CS101", "Intro", None, "year-1");
        let admin = User::test_user("admin", UserRole::Admin);
        let teacher = User::test_user("teacher", UserRole::Instructor);
        let other = User::test_user("other", UserRole::Instructor);
        course.add_instructor(&teacher.id);

        assert!(course.is_staff(&admin));
        assert!(course.is_staff(&teacher));
        assert!(!course.is_staff(&other));
    }

    #[test]
    fn demoted_instructor_is_no_longer_staff() {
        let mut course = Course::new("CS101", "Intro", None, "year-1");
        let mut teacher = User::test_user("teacher", UserRole::Instructor);
        course.add_instructor(&teacher.id);

        teacher.role = UserRole::Student;
        assert!(!course.is_staff(&teacher));
        assert!(!course.is_member(&teacher));
    }
}

#[cfg(test)]
pub mod fixtures {
    use crate::models::domain::{Course, QuestionOption, Quiz, QuizQuestion, User, UserRole};

    pub fn admin() -> User {
        User::test_user("admin", UserRole::Admin)
    }

    pub fn instructor() -> User {
        User::test_user("instructor", UserRole::Instructor)
    }

    pub fn student(username: &str) -> User {
        User::test_user(username, UserRole::Student)
    }

    /// Course taught by `teacher` with every student in `students` enrolled.
    pub fn course_with(teacher: &User, students: &[&User]) -> Course {
        let mut course = Course::new("BIO101", "Biology", None, "year-1");
        course.add_instructor(&teacher.id);
        for student in students {
            course.enroll(&student.id);
        }
        course
    }

    /// Draft quiz worth 10 points: a single choice (4), a multi-select (4)
    /// and a short answer (2). Option ids are stable so tests can select them.
    pub fn cell_quiz(course_id: &str, created_by: &str) -> Quiz {
        let option = |id: &str, is_correct| QuestionOption {
            id: id.to_string(),
            text: id.to_string(),
            is_correct,
        };

        let mut quiz = Quiz::new_draft(course_id, "Cells", created_by);
        let questions = [
            QuizQuestion::multiple_choice(
                1,
                "Which organelle makes ATP?",
                4.0,
                vec![option("mitochondria", true), option("golgi", false)],
                false,
            ),
            QuizQuestion::multiple_choice(
                2,
                "Which are found in plant cells?",
                4.0,
                vec![
                    option("cell wall", true),
                    option("chloroplast", true),
                    option("centriole", false),
                ],
                true,
            ),
            QuizQuestion::short_answer(3, "Powerhouse of the cell?", 2.0, "mitochondria", vec![]),
        ];
        for question in questions {
            quiz.add_question(question)
                .expect("fixture questions are valid");
        }
        quiz
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_course_fixture_membership() {
        let teacher = instructor();
        let alice = student("alice");
        let course = course_with(&teacher, &[&alice]);

        assert!(course.is_instructor(&teacher.id));
        assert!(course.is_enrolled(&alice.id));
        assert!(!course.is_enrolled(&teacher.id));
    }

    #[test]
    fn test_cell_quiz_is_publishable() {
        let mut quiz = cell_quiz("course-1", "teacher-1");
        assert_eq!(quiz.total_points(), 10.0);
        assert!(quiz.publish().is_ok());
    }
}

use std::sync::Arc;

use tokio::sync::Mutex;
use validator::Validate;

use crate::{
    auth::{require_active, require_admin, require_course_member, require_course_staff},
    errors::{AppError, AppResult},
    models::{
        domain::{AcademicYear, Course, NotificationKind, User, UserRole},
        dto::request::{CreateAcademicYearRequest, CreateCourseRequest},
    },
    repositories::{AcademicYearRepository, CourseRepository, UserRepository},
    services::notification_service::NotificationService,
};

pub struct CourseService {
    academic_years: Arc<dyn AcademicYearRepository>,
    courses: Arc<dyn CourseRepository>,
    users: Arc<dyn UserRepository>,
    notifications: Arc<NotificationService>,
    // serialises read-modify-write of course membership
    membership: Mutex<()>,
}

impl CourseService {
    pub fn new(
        academic_years: Arc<dyn AcademicYearRepository>,
        courses: Arc<dyn CourseRepository>,
        users: Arc<dyn UserRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            academic_years,
            courses,
            users,
            notifications,
            membership: Mutex::new(()),
        }
    }

    pub async fn create_academic_year(
        &self,
        actor: &User,
        request: CreateAcademicYearRequest,
    ) -> AppResult<AcademicYear> {
        require_admin(actor)?;
        request.validate()?;
        if request.starts_on >= request.ends_on {
            return Err(AppError::ValidationError(
                "An academic year must start before it ends".to_string(),
            ));
        }

        let year = self
            .academic_years
            .create(AcademicYear::new(
                &request.label,
                request.starts_on,
                request.ends_on,
            ))
            .await?;
        log::info!("Created academic year {}", year.label);
        Ok(year)
    }

    pub async fn set_current_academic_year(&self, actor: &User, id: &str) -> AppResult<AcademicYear> {
        require_admin(actor)?;
        let year = self.academic_years.set_current(id).await?;
        log::info!("Academic year {} is now current", year.label);
        Ok(year)
    }

    pub async fn current_academic_year(&self) -> AppResult<Option<AcademicYear>> {
        self.academic_years.find_current().await
    }

    pub async fn list_academic_years(&self, actor: &User) -> AppResult<Vec<AcademicYear>> {
        require_active(actor)?;
        self.academic_years.list().await
    }

    pub async fn create_course(&self, actor: &User, request: CreateCourseRequest) -> AppResult<Course> {
        require_admin(actor)?;
        request.validate()?;
        self.academic_years
            .find_by_id(&request.academic_year_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Academic year with id '{}' not found",
                    request.academic_year_id
                ))
            })?;

        let course = self
            .courses
            .create(Course::new(
                &request.code,
                &request.title,
                request.description,
                &request.academic_year_id,
            ))
            .await?;
        log::info!("Created course {} ({})", course.code, course.id);
        Ok(course)
    }

    /// Looks a course up without access checks, for other services.
    pub async fn find_course(&self, id: &str) -> AppResult<Course> {
        self.courses
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Course with id '{}' not found", id)))
    }

    pub async fn get_course(&self, actor: &User, id: &str) -> AppResult<Course> {
        let course = self.find_course(id).await?;
        require_course_member(actor, &course)?;
        Ok(course)
    }

    async fn find_active_user_with_role(&self, user_id: &str, role: UserRole) -> AppResult<User> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", user_id)))?;

        if user.role != role || !user.is_active {
            return Err(AppError::ValidationError(format!(
                "User '{}' is not an active {:?}",
                user.username, role
            )));
        }
        Ok(user)
    }

    pub async fn assign_instructor(
        &self,
        actor: &User,
        course_id: &str,
        instructor_id: &str,
    ) -> AppResult<Course> {
        require_admin(actor)?;
        let instructor = self
            .find_active_user_with_role(instructor_id, UserRole::Instructor)
            .await?;
        let _guard = self.membership.lock().await;
        let mut course = self.find_course(course_id).await?;

        if !course.add_instructor(&instructor.id) {
            return Ok(course);
        }
        log::info!("Assigned {} to course {}", instructor.username, course.code);
        self.courses.update(course).await
    }

    pub async fn enroll_student(&self, actor: &User, course_id: &str, student_id: &str) -> AppResult<Course> {
        let guard = self.membership.lock().await;
        let mut course = self.find_course(course_id).await?;
        require_course_staff(actor, &course)?;
        let student = self
            .find_active_user_with_role(student_id, UserRole::Student)
            .await?;

        if !course.enroll(&student.id) {
            return Ok(course);
        }
        let course = self.courses.update(course).await?;
        drop(guard);
        log::info!("Enrolled {} in course {}", student.username, course.code);

        self.notifications
            .notify(
                &student.id,
                NotificationKind::CourseEnrollment,
                &format!("Enrolled in {}", course.code),
                &format!("You have been enrolled in {}: {}", course.code, course.title),
            )
            .await?;
        Ok(course)
    }

    pub async fn unenroll_student(
        &self,
        actor: &User,
        course_id: &str,
        student_id: &str,
    ) -> AppResult<Course> {
        let _guard = self.membership.lock().await;
        let mut course = self.find_course(course_id).await?;
        require_course_staff(actor, &course)?;

        if !course.unenroll(student_id) {
            return Err(AppError::NotFound(format!(
                "Student '{}' is not enrolled in course '{}'",
                student_id, course.code
            )));
        }
        self.courses.update(course).await
    }

    /// Admins see every course, instructors the ones they teach and students
    /// the ones they are enrolled in.
    pub async fn list_courses_for_user(&self, actor: &User) -> AppResult<Vec<Course>> {
        require_active(actor)?;
        match actor.role {
            UserRole::Admin => {
                let (courses, _) = self.courses.list(0, i64::MAX).await?;
                Ok(courses)
            }
            UserRole::Instructor => self.courses.list_for_instructor(&actor.id).await,
            UserRole::Student => self.courses.list_for_student(&actor.id).await,
        }
    }
}

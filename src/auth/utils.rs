use crate::{
    errors::{AppError, AppResult},
    models::domain::{Course, User, UserRole},
};

pub fn require_active(actor: &User) -> AppResult<()> {
    if !actor.is_active {
        return Err(AppError::Forbidden(format!(
            "User '{}' is deactivated",
            actor.username
        )));
    }
    Ok(())
}

pub fn require_admin(actor: &User) -> AppResult<()> {
    require_active(actor)?;
    if !actor.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can perform this action".to_string(),
        ));
    }
    Ok(())
}

pub fn require_role(actor: &User, role: UserRole) -> AppResult<()> {
    require_active(actor)?;
    if actor.role != role {
        return Err(AppError::Forbidden(format!(
            "Only {:?} users can perform this action",
            role
        )));
    }
    Ok(())
}

pub fn require_owner_or_admin(actor: &User, resource_owner: &str) -> AppResult<()> {
    require_active(actor)?;
    if !actor.is_admin() && actor.id != resource_owner {
        return Err(AppError::Forbidden(
            "You can only access your own resources".to_string(),
        ));
    }
    Ok(())
}

/// Admins or instructors of the course.
pub fn require_course_staff(actor: &User, course: &Course) -> AppResult<()> {
    require_active(actor)?;
    if !course.is_staff(actor) {
        return Err(AppError::Forbidden(format!(
            "Only staff of course '{}' can perform this action",
            course.code
        )));
    }
    Ok(())
}

pub fn require_course_member(actor: &User, course: &Course) -> AppResult<()> {
    require_active(actor)?;
    if !course.is_member(actor) {
        return Err(AppError::Forbidden(format!(
            "You are not a member of course '{}'",
            course.code
        )));
    }
    Ok(())
}

use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{require_admin, require_owner_or_admin},
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::{User, UserRole},
        dto::{
            request::{CreateUserRequest, PaginationParams},
            response::{Page, UserDto},
        },
    },
    repositories::UserRepository,
};

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    default_page_size: i64,
    max_page_size: i64,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        let defaults = Config::default();
        Self {
            repository,
            default_page_size: defaults.default_page_size,
            max_page_size: defaults.max_page_size,
        }
    }

    pub fn with_page_sizes(mut self, config: &Config) -> Self {
        self.default_page_size = config.default_page_size;
        self.max_page_size = config.max_page_size;
        self
    }

    /// Creates the first admin account. Only allowed while no admin exists.
    pub async fn bootstrap_admin(&self, request: CreateUserRequest) -> AppResult<User> {
        request.validate()?;
        let (_, admins) = self.repository.list(Some(UserRole::Admin), 0, 1).await?;
        if admins > 0 {
            return Err(AppError::InvalidState(
                "An admin account already exists".to_string(),
            ));
        }

        let mut user = User::from_request(request);
        user.role = UserRole::Admin;
        log::info!("Bootstrapping admin account {}", user.username);
        self.repository.create(user).await
    }

    pub async fn create_user(&self, actor: &User, request: CreateUserRequest) -> AppResult<UserDto> {
        require_admin(actor)?;
        request.validate()?;

        let user = self.repository.create(User::from_request(request)).await?;
        log::info!(
            "User {} created {:?} account {}",
            actor.username,
            user.role,
            user.username
        );
        Ok(user.into())
    }

    pub async fn get_user(&self, actor: &User, id: &str) -> AppResult<UserDto> {
        require_owner_or_admin(actor, id)?;
        Ok(self.find_user(id).await?.into())
    }

    /// Looks a user up without access checks, for other services.
    pub async fn find_user(&self, id: &str) -> AppResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", id)))
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<User> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("User with username '{}' not found", username))
            })
    }

    pub async fn list_users(
        &self,
        actor: &User,
        role: Option<UserRole>,
        params: PaginationParams,
    ) -> AppResult<Page<UserDto>> {
        require_admin(actor)?;
        params.validate()?;

        let offset = params.offset();
        let limit = params.limit_within(self.default_page_size, self.max_page_size);
        let (users, total) = self.repository.list(role, offset, limit).await?;
        Ok(Page {
            items: users.into_iter().map(UserDto::from).collect(),
            total,
            offset,
            limit,
        })
    }

    pub async fn change_role(&self, actor: &User, user_id: &str, role: UserRole) -> AppResult<UserDto> {
        require_admin(actor)?;
        if actor.id == user_id {
            return Err(AppError::Forbidden(
                "Admins cannot change their own role".to_string(),
            ));
        }

        let mut user = self.find_user(user_id).await?;
        if user.role == role {
            return Ok(user.into());
        }

        log::info!(
            "User {} changed role of {} from {:?} to {:?}",
            actor.username,
            user.username,
            user.role,
            role
        );
        user.role = role;
        Ok(self.repository.update(user).await?.into())
    }

    pub async fn deactivate_user(&self, actor: &User, user_id: &str) -> AppResult<UserDto> {
        require_admin(actor)?;
        if actor.id == user_id {
            return Err(AppError::Forbidden(
                "Admins cannot deactivate themselves".to_string(),
            ));
        }

        let mut user = self.find_user(user_id).await?;
        if !user.is_active {
            return Ok(user.into());
        }

        log::info!("User {} deactivated {}", actor.username, user.username);
        user.is_active = false;
        Ok(self.repository.update(user).await?.into())
    }
}

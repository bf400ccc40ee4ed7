use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{User, UserRole},
    repositories::paginate,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn list(
        &self,
        role: Option<UserRole>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<User>, i64)>;
    async fn update(&self, user: User) -> AppResult<User>;
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        let taken = users.values().any(|u| {
            u.username.eq_ignore_ascii_case(&user.username)
                || u.email.eq_ignore_ascii_case(&user.email)
        });
        if taken || users.contains_key(&user.id) {
            return Err(AppError::AlreadyExists(format!(
                "User with username '{}' or email '{}' already exists",
                user.username, user.email
            )));
        }

        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn list(
        &self,
        role: Option<UserRole>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<User>, i64)> {
        let users = self.users.read().await;
        let mut items: Vec<_> = users
            .values()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.username.cmp(&b.username));

        Ok(paginate(items, offset, limit))
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                user.id
            )));
        }

        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_rejects_duplicate_username_case_insensitively() {
        let repo = InMemoryUserRepository::new();
        repo.create(User::test_user("alice", UserRole::Student))
            .await
            .expect("first user is created");

        let mut duplicate = User::test_user("ALICE", UserRole::Student);
        duplicate.email = "other@example.com".to_string();
        let result = repo.create(duplicate).await;

        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn list_filters_by_role_and_paginates() {
        let repo = InMemoryUserRepository::new();
        for name in ["carol", "alice", "bob"] {
            repo.create(User::test_user(name, UserRole::Student))
                .await
                .expect("user is created");
        }
        repo.create(User::test_user("teacher", UserRole::Instructor))
            .await
            .expect("user is created");

        let (students, total) = repo
            .list(Some(UserRole::Student), 0, 2)
            .await
            .expect("list succeeds");
        assert_eq!(total, 3);
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].username, "alice");

        let (all, total) = repo.list(None, 0, 10).await.expect("list succeeds");
        assert_eq!(total, 4);
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let result = repo.update(User::test_user("ghost", UserRole::Student)).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}

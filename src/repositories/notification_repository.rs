use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::Notification,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: Notification) -> AppResult<Notification>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Notification>>;
    /// Newest first.
    async fn list_for_user(&self, user_id: &str, unread_only: bool) -> AppResult<Vec<Notification>>;
    async fn update(&self, notification: Notification) -> AppResult<Notification>;
    /// Returns how many notifications changed.
    async fn mark_all_read(&self, user_id: &str) -> AppResult<usize>;
}

#[derive(Default)]
pub struct InMemoryNotificationRepository {
    notifications: Arc<RwLock<HashMap<String, Notification>>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn create(&self, notification: Notification) -> AppResult<Notification> {
        let mut notifications = self.notifications.write().await;
        if notifications.contains_key(&notification.id) {
            return Err(AppError::AlreadyExists(format!(
                "Notification with id '{}' already exists",
                notification.id
            )));
        }

        notifications.insert(notification.id.clone(), notification.clone());
        Ok(notification)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &str, unread_only: bool) -> AppResult<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        let mut items: Vec<_> = notifications
            .values()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn update(&self, notification: Notification) -> AppResult<Notification> {
        let mut notifications = self.notifications.write().await;
        if !notifications.contains_key(&notification.id) {
            return Err(AppError::NotFound(format!(
                "Notification with id '{}' not found",
                notification.id
            )));
        }

        notifications.insert(notification.id.clone(), notification.clone());
        Ok(notification)
    }

    async fn mark_all_read(&self, user_id: &str) -> AppResult<usize> {
        let mut notifications = self.notifications.write().await;
        let mut changed = 0;
        for notification in notifications
            .values_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            notification.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::NotificationKind;

    #[tokio::test]
    async fn unread_filter_and_mark_all_read() {
        let repo = InMemoryNotificationRepository::new();
        for title in ["one", "two"] {
            repo.create(Notification::new("u1", NotificationKind::QuizPublished, title, "m"))
                .await
                .expect("created");
        }
        repo.create(Notification::new("u2", NotificationKind::QuizPublished, "x", "m"))
            .await
            .expect("created");

        assert_eq!(repo.list_for_user("u1", true).await.expect("list").len(), 2);
        assert_eq!(repo.mark_all_read("u1").await.expect("mark"), 2);
        assert_eq!(repo.mark_all_read("u1").await.expect("mark"), 0);
        assert!(repo.list_for_user("u1", true).await.expect("list").is_empty());
        assert_eq!(repo.list_for_user("u1", false).await.expect("list").len(), 2);
        assert_eq!(repo.list_for_user("u2", true).await.expect("list").len(), 1);
    }
}

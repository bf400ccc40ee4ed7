use std::sync::Arc;

use futures::future::try_join_all;

use crate::{
    auth::require_active,
    errors::{AppError, AppResult},
    models::domain::{Notification, NotificationKind, User},
    repositories::NotificationRepository,
};

/// Per-user notification inbox. Delivery (push, e-mail) is left to whoever
/// consumes the stored notifications.
pub struct NotificationService {
    repository: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(repository: Arc<dyn NotificationRepository>) -> Self {
        Self { repository }
    }

    pub async fn notify(
        &self,
        user_id: &str,
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) -> AppResult<Notification> {
        log::debug!("Notifying user {} ({:?})", user_id, kind);
        self.repository
            .create(Notification::new(user_id, kind, title, message))
            .await
    }

    pub async fn notify_many(
        &self,
        user_ids: &[String],
        kind: NotificationKind,
        title: &str,
        message: &str,
    ) -> AppResult<Vec<Notification>> {
        let created = try_join_all(
            user_ids
                .iter()
                .map(|user_id| self.notify(user_id, kind, title, message)),
        )
        .await?;

        log::info!("Sent {:?} notification to {} users", kind, created.len());
        Ok(created)
    }

    pub async fn list_for_user(&self, actor: &User, unread_only: bool) -> AppResult<Vec<Notification>> {
        require_active(actor)?;
        self.repository.list_for_user(&actor.id, unread_only).await
    }

    pub async fn unread_count(&self, actor: &User) -> AppResult<usize> {
        Ok(self.list_for_user(actor, true).await?.len())
    }

    pub async fn mark_read(&self, actor: &User, notification_id: &str) -> AppResult<Notification> {
        require_active(actor)?;
        let mut notification = self
            .repository
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Notification with id '{}' not found",
                    notification_id
                ))
            })?;

        if notification.user_id != actor.id {
            return Err(AppError::Forbidden(
                "You can only update your own notifications".to_string(),
            ));
        }
        if notification.is_read {
            return Ok(notification);
        }

        notification.is_read = true;
        self.repository.update(notification).await
    }

    pub async fn mark_all_read(&self, actor: &User) -> AppResult<usize> {
        require_active(actor)?;
        self.repository.mark_all_read(&actor.id).await
    }
}

//! Notification cache loads and read-state updates.

use super::{ClientStore, StoreError};

impl ClientStore {
    /// Refresh the signed-in user's notifications. Skipped when signed out;
    /// resets to empty when the fetch fails.
    pub(crate) async fn load_notifications(&self) {
        let user_id = match self.state().current_user_id.clone() {
            Some(id) => id,
            None => return,
        };

        match self.inner.api.notifications(&user_id).await {
            Ok(notifications) => self.commit(|state| state.notifications = notifications),
            Err(e) => {
                tracing::warn!("Failed to load notifications: {}", e);
                self.commit(|state| state.notifications = Vec::new());
            }
        }
    }

    /// Mark one notification as read, server first, then in the cache.
    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<(), StoreError> {
        match self.inner.api.mark_notification_read(notification_id).await {
            Ok(()) => {
                self.commit(|state| {
                    if let Some(notification) = state
                        .notifications
                        .iter_mut()
                        .find(|n| n.id == notification_id)
                    {
                        notification.read = true;
                    }
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to mark notification {} as read: {}",
                    notification_id,
                    e
                );
                Err(e.into())
            }
        }
    }

    /// Mark all of the signed-in user's notifications as read.
    pub async fn mark_all_notifications_read(&self) -> Result<(), StoreError> {
        let user_id = match self.state().current_user_id.clone() {
            Some(id) => id,
            None => return Err(StoreError::NotAuthenticated),
        };

        match self.inner.api.mark_all_notifications_read(&user_id).await {
            Ok(()) => {
                self.commit(|state| {
                    for notification in state.notifications.iter_mut() {
                        notification.read = true;
                    }
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to mark all notifications as read: {}", e);
                Err(e.into())
            }
        }
    }
}

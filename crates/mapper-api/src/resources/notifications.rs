// Notification endpoints
//
// Live delivery goes over the websocket in `socket.rs`; these cover the
// stored inbox and per-user settings.

use serde::Serialize;
use tracing::debug;

use super::segment;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::types::{
    Notification, NotificationFilter, NotificationPage, NotificationSettings, UnreadCount,
};

impl ApiClient {
    /// `GET /notifications?page=&limit=[&type=&severity=&isRead=&category=]`
    pub async fn list_notifications(
        &self,
        filter: &NotificationFilter,
    ) -> ApiResult<NotificationPage> {
        self.get_with_query("notifications", filter).await
    }

    /// `GET /notifications/{id}`
    pub async fn get_notification(&self, id: &str) -> ApiResult<Notification> {
        self.get(&format!("notifications/{}", segment(id))).await
    }

    /// `POST /notifications`
    pub async fn create_notification<B>(&self, notification: &B) -> ApiResult<Notification>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post("notifications", notification).await
    }

    /// `DELETE /notifications/{id}`
    pub async fn delete_notification(&self, id: &str) -> ApiResult<()> {
        self.delete_unit(&format!("notifications/{}", segment(id)))
            .await
    }

    // ── Read state ───────────────────────────────────────────────────

    /// `PUT /notifications/{id}/read`
    pub async fn mark_notification_read(&self, id: &str) -> ApiResult<Notification> {
        self.put_empty(&format!("notifications/{}/read", segment(id)))
            .await
    }

    /// `PUT /notifications/{id}/unread`
    pub async fn mark_notification_unread(&self, id: &str) -> ApiResult<Notification> {
        self.put_empty(&format!("notifications/{}/unread", segment(id)))
            .await
    }

    /// `PUT /notifications/mark-all-read`
    pub async fn mark_all_notifications_read(&self) -> ApiResult<()> {
        debug!("marking all notifications read");
        self.put_unit::<()>("notifications/mark-all-read", None).await
    }

    /// `DELETE /notifications/delete-all-read`
    pub async fn delete_read_notifications(&self) -> ApiResult<()> {
        self.delete_unit("notifications/delete-all-read").await
    }

    /// `GET /notifications/unread-count`
    pub async fn unread_notification_count(&self) -> ApiResult<UnreadCount> {
        self.get("notifications/unread-count").await
    }

    // ── Settings and actions ─────────────────────────────────────────

    /// `GET /notifications/settings`
    pub async fn notification_settings(&self) -> ApiResult<NotificationSettings> {
        self.get("notifications/settings").await
    }

    /// `PUT /notifications/settings`
    pub async fn update_notification_settings(
        &self,
        settings: &NotificationSettings,
    ) -> ApiResult<()> {
        self.put_unit("notifications/settings", Some(settings)).await
    }

    /// Trigger one of the actions attached to a notification.
    ///
    /// `POST /notifications/{id}/actions/{actionId}`
    pub async fn execute_notification_action(&self, id: &str, action_id: &str) -> ApiResult<()> {
        debug!(id, action_id, "executing notification action");
        self.post_unit::<()>(
            &format!(
                "notifications/{}/actions/{}",
                segment(id),
                segment(action_id)
            ),
            None,
        )
        .await
    }
}

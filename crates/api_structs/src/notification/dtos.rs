use creneau_domain::{Notification, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDTO {
    pub id: ID,
    pub participant_id: ID,
    pub booking_id: Option<ID>,
    pub kind: String,
    pub subject: String,
    pub status: String,
    pub error: Option<String>,
    pub created: i64,
    pub sent_at: Option<i64>,
}

impl NotificationDTO {
    pub fn new(notification: Notification) -> Self {
        Self {
            id: notification.id,
            participant_id: notification.participant_id,
            booking_id: notification.booking_id,
            kind: notification.kind.to_string(),
            subject: notification.subject,
            status: notification.status.as_str().to_string(),
            error: notification.error,
            created: notification.created,
            sent_at: notification.sent_at,
        }
    }
}

use super::INotificationRepo;
use crate::repos::shared::inmemory_repo::*;
use creneau_domain::{Notification, NotificationKind, NotificationStatus, ID};
use std::sync::Mutex;

pub struct InMemoryNotificationRepo {
    notifications: Mutex<Vec<Notification>>,
}

impl InMemoryNotificationRepo {
    pub fn new() -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl INotificationRepo for InMemoryNotificationRepo {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        insert(notification, &self.notifications);
        Ok(())
    }

    async fn save(&self, notification: &Notification) -> anyhow::Result<()> {
        save(notification, &self.notifications);
        Ok(())
    }

    async fn find(&self, notification_id: &ID) -> Option<Notification> {
        find(notification_id, &self.notifications)
    }

    async fn find_by_booking(&self, booking_id: &ID) -> Vec<Notification> {
        find_by(&self.notifications, |n| n.booking_id == Some(*booking_id))
    }

    async fn find_by_participant(&self, participant_id: &ID) -> Vec<Notification> {
        find_by(&self.notifications, |n| n.participant_id == *participant_id)
    }

    async fn find_sent_reminder(&self, booking_id: &ID) -> Option<Notification> {
        find_by(&self.notifications, |n| {
            n.booking_id == Some(*booking_id)
                && n.kind == NotificationKind::Reminder
                && n.status == NotificationStatus::Sent
        })
        .into_iter()
        .next()
    }
}

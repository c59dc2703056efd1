mod inmemory;
mod postgres;

use creneau_domain::{Notification, ID};
pub use inmemory::InMemoryNotificationRepo;
pub use postgres::PostgresNotificationRepo;

#[async_trait::async_trait]
pub trait INotificationRepo: Send + Sync {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()>;
    async fn save(&self, notification: &Notification) -> anyhow::Result<()>;
    async fn find(&self, notification_id: &ID) -> Option<Notification>;
    async fn find_by_booking(&self, booking_id: &ID) -> Vec<Notification>;
    async fn find_by_participant(&self, participant_id: &ID) -> Vec<Notification>;
    /// A reminder for the booking that was successfully delivered
    async fn find_sent_reminder(&self, booking_id: &ID) -> Option<Notification>;
}

mod inmemory;
mod postgres;

use creneau_domain::{Slot, ID};
pub use inmemory::InMemorySlotRepo;
pub use postgres::PostgresSlotRepo;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlotStoreError {
    #[error("The slot has {0} confirmed bookings and its capacity cannot go below that")]
    CapacityBelowBookings(i64),
    #[error("The slot still has confirmed bookings")]
    HasConfirmedBookings,
    #[error("The slot was not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[async_trait::async_trait]
pub trait ISlotRepo: Send + Sync {
    async fn bulk_insert(&self, slots: &[Slot]) -> anyhow::Result<()>;
    async fn find(&self, slot_id: &ID) -> Option<Slot>;
    async fn find_many(&self, slot_ids: &[ID]) -> Vec<Slot>;
    async fn find_by_campaign(&self, campaign_id: &ID) -> Vec<Slot>;
    /// Writes the schedule, location, segment and capacity of the slot,
    /// provided its capacity stays at or above the number of confirmed
    /// bookings on it. The manual lock flag is left as stored. Returns the
    /// stored slot.
    async fn update(&self, slot: &Slot) -> Result<Slot, SlotStoreError>;
    async fn set_locked(&self, slot_id: &ID, locked: bool) -> Result<Slot, SlotStoreError>;
    /// Deletes a slot that has no confirmed booking, together with its
    /// cancelled bookings
    async fn delete(&self, slot_id: &ID) -> Result<Slot, SlotStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CreneauContext;
    use chrono::{NaiveDate, NaiveTime};
    use creneau_domain::{Booking, Campaign, Participant, Positioning, TimeWindow};

    fn slot(campaign: &Campaign, capacity: i64) -> Slot {
        Slot::new(
            campaign.id,
            NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            TimeWindow::new(
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            ),
            capacity,
            "Salle 1",
            None,
        )
    }

    fn campaign() -> Campaign {
        Campaign::new(
            "Migration",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
    }

    #[tokio::test]
    async fn finds_slots_of_campaign() {
        let ctx = CreneauContext::create_inmemory();
        let c1 = campaign();
        let c2 = campaign();
        let slots = vec![slot(&c1, 1), slot(&c1, 2), slot(&c2, 1)];
        ctx.repos.slots.bulk_insert(&slots).await.unwrap();

        assert_eq!(ctx.repos.slots.find_by_campaign(&c1.id).await.len(), 2);
        assert_eq!(ctx.repos.slots.find_by_campaign(&c2.id).await.len(), 1);
        assert_eq!(
            ctx.repos.slots.find_many(&[slots[0].id, slots[2].id]).await.len(),
            2
        );
    }

    #[tokio::test]
    async fn capacity_cannot_drop_below_confirmed_bookings() {
        let ctx = CreneauContext::create_inmemory();
        let campaign = campaign();
        let mut slot = slot(&campaign, 2);
        ctx.repos.slots.bulk_insert(&[slot.clone()]).await.unwrap();
        for name in ["Alice", "Bob"] {
            let participant = Participant::new(name, "IT");
            let booking = Booking::new(participant.id, &slot, Positioning::SelfService, 0);
            ctx.repos.bookings.insert_confirmed(&booking).await.unwrap();
        }

        slot.capacity = 1;
        assert!(matches!(
            ctx.repos.slots.update(&slot).await,
            Err(SlotStoreError::CapacityBelowBookings(2))
        ));
        slot.capacity = 3;
        slot.location = "Salle 2".into();
        assert!(ctx.repos.slots.update(&slot).await.is_ok());
        assert_eq!(ctx.repos.slots.find(&slot.id).await, Some(slot));
    }

    #[tokio::test]
    async fn update_keeps_manual_lock() {
        let ctx = CreneauContext::create_inmemory();
        let campaign = campaign();
        let slot = slot(&campaign, 2);
        ctx.repos.slots.bulk_insert(&[slot.clone()]).await.unwrap();

        let stale = slot.clone();
        let locked = ctx.repos.slots.set_locked(&slot.id, true).await.unwrap();
        assert!(locked.locked);

        let mut edit = stale;
        edit.location = "Salle 2".into();
        let stored = ctx.repos.slots.update(&edit).await.unwrap();
        assert!(stored.locked);
        assert_eq!(stored.location, "Salle 2");
        assert_eq!(ctx.repos.slots.find(&slot.id).await, Some(stored));

        assert!(matches!(
            ctx.repos.slots.set_locked(&ID::default(), true).await,
            Err(SlotStoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn deletes_only_slots_without_confirmed_bookings() {
        let ctx = CreneauContext::create_inmemory();
        let campaign = campaign();
        let slot = slot(&campaign, 1);
        ctx.repos.slots.bulk_insert(&[slot.clone()]).await.unwrap();
        let participant = Participant::new("Alice", "IT");
        let booking = Booking::new(participant.id, &slot, Positioning::SelfService, 0);
        ctx.repos.bookings.insert_confirmed(&booking).await.unwrap();

        assert!(matches!(
            ctx.repos.slots.delete(&slot.id).await,
            Err(SlotStoreError::HasConfirmedBookings)
        ));

        ctx.repos.bookings.cancel(&booking.id, 1).await.unwrap();
        assert!(ctx.repos.slots.delete(&slot.id).await.is_ok());
        assert!(ctx.repos.slots.find(&slot.id).await.is_none());
        assert!(ctx.repos.bookings.find(&booking.id).await.is_none());
        assert!(matches!(
            ctx.repos.slots.delete(&slot.id).await,
            Err(SlotStoreError::NotFound)
        ));
    }
}

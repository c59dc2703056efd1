use super::{ISlotRepo, SlotStoreError};
use crate::repos::shared::{inmemory_repo::*, inmemory_scheduling::InMemorySchedulingState};
use creneau_domain::{Slot, ID};
use std::sync::Arc;

pub struct InMemorySlotRepo {
    state: Arc<InMemorySchedulingState>,
}

impl InMemorySlotRepo {
    pub fn new(state: Arc<InMemorySchedulingState>) -> Self {
        Self { state }
    }
}

#[async_trait::async_trait]
impl ISlotRepo for InMemorySlotRepo {
    async fn bulk_insert(&self, slots: &[Slot]) -> anyhow::Result<()> {
        bulk_insert(slots, self.state.slots());
        Ok(())
    }

    async fn find(&self, slot_id: &ID) -> Option<Slot> {
        find(slot_id, self.state.slots())
    }

    async fn find_many(&self, slot_ids: &[ID]) -> Vec<Slot> {
        find_many(slot_ids, self.state.slots())
    }

    async fn find_by_campaign(&self, campaign_id: &ID) -> Vec<Slot> {
        find_by(self.state.slots(), |s| s.campaign_id == *campaign_id)
    }

    async fn update(&self, slot: &Slot) -> Result<Slot, SlotStoreError> {
        let mut guard = self.state.lock();
        let confirmed = guard.confirmed_count(&slot.id);
        let stored = guard
            .slots
            .iter_mut()
            .find(|s| s.id == slot.id)
            .ok_or(SlotStoreError::NotFound)?;
        if slot.capacity < confirmed {
            return Err(SlotStoreError::CapacityBelowBookings(confirmed));
        }
        stored.segment = slot.segment.clone();
        stored.location = slot.location.clone();
        stored.date = slot.date;
        stored.start_time = slot.start_time;
        stored.end_time = slot.end_time;
        stored.capacity = slot.capacity;
        Ok(stored.clone())
    }

    async fn set_locked(&self, slot_id: &ID, locked: bool) -> Result<Slot, SlotStoreError> {
        let mut guard = self.state.lock();
        let stored = guard
            .slots
            .iter_mut()
            .find(|s| s.id == *slot_id)
            .ok_or(SlotStoreError::NotFound)?;
        stored.locked = locked;
        Ok(stored.clone())
    }

    async fn delete(&self, slot_id: &ID) -> Result<Slot, SlotStoreError> {
        let mut guard = self.state.lock();
        let index = guard
            .slots
            .iter()
            .position(|s| s.id == *slot_id)
            .ok_or(SlotStoreError::NotFound)?;
        if guard.confirmed_count(slot_id) > 0 {
            return Err(SlotStoreError::HasConfirmedBookings);
        }
        guard.bookings.retain(|b| b.slot_id != *slot_id);
        Ok(guard.slots.remove(index))
    }
}

use super::{BookingStoreError, IBookingRepo};
use crate::repos::shared::{inmemory_repo::*, inmemory_scheduling::InMemorySchedulingState};
use chrono::NaiveDate;
use creneau_domain::{Booking, BookingStatus, Positioning, ID};
use std::{collections::HashMap, sync::Arc};

pub struct InMemoryBookingRepo {
    state: Arc<InMemorySchedulingState>,
}

impl InMemoryBookingRepo {
    pub fn new(state: Arc<InMemorySchedulingState>) -> Self {
        Self { state }
    }
}

#[async_trait::async_trait]
impl IBookingRepo for InMemoryBookingRepo {
    async fn insert_confirmed(&self, booking: &Booking) -> Result<(), BookingStoreError> {
        let mut guard = self.state.lock();
        let slot = guard
            .slot(&booking.slot_id)
            .ok_or(BookingStoreError::SlotNotFound)?;
        let (capacity, locked) = (slot.capacity, slot.locked);
        let already_booked = guard.bookings.iter().any(|b| {
            b.is_confirmed()
                && b.participant_id == booking.participant_id
                && b.campaign_id == booking.campaign_id
        });
        if already_booked {
            return Err(BookingStoreError::AlreadyBooked);
        }
        if locked {
            return Err(BookingStoreError::SlotLocked);
        }
        if guard.confirmed_count(&booking.slot_id) >= capacity {
            return Err(BookingStoreError::SlotFull);
        }

        let mut booking = booking.clone();
        booking.status = BookingStatus::Confirmed;
        guard.bookings.push(booking);
        Ok(())
    }

    async fn move_to_slot(
        &self,
        booking_id: &ID,
        slot_id: &ID,
        positioning: Positioning,
        now: i64,
    ) -> Result<Booking, BookingStoreError> {
        let mut guard = self.state.lock();
        let current = guard
            .bookings
            .iter()
            .find(|b| b.id == *booking_id)
            .ok_or(BookingStoreError::BookingNotFound)?;
        if !current.is_confirmed() {
            return Err(BookingStoreError::NotConfirmed);
        }
        let already_there = current.slot_id == *slot_id;
        let current_locked = guard.slot(&current.slot_id).map_or(false, |s| s.locked);
        let target = guard.slot(slot_id).ok_or(BookingStoreError::SlotNotFound)?;
        if current_locked || target.locked {
            return Err(BookingStoreError::SlotLocked);
        }
        let capacity = target.capacity;
        if !already_there && guard.confirmed_count(slot_id) >= capacity {
            return Err(BookingStoreError::SlotFull);
        }

        let booking = guard
            .bookings
            .iter_mut()
            .find(|b| b.id == *booking_id)
            .ok_or(BookingStoreError::BookingNotFound)?;
        booking.slot_id = *slot_id;
        booking.positioning = positioning;
        booking.updated = now;
        Ok(booking.clone())
    }

    async fn cancel(&self, booking_id: &ID, now: i64) -> Result<Booking, BookingStoreError> {
        let mut guard = self.state.lock();
        let slot_id = guard
            .bookings
            .iter()
            .find(|b| b.id == *booking_id)
            .ok_or(BookingStoreError::BookingNotFound)?
            .slot_id;
        if guard.slot(&slot_id).map_or(false, |s| s.locked) {
            return Err(BookingStoreError::SlotLocked);
        }
        let booking = guard
            .bookings
            .iter_mut()
            .find(|b| b.id == *booking_id)
            .ok_or(BookingStoreError::BookingNotFound)?;
        if !booking.is_confirmed() {
            return Err(BookingStoreError::NotConfirmed);
        }
        booking.status = BookingStatus::Cancelled;
        booking.updated = now;
        Ok(booking.clone())
    }

    async fn find(&self, booking_id: &ID) -> Option<Booking> {
        find(booking_id, self.state.bookings())
    }

    async fn find_by_participant(&self, participant_id: &ID) -> Vec<Booking> {
        find_by(self.state.bookings(), |b| b.participant_id == *participant_id)
    }

    async fn find_confirmed_by_participant(
        &self,
        participant_id: &ID,
        campaign_id: &ID,
    ) -> Option<Booking> {
        find_by(self.state.bookings(), |b| {
            b.is_confirmed() && b.participant_id == *participant_id && b.campaign_id == *campaign_id
        })
        .into_iter()
        .next()
    }

    async fn find_confirmed_by_campaign(&self, campaign_id: &ID) -> Vec<Booking> {
        find_by(self.state.bookings(), |b| {
            b.is_confirmed() && b.campaign_id == *campaign_id
        })
    }

    async fn count_confirmed_by_slots(&self, slot_ids: &[ID]) -> anyhow::Result<HashMap<ID, i64>> {
        let mut counts = HashMap::new();
        for booking in find_by(self.state.bookings(), |b| {
            b.is_confirmed() && slot_ids.contains(&b.slot_id)
        }) {
            *counts.entry(booking.slot_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn find_confirmed_in_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Booking> {
        let guard = self.state.lock();
        guard
            .bookings
            .iter()
            .filter(|b| b.is_confirmed())
            .filter(|b| match guard.slot(&b.slot_id) {
                Some(slot) => slot.date >= start && slot.date <= end,
                None => false,
            })
            .cloned()
            .collect()
    }
}

mod inmemory;
mod postgres;

use chrono::NaiveDate;
use creneau_domain::{Booking, Positioning, ID};
pub use inmemory::InMemoryBookingRepo;
pub use postgres::PostgresBookingRepo;
use std::collections::HashMap;
use thiserror::Error;

/// Rejections of the capacity guarded booking writes. A constraint violation
/// detected by the storage is reported with the same variant as the
/// corresponding check.
#[derive(Debug, Error)]
pub enum BookingStoreError {
    #[error("The slot is full")]
    SlotFull,
    #[error("The participant already has a confirmed booking in this campaign")]
    AlreadyBooked,
    #[error("The slot is locked")]
    SlotLocked,
    #[error("The booking is not confirmed")]
    NotConfirmed,
    #[error("The booking was not found")]
    BookingNotFound,
    #[error("The slot was not found")]
    SlotNotFound,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[async_trait::async_trait]
pub trait IBookingRepo: Send + Sync {
    /// Inserts a confirmed booking if its participant has no other confirmed
    /// booking in the campaign and its slot is not manually locked and has
    /// room left, as one atomic unit
    async fn insert_confirmed(&self, booking: &Booking) -> Result<(), BookingStoreError>;
    /// Repoints a confirmed booking to `slot_id` if that slot has room left
    /// and neither slot is manually locked, keeping the booking identity
    async fn move_to_slot(
        &self,
        booking_id: &ID,
        slot_id: &ID,
        positioning: Positioning,
        now: i64,
    ) -> Result<Booking, BookingStoreError>;
    /// Cancels a confirmed booking whose slot is not manually locked
    async fn cancel(&self, booking_id: &ID, now: i64) -> Result<Booking, BookingStoreError>;
    async fn find(&self, booking_id: &ID) -> Option<Booking>;
    async fn find_by_participant(&self, participant_id: &ID) -> Vec<Booking>;
    async fn find_confirmed_by_participant(
        &self,
        participant_id: &ID,
        campaign_id: &ID,
    ) -> Option<Booking>;
    async fn find_confirmed_by_campaign(&self, campaign_id: &ID) -> Vec<Booking>;
    async fn count_confirmed_by_slots(&self, slot_ids: &[ID]) -> anyhow::Result<HashMap<ID, i64>>;
    /// Confirmed bookings whose slot date is within `[start, end]`
    async fn find_confirmed_in_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Booking>;
}

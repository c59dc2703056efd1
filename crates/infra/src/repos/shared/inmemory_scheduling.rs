use creneau_domain::{Booking, Slot, ID};
use std::sync::{Mutex, MutexGuard};

/// Slots and bookings shared by the inmemory slot and booking repositories.
///
/// Capacity checks need both collections in one critical section. The
/// bookings are always locked before the slots so that the two repositories
/// can never deadlock each other.
#[derive(Default)]
pub struct InMemorySchedulingState {
    bookings: Mutex<Vec<Booking>>,
    slots: Mutex<Vec<Slot>>,
}

pub struct SchedulingGuard<'a> {
    pub bookings: MutexGuard<'a, Vec<Booking>>,
    pub slots: MutexGuard<'a, Vec<Slot>>,
}

impl InMemorySchedulingState {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn lock(&self) -> SchedulingGuard<'_> {
        let bookings = self.bookings.lock().unwrap();
        let slots = self.slots.lock().unwrap();
        SchedulingGuard { bookings, slots }
    }

    pub fn bookings(&self) -> &Mutex<Vec<Booking>> {
        &self.bookings
    }

    pub fn slots(&self) -> &Mutex<Vec<Slot>> {
        &self.slots
    }
}

impl<'a> SchedulingGuard<'a> {
    pub fn confirmed_count(&self, slot_id: &ID) -> i64 {
        self.bookings
            .iter()
            .filter(|b| b.slot_id == *slot_id && b.is_confirmed())
            .count() as i64
    }

    pub fn slot(&self, slot_id: &ID) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == *slot_id)
    }
}

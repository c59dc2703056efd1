mod actor;
mod booking;
mod campaign;
pub mod date;
mod export;
mod notification;
mod participant;
mod policy;
mod shared;
mod slot;
pub mod slot_generator;

pub use actor::{resolve_standing, Actor, ActorStanding, CoordinatorPerimeter, InternalActor};
pub use booking::{Booking, BookingStatus, Positioning};
pub use campaign::Campaign;
pub use export::{export_filename, to_csv, BookingExportRow, EXPORT_COLUMNS};
pub use notification::{Notification, NotificationContent, NotificationKind, NotificationStatus};
pub use participant::Participant;
pub use policy::{Permission, Policy};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use slot::{
    group_available_slots, AvailableSlot, AvailableSlotsDate, Slot, TimeWindow,
    DEFAULT_LOCK_WINDOW_DAYS,
};
pub use slot_generator::{generate_slots, split_around_lunch, InvalidRangeError, SlotGenerationOptions};

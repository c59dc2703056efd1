use crate::shared::entity::{Entity, ID};
use chrono::NaiveDate;

/// A time-boxed operational effort grouping `Slot`s and `Booking`s.
///
/// `Campaign`s are managed elsewhere, the booking engine only reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    pub id: ID,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// An archived `Campaign` is read-only: none of its `Slot`s or `Booking`s
    /// may be mutated anymore
    pub archived: bool,
}

impl Campaign {
    pub fn new(name: &str, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: Default::default(),
            name: name.to_string(),
            start_date,
            end_date,
            archived: false,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.archived
    }
}

impl Entity for Campaign {
    fn id(&self) -> &ID {
        &self.id
    }
}

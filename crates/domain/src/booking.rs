use crate::shared::entity::{Entity, ID};
use crate::slot::Slot;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    /// Terminal, a new `Booking` is needed to book again
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown booking status: {}", s)),
        }
    }
}

/// Who positioned the participant on its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Positioning {
    SelfService,
    /// `actor_id` is set when the manager acted through an internal account
    Manager {
        manager_id: ID,
        actor_id: Option<ID>,
    },
    Coordinator {
        actor_id: ID,
    },
}

impl Positioning {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SelfService => "self",
            Self::Manager { .. } => "manager",
            Self::Coordinator { .. } => "coordinator",
        }
    }

    /// The internal actor who performed a third-party booking
    pub fn internal_actor(&self) -> Option<&ID> {
        match self {
            Self::SelfService => None,
            Self::Manager { actor_id, .. } => actor_id.as_ref(),
            Self::Coordinator { actor_id } => Some(actor_id),
        }
    }

    pub fn is_self(&self) -> bool {
        matches!(self, Self::SelfService)
    }
}

/// Association of one `Participant` to one `Slot` within a `Campaign`.
///
/// At most one confirmed `Booking` exists per participant and campaign,
/// cancelled ones are kept for history.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: ID,
    pub participant_id: ID,
    pub slot_id: ID,
    pub campaign_id: ID,
    pub positioning: Positioning,
    pub status: BookingStatus,
    pub created: i64,
    pub updated: i64,
}

impl Booking {
    pub fn new(participant_id: ID, slot: &Slot, positioning: Positioning, now: i64) -> Self {
        Self {
            id: Default::default(),
            participant_id,
            slot_id: slot.id,
            campaign_id: slot.campaign_id,
            positioning,
            status: BookingStatus::Confirmed,
            created: now,
            updated: now,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

impl Entity for Booking {
    fn id(&self) -> &ID {
        &self.id
    }
}

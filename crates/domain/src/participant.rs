use crate::shared::entity::{Entity, ID};
use creneau_utils::create_access_token;

/// The person (agent) who can hold a `Booking`.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: ID,
    pub display_name: String,
    pub email: Option<String>,
    pub service: String,
    pub site: Option<String>,
    /// The supervising `Participant`. Only one level of hierarchy is honored.
    pub manager_id: Option<ID>,
    /// Deactivated participants keep their bookings but cannot book anymore
    pub active: bool,
    /// Personal token used for self-service access without an account
    pub access_token: String,
}

impl Participant {
    pub fn new(display_name: &str, service: &str) -> Self {
        Self {
            id: Default::default(),
            display_name: display_name.to_string(),
            email: None,
            service: service.to_string(),
            site: None,
            manager_id: None,
            active: true,
            access_token: create_access_token(),
        }
    }

    /// The manager of this participant, an accidental self reference is ignored
    pub fn manager(&self) -> Option<&ID> {
        self.manager_id.as_ref().filter(|manager_id| **manager_id != self.id)
    }
}

impl Entity for Participant {
    fn id(&self) -> &ID {
        &self.id
    }
}

use crate::dtos::NotificationDTO;
use creneau_domain::{Notification, ID};
use serde::{Deserialize, Serialize};

pub mod invite_participants {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub campaign_id: ID,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub participant_ids: Vec<ID>,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub notifications: Vec<NotificationDTO>,
        /// Unknown or inactive participants that were not invited
        pub skipped: Vec<ID>,
    }

    impl APIResponse {
        pub fn new(notifications: Vec<Notification>, skipped: Vec<ID>) -> Self {
            Self {
                notifications: notifications.into_iter().map(NotificationDTO::new).collect(),
                skipped,
            }
        }
    }
}

use super::IParticipantRepo;
use crate::repos::shared::inmemory_repo::*;
use creneau_domain::{Participant, ID};
use std::sync::Mutex;

pub struct InMemoryParticipantRepo {
    participants: Mutex<Vec<Participant>>,
}

impl InMemoryParticipantRepo {
    pub fn new() -> Self {
        Self {
            participants: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IParticipantRepo for InMemoryParticipantRepo {
    async fn insert(&self, participant: &Participant) -> anyhow::Result<()> {
        insert(participant, &self.participants);
        Ok(())
    }

    async fn save(&self, participant: &Participant) -> anyhow::Result<()> {
        save(participant, &self.participants);
        Ok(())
    }

    async fn find(&self, participant_id: &ID) -> Option<Participant> {
        find(participant_id, &self.participants)
    }

    async fn find_many(&self, participant_ids: &[ID]) -> Vec<Participant> {
        find_many(participant_ids, &self.participants)
    }

    async fn find_active_by_access_token(&self, access_token: &str) -> Option<Participant> {
        find_by(&self.participants, |p| p.active && p.access_token == access_token)
            .into_iter()
            .next()
    }
}

mod inmemory;
mod postgres;

use creneau_domain::{Participant, ID};
pub use inmemory::InMemoryParticipantRepo;
pub use postgres::PostgresParticipantRepo;

#[async_trait::async_trait]
pub trait IParticipantRepo: Send + Sync {
    async fn insert(&self, participant: &Participant) -> anyhow::Result<()>;
    async fn save(&self, participant: &Participant) -> anyhow::Result<()>;
    async fn find(&self, participant_id: &ID) -> Option<Participant>;
    async fn find_many(&self, participant_ids: &[ID]) -> Vec<Participant>;
    /// Only active participants can be resolved from their access token
    async fn find_active_by_access_token(&self, access_token: &str) -> Option<Participant>;
}

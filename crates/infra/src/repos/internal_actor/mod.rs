mod inmemory;
mod postgres;

use creneau_domain::{InternalActor, ID};
pub use inmemory::InMemoryInternalActorRepo;
pub use postgres::PostgresInternalActorRepo;

#[async_trait::async_trait]
pub trait IInternalActorRepo: Send + Sync {
    async fn insert(&self, actor: &InternalActor) -> anyhow::Result<()>;
    async fn find(&self, actor_id: &ID) -> Option<InternalActor>;
    async fn find_by_api_key(&self, api_key: &str) -> Option<InternalActor>;
}

use super::IInternalActorRepo;
use crate::repos::shared::inmemory_repo::*;
use creneau_domain::{InternalActor, ID};
use std::sync::Mutex;

pub struct InMemoryInternalActorRepo {
    actors: Mutex<Vec<InternalActor>>,
}

impl InMemoryInternalActorRepo {
    pub fn new() -> Self {
        Self {
            actors: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IInternalActorRepo for InMemoryInternalActorRepo {
    async fn insert(&self, actor: &InternalActor) -> anyhow::Result<()> {
        insert(actor, &self.actors);
        Ok(())
    }

    async fn find(&self, actor_id: &ID) -> Option<InternalActor> {
        find(actor_id, &self.actors)
    }

    async fn find_by_api_key(&self, api_key: &str) -> Option<InternalActor> {
        find_by(&self.actors, |a| a.api_key == api_key)
            .into_iter()
            .next()
    }
}

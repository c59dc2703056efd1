use super::ICoordinatorPerimeterRepo;
use crate::repos::shared::inmemory_repo::*;
use creneau_domain::{CoordinatorPerimeter, ID};
use std::sync::Mutex;

pub struct InMemoryCoordinatorPerimeterRepo {
    perimeters: Mutex<Vec<CoordinatorPerimeter>>,
}

impl InMemoryCoordinatorPerimeterRepo {
    pub fn new() -> Self {
        Self {
            perimeters: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ICoordinatorPerimeterRepo for InMemoryCoordinatorPerimeterRepo {
    async fn insert(&self, perimeter: &CoordinatorPerimeter) -> anyhow::Result<()> {
        insert(perimeter, &self.perimeters);
        Ok(())
    }

    async fn find_by_actor(&self, actor_id: &ID) -> Vec<CoordinatorPerimeter> {
        find_by(&self.perimeters, |p| p.actor_id == *actor_id)
    }
}

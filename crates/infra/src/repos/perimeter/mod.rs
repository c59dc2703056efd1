mod inmemory;
mod postgres;

use creneau_domain::{CoordinatorPerimeter, ID};
pub use inmemory::InMemoryCoordinatorPerimeterRepo;
pub use postgres::PostgresCoordinatorPerimeterRepo;

/// Perimeters are provisioned outside of the booking engine which only reads them
#[async_trait::async_trait]
pub trait ICoordinatorPerimeterRepo: Send + Sync {
    async fn insert(&self, perimeter: &CoordinatorPerimeter) -> anyhow::Result<()>;
    async fn find_by_actor(&self, actor_id: &ID) -> Vec<CoordinatorPerimeter>;
}

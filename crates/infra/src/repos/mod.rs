mod booking;
mod campaign;
mod internal_actor;
mod notification;
mod participant;
mod perimeter;
mod shared;
mod slot;

pub use booking::{BookingStoreError, IBookingRepo};
use booking::{InMemoryBookingRepo, PostgresBookingRepo};
pub use campaign::ICampaignRepo;
use campaign::{InMemoryCampaignRepo, PostgresCampaignRepo};
pub use internal_actor::IInternalActorRepo;
use internal_actor::{InMemoryInternalActorRepo, PostgresInternalActorRepo};
pub use notification::INotificationRepo;
use notification::{InMemoryNotificationRepo, PostgresNotificationRepo};
pub use participant::IParticipantRepo;
use participant::{InMemoryParticipantRepo, PostgresParticipantRepo};
pub use perimeter::ICoordinatorPerimeterRepo;
use perimeter::{InMemoryCoordinatorPerimeterRepo, PostgresCoordinatorPerimeterRepo};
use shared::inmemory_scheduling::InMemorySchedulingState;
pub use slot::{ISlotRepo, SlotStoreError};
use slot::{InMemorySlotRepo, PostgresSlotRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub campaigns: Arc<dyn ICampaignRepo>,
    pub participants: Arc<dyn IParticipantRepo>,
    pub actors: Arc<dyn IInternalActorRepo>,
    pub perimeters: Arc<dyn ICoordinatorPerimeterRepo>,
    pub slots: Arc<dyn ISlotRepo>,
    pub bookings: Arc<dyn IBookingRepo>,
    pub notifications: Arc<dyn INotificationRepo>,
}

impl Repos {
    pub async fn create_postgres(
        connection_string: &str,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");
        Ok(Self {
            campaigns: Arc::new(PostgresCampaignRepo::new(pool.clone())),
            participants: Arc::new(PostgresParticipantRepo::new(pool.clone())),
            actors: Arc::new(PostgresInternalActorRepo::new(pool.clone())),
            perimeters: Arc::new(PostgresCoordinatorPerimeterRepo::new(pool.clone())),
            slots: Arc::new(PostgresSlotRepo::new(pool.clone())),
            bookings: Arc::new(PostgresBookingRepo::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        let scheduling = Arc::new(InMemorySchedulingState::new());
        Self {
            campaigns: Arc::new(InMemoryCampaignRepo::new()),
            participants: Arc::new(InMemoryParticipantRepo::new()),
            actors: Arc::new(InMemoryInternalActorRepo::new()),
            perimeters: Arc::new(InMemoryCoordinatorPerimeterRepo::new()),
            slots: Arc::new(InMemorySlotRepo::new(scheduling.clone())),
            bookings: Arc::new(InMemoryBookingRepo::new(scheduling)),
            notifications: Arc::new(InMemoryNotificationRepo::new()),
        }
    }
}

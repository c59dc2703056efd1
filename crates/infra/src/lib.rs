mod config;
mod repos;
mod services;
mod system;

use chrono::NaiveDate;
pub use config::Config;
use creneau_domain::date;
pub use repos::{
    BookingStoreError, IBookingRepo, ICampaignRepo, ICoordinatorPerimeterRepo,
    IInternalActorRepo, INotificationRepo, IParticipantRepo, ISlotRepo, Repos, SlotStoreError,
};
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticSys};

#[derive(Clone)]
pub struct CreneauContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub notifier: Arc<dyn INotificationSender>,
    pub audit: Arc<dyn IAuditSink>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

fn create_notifier(config: &Config) -> Arc<dyn INotificationSender> {
    match &config.notification_webhook_url {
        Some(url) => Arc::new(WebhookNotificationSender::new(url.clone())),
        None => Arc::new(LogNotificationSender {}),
    }
}

impl CreneauContext {
    async fn create(params: ContextParams) -> Self {
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        let config = Config::new();
        Self {
            repos,
            notifier: create_notifier(&config),
            config,
            sys: Arc::new(RealSys {}),
            audit: Arc::new(TracingAuditSink {}),
        }
    }

    /// Context backed by inmemory repositories, notifications go to the log
    pub fn create_inmemory() -> Self {
        let config = Config::new();
        Self {
            repos: Repos::create_inmemory(),
            notifier: Arc::new(LogNotificationSender {}),
            config,
            sys: Arc::new(RealSys {}),
            audit: Arc::new(TracingAuditSink {}),
        }
    }

    /// The current date in the configured timezone
    pub fn today(&self) -> NaiveDate {
        date::today(self.sys.get_timestamp_millis(), &self.config.timezone)
    }

    pub fn emit_audit(&self, who: String, what: String) {
        self.audit.emit(AuditEntry {
            who,
            what,
            when: self.sys.get_timestamp_millis(),
        });
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> CreneauContext {
    CreneauContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

fn get_psql_connection_string() -> String {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .unwrap_or_else(|_| panic!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&get_psql_connection_string())
        .await
        .expect("TO CONNECT TO POSTGRES");

    sqlx::migrate!().run(&pool).await
}

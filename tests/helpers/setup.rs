use chrono::{Duration, Utc};
use creneau_api::{Application, API_KEY_HEADER, PARTICIPANT_TOKEN_HEADER};
use creneau_domain::{Campaign, CoordinatorPerimeter, InternalActor, Participant, Policy};
use creneau_infra::CreneauContext;

pub struct TestApp {
    pub ctx: CreneauContext,
    pub address: String,
    pub client: reqwest::Client,
    pub campaign: Campaign,
    pub admin: InternalActor,
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    let mut ctx = CreneauContext::create_inmemory();
    ctx.config.port = 0; // Random port

    let today = Utc::now().date_naive();
    let campaign = Campaign::new(
        "Migration postes",
        today - Duration::days(1),
        today + Duration::days(90),
    );
    ctx.repos
        .campaigns
        .insert(&campaign)
        .await
        .expect("Expected to insert campaign");

    let mut admin = InternalActor::new("Administration");
    admin.policy = Policy::allow_all();
    ctx.repos
        .actors
        .insert(&admin)
        .await
        .expect("Expected to insert admin");

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}/api/v1", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        ctx,
        address,
        client: reqwest::Client::new(),
        campaign,
        admin,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn as_admin(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header(API_KEY_HEADER, &self.admin.api_key)
    }

    pub fn as_participant(
        &self,
        participant: &Participant,
        req: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        req.header(PARTICIPANT_TOKEN_HEADER, &participant.access_token)
    }

    pub async fn insert_participant(&self, name: &str, service: &str) -> Participant {
        let participant = Participant::new(name, service);
        self.ctx
            .repos
            .participants
            .insert(&participant)
            .await
            .expect("Expected to insert participant");
        participant
    }

    pub async fn insert_coordinator(&self, service: &str) -> InternalActor {
        let actor = InternalActor::new("Coordination");
        self.ctx
            .repos
            .actors
            .insert(&actor)
            .await
            .expect("Expected to insert coordinator");
        let perimeter = CoordinatorPerimeter::new(actor.id, service, None);
        self.ctx
            .repos
            .perimeters
            .insert(&perimeter)
            .await
            .expect("Expected to insert perimeter");
        actor
    }
}

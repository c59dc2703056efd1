use chrono::{Duration, NaiveDate, NaiveTime};
use creneau_domain::{
    Actor, Campaign, CoordinatorPerimeter, InternalActor, Participant, Policy, Slot, TimeWindow,
};
use creneau_infra::{
    CreneauContext, InMemoryAuditSink, InMemoryNotificationSender, StaticSys,
};
use std::sync::Arc;

/// Monday 2024-03-04 09:00 in Europe/Paris
pub const NOW: i64 = 1_709_539_200_000;

pub struct TestContext {
    pub ctx: CreneauContext,
    pub sender: Arc<InMemoryNotificationSender>,
    pub audit: Arc<InMemoryAuditSink>,
    pub campaign: Campaign,
}

pub async fn setup() -> TestContext {
    let mut ctx = CreneauContext::create_inmemory();
    let sender = Arc::new(InMemoryNotificationSender::new());
    let audit = Arc::new(InMemoryAuditSink::new());
    ctx.sys = Arc::new(StaticSys(NOW));
    ctx.notifier = sender.clone();
    ctx.audit = audit.clone();
    ctx.config.lock_window_days = 2;
    ctx.config.reminder_days_before = 1;
    ctx.config.timezone = chrono_tz::Europe::Paris;

    let campaign = Campaign::new(
        "Migration postes",
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
    );
    ctx.repos.campaigns.insert(&campaign).await.unwrap();

    TestContext {
        ctx,
        sender,
        audit,
        campaign,
    }
}

impl TestContext {
    pub fn today(&self) -> NaiveDate {
        self.ctx.today()
    }

    /// A 09:00 - 09:30 slot of the campaign, not stored
    pub fn slot_in_days(&self, days: i64) -> Slot {
        Slot::new(
            self.campaign.id,
            self.today() + Duration::days(days),
            TimeWindow::new(
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            ),
            1,
            "Salle 1",
            None,
        )
    }

    pub async fn insert_slot(&self, days: i64, capacity: i64) -> Slot {
        let mut slot = self.slot_in_days(days);
        slot.capacity = capacity;
        self.ctx.repos.slots.bulk_insert(&[slot.clone()]).await.unwrap();
        slot
    }

    pub async fn insert_participant(&self, name: &str, service: &str) -> Participant {
        let participant = Participant::new(name, service);
        self.ctx.repos.participants.insert(&participant).await.unwrap();
        participant
    }

    /// Internal actor allowed every administrative action
    pub async fn insert_admin(&self) -> InternalActor {
        let mut actor = InternalActor::new("Administration");
        actor.policy = Policy::allow_all();
        self.ctx.repos.actors.insert(&actor).await.unwrap();
        actor
    }

    /// Internal actor coordinating the given service
    pub async fn insert_coordinator(&self, service: &str) -> InternalActor {
        let actor = InternalActor::new("Coordination");
        self.ctx.repos.actors.insert(&actor).await.unwrap();
        let perimeter = CoordinatorPerimeter::new(actor.id, service, None);
        self.ctx.repos.perimeters.insert(&perimeter).await.unwrap();
        actor
    }

    pub async fn archive_campaign(&mut self) {
        self.campaign.archived = true;
        self.ctx.repos.campaigns.save(&self.campaign).await.unwrap();
    }
}

pub fn as_actor(participant: &Participant) -> Actor {
    Actor::Participant(participant.clone())
}

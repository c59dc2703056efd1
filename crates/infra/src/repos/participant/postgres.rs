use super::IParticipantRepo;
use creneau_domain::{Participant, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresParticipantRepo {
    pool: PgPool,
}

impl PostgresParticipantRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ParticipantRaw {
    participant_uid: Uuid,
    display_name: String,
    email: Option<String>,
    service: String,
    site: Option<String>,
    manager_uid: Option<Uuid>,
    active: bool,
    access_token: String,
}

impl From<ParticipantRaw> for Participant {
    fn from(raw: ParticipantRaw) -> Self {
        Self {
            id: raw.participant_uid.into(),
            display_name: raw.display_name,
            email: raw.email,
            service: raw.service,
            site: raw.site,
            manager_id: raw.manager_uid.map(|id| id.into()),
            active: raw.active,
            access_token: raw.access_token,
        }
    }
}

#[async_trait::async_trait]
impl IParticipantRepo for PostgresParticipantRepo {
    async fn insert(&self, participant: &Participant) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO participants(participant_uid, display_name, email, service, site, manager_uid, active, access_token)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(participant.id.inner_ref())
        .bind(&participant.display_name)
        .bind(&participant.email)
        .bind(&participant.service)
        .bind(&participant.site)
        .bind(participant.manager().map(|id| id.inner()))
        .bind(participant.active)
        .bind(&participant.access_token)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to insert participant: {:?}. DB returned error: {:?}", participant.id, e);
            e
        })?;
        Ok(())
    }

    async fn save(&self, participant: &Participant) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE participants
            SET display_name = $2, email = $3, service = $4, site = $5, manager_uid = $6, active = $7, access_token = $8
            WHERE participant_uid = $1
            "#,
        )
        .bind(participant.id.inner_ref())
        .bind(&participant.display_name)
        .bind(&participant.email)
        .bind(&participant.service)
        .bind(&participant.site)
        .bind(participant.manager().map(|id| id.inner()))
        .bind(participant.active)
        .bind(&participant.access_token)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to save participant: {:?}. DB returned error: {:?}", participant.id, e);
            e
        })?;
        Ok(())
    }

    async fn find(&self, participant_id: &ID) -> Option<Participant> {
        sqlx::query_as::<_, ParticipantRaw>(
            r#"
            SELECT * FROM participants AS p
            WHERE p.participant_uid = $1
            "#,
        )
        .bind(participant_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Find participant with id: {:?} failed. DB returned error: {:?}", participant_id, e);
            e
        })
        .ok()?
        .map(|raw| raw.into())
    }

    async fn find_many(&self, participant_ids: &[ID]) -> Vec<Participant> {
        let ids = participant_ids.iter().map(|id| id.inner()).collect::<Vec<_>>();
        sqlx::query_as::<_, ParticipantRaw>(
            r#"
            SELECT * FROM participants AS p
            WHERE p.participant_uid = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Find participants with ids: {:?} failed. DB returned error: {:?}", participant_ids, e);
            vec![]
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn find_active_by_access_token(&self, access_token: &str) -> Option<Participant> {
        sqlx::query_as::<_, ParticipantRaw>(
            r#"
            SELECT * FROM participants AS p
            WHERE p.access_token = $1 AND p.active
            "#,
        )
        .bind(access_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Find participant by access token failed. DB returned error: {:?}", e);
            e
        })
        .ok()?
        .map(|raw| raw.into())
    }
}

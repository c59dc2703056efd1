use super::IInternalActorRepo;
use creneau_domain::{InternalActor, Policy, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool,
};
use tracing::error;

pub struct PostgresInternalActorRepo {
    pool: PgPool,
}

impl PostgresInternalActorRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct InternalActorRaw {
    actor_uid: Uuid,
    name: String,
    participant_uid: Option<Uuid>,
    api_key: String,
    policy: Json<Policy>,
}

impl From<InternalActorRaw> for InternalActor {
    fn from(raw: InternalActorRaw) -> Self {
        Self {
            id: raw.actor_uid.into(),
            name: raw.name,
            participant_id: raw.participant_uid.map(|id| id.into()),
            api_key: raw.api_key,
            policy: raw.policy.0,
        }
    }
}

#[async_trait::async_trait]
impl IInternalActorRepo for PostgresInternalActorRepo {
    async fn insert(&self, actor: &InternalActor) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO internal_actors(actor_uid, name, participant_uid, api_key, policy)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(actor.id.inner_ref())
        .bind(&actor.name)
        .bind(actor.participant_id.map(|id| id.inner()))
        .bind(&actor.api_key)
        .bind(Json(&actor.policy))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to insert internal actor: {:?}. DB returned error: {:?}", actor.id, e);
            e
        })?;
        Ok(())
    }

    async fn find(&self, actor_id: &ID) -> Option<InternalActor> {
        sqlx::query_as::<_, InternalActorRaw>(
            r#"
            SELECT * FROM internal_actors AS a
            WHERE a.actor_uid = $1
            "#,
        )
        .bind(actor_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Find internal actor with id: {:?} failed. DB returned error: {:?}", actor_id, e);
            e
        })
        .ok()?
        .map(|raw| raw.into())
    }

    async fn find_by_api_key(&self, api_key: &str) -> Option<InternalActor> {
        sqlx::query_as::<_, InternalActorRaw>(
            r#"
            SELECT * FROM internal_actors AS a
            WHERE a.api_key = $1
            "#,
        )
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Find internal actor by api key failed. DB returned error: {:?}", e);
            e
        })
        .ok()?
        .map(|raw| raw.into())
    }
}

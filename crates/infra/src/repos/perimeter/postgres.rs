use super::ICoordinatorPerimeterRepo;
use creneau_domain::{CoordinatorPerimeter, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresCoordinatorPerimeterRepo {
    pool: PgPool,
}

impl PostgresCoordinatorPerimeterRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PerimeterRaw {
    perimeter_uid: Uuid,
    actor_uid: Uuid,
    service: String,
    site: Option<String>,
}

impl From<PerimeterRaw> for CoordinatorPerimeter {
    fn from(raw: PerimeterRaw) -> Self {
        Self {
            id: raw.perimeter_uid.into(),
            actor_id: raw.actor_uid.into(),
            service: raw.service,
            site: raw.site,
        }
    }
}

#[async_trait::async_trait]
impl ICoordinatorPerimeterRepo for PostgresCoordinatorPerimeterRepo {
    async fn insert(&self, perimeter: &CoordinatorPerimeter) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO coordinator_perimeters(perimeter_uid, actor_uid, service, site)
            VALUES($1, $2, $3, $4)
            "#,
        )
        .bind(perimeter.id.inner_ref())
        .bind(perimeter.actor_id.inner_ref())
        .bind(&perimeter.service)
        .bind(&perimeter.site)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to insert perimeter: {:?}. DB returned error: {:?}", perimeter, e);
            e
        })?;
        Ok(())
    }

    async fn find_by_actor(&self, actor_id: &ID) -> Vec<CoordinatorPerimeter> {
        sqlx::query_as::<_, PerimeterRaw>(
            r#"
            SELECT * FROM coordinator_perimeters AS p
            WHERE p.actor_uid = $1
            "#,
        )
        .bind(actor_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Find perimeters of actor: {:?} failed. DB returned error: {:?}", actor_id, e);
            vec![]
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }
}

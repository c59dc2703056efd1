use super::ICampaignRepo;
use chrono::NaiveDate;
use creneau_domain::{Campaign, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresCampaignRepo {
    pool: PgPool,
}

impl PostgresCampaignRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CampaignRaw {
    campaign_uid: Uuid,
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    archived: bool,
}

impl From<CampaignRaw> for Campaign {
    fn from(raw: CampaignRaw) -> Self {
        Self {
            id: raw.campaign_uid.into(),
            name: raw.name,
            start_date: raw.start_date,
            end_date: raw.end_date,
            archived: raw.archived,
        }
    }
}

#[async_trait::async_trait]
impl ICampaignRepo for PostgresCampaignRepo {
    async fn insert(&self, campaign: &Campaign) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO campaigns(campaign_uid, name, start_date, end_date, archived)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(campaign.id.inner_ref())
        .bind(&campaign.name)
        .bind(campaign.start_date)
        .bind(campaign.end_date)
        .bind(campaign.archived)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to insert campaign: {:?}. DB returned error: {:?}", campaign, e);
            e
        })?;
        Ok(())
    }

    async fn save(&self, campaign: &Campaign) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE campaigns
            SET name = $2, start_date = $3, end_date = $4, archived = $5
            WHERE campaign_uid = $1
            "#,
        )
        .bind(campaign.id.inner_ref())
        .bind(&campaign.name)
        .bind(campaign.start_date)
        .bind(campaign.end_date)
        .bind(campaign.archived)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to save campaign: {:?}. DB returned error: {:?}", campaign, e);
            e
        })?;
        Ok(())
    }

    async fn find(&self, campaign_id: &ID) -> Option<Campaign> {
        sqlx::query_as::<_, CampaignRaw>(
            r#"
            SELECT * FROM campaigns AS c
            WHERE c.campaign_uid = $1
            "#,
        )
        .bind(campaign_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Find campaign with id: {:?} failed. DB returned error: {:?}", campaign_id, e);
            e
        })
        .ok()?
        .map(|raw| raw.into())
    }
}

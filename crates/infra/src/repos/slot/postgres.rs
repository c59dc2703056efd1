use super::{ISlotRepo, SlotStoreError};
use chrono::{NaiveDate, NaiveTime};
use creneau_domain::{Slot, ID};
use sqlx::{types::Uuid, FromRow, PgPool, Postgres, Transaction};
use tracing::error;

pub struct PostgresSlotRepo {
    pool: PgPool,
}

impl PostgresSlotRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SlotRaw {
    slot_uid: Uuid,
    campaign_uid: Uuid,
    segment: Option<String>,
    location: String,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    capacity: i64,
    locked: bool,
}

impl From<SlotRaw> for Slot {
    fn from(raw: SlotRaw) -> Self {
        Self {
            id: raw.slot_uid.into(),
            campaign_id: raw.campaign_uid.into(),
            segment: raw.segment,
            location: raw.location,
            date: raw.date,
            start_time: raw.start_time,
            end_time: raw.end_time,
            capacity: raw.capacity,
            locked: raw.locked,
        }
    }
}

fn storage(e: sqlx::Error) -> SlotStoreError {
    SlotStoreError::Storage(e.into())
}

/// Locks the slot row and returns its number of confirmed bookings
async fn lock_slot(
    tx: &mut Transaction<'_, Postgres>,
    slot_id: &ID,
) -> Result<i64, SlotStoreError> {
    let locked: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT slot_uid FROM slots
        WHERE slot_uid = $1
        FOR UPDATE
        "#,
    )
    .bind(slot_id.inner_ref())
    .fetch_optional(&mut **tx)
    .await
    .map_err(storage)?;
    if locked.is_none() {
        return Err(SlotStoreError::NotFound);
    }

    let (confirmed,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM bookings
        WHERE slot_uid = $1 AND status = 'confirmed'
        "#,
    )
    .bind(slot_id.inner_ref())
    .fetch_one(&mut **tx)
    .await
    .map_err(storage)?;
    Ok(confirmed)
}

#[async_trait::async_trait]
impl ISlotRepo for PostgresSlotRepo {
    async fn bulk_insert(&self, slots: &[Slot]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        for slot in slots {
            sqlx::query(
                r#"
                INSERT INTO slots(slot_uid, campaign_uid, segment, location, date, start_time, end_time, capacity, locked)
                VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(slot.id.inner_ref())
            .bind(slot.campaign_id.inner_ref())
            .bind(&slot.segment)
            .bind(&slot.location)
            .bind(slot.date)
            .bind(slot.start_time)
            .bind(slot.end_time)
            .bind(slot.capacity)
            .bind(slot.locked)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Unable to insert slot: {:?}. DB returned error: {:?}", slot, e);
                e
            })?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find(&self, slot_id: &ID) -> Option<Slot> {
        sqlx::query_as::<_, SlotRaw>(
            r#"
            SELECT * FROM slots AS s
            WHERE s.slot_uid = $1
            "#,
        )
        .bind(slot_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Find slot with id: {:?} failed. DB returned error: {:?}", slot_id, e);
            e
        })
        .ok()?
        .map(|raw| raw.into())
    }

    async fn find_many(&self, slot_ids: &[ID]) -> Vec<Slot> {
        let ids = slot_ids.iter().map(|id| id.inner()).collect::<Vec<_>>();
        sqlx::query_as::<_, SlotRaw>(
            r#"
            SELECT * FROM slots AS s
            WHERE s.slot_uid = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Find slots with ids: {:?} failed. DB returned error: {:?}", slot_ids, e);
            vec![]
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn find_by_campaign(&self, campaign_id: &ID) -> Vec<Slot> {
        sqlx::query_as::<_, SlotRaw>(
            r#"
            SELECT * FROM slots AS s
            WHERE s.campaign_uid = $1
            ORDER BY s.date, s.start_time
            "#,
        )
        .bind(campaign_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Find slots of campaign: {:?} failed. DB returned error: {:?}", campaign_id, e);
            vec![]
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn update(&self, slot: &Slot) -> Result<Slot, SlotStoreError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let confirmed = lock_slot(&mut tx, &slot.id).await?;
        if slot.capacity < confirmed {
            return Err(SlotStoreError::CapacityBelowBookings(confirmed));
        }

        let updated = sqlx::query_as::<_, SlotRaw>(
            r#"
            UPDATE slots
            SET segment = $2, location = $3, date = $4, start_time = $5, end_time = $6, capacity = $7
            WHERE slot_uid = $1
            RETURNING *
            "#,
        )
        .bind(slot.id.inner_ref())
        .bind(&slot.segment)
        .bind(&slot.location)
        .bind(slot.date)
        .bind(slot.start_time)
        .bind(slot.end_time)
        .bind(slot.capacity)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("Unable to update slot: {:?}. DB returned error: {:?}", slot, e);
            storage(e)
        })?;
        tx.commit().await.map_err(storage)?;
        Ok(updated.into())
    }

    async fn set_locked(&self, slot_id: &ID, locked: bool) -> Result<Slot, SlotStoreError> {
        sqlx::query_as::<_, SlotRaw>(
            r#"
            UPDATE slots
            SET locked = $2
            WHERE slot_uid = $1
            RETURNING *
            "#,
        )
        .bind(slot_id.inner_ref())
        .bind(locked)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to set lock of slot: {:?}. DB returned error: {:?}", slot_id, e);
            storage(e)
        })?
        .map(|raw| raw.into())
        .ok_or(SlotStoreError::NotFound)
    }

    async fn delete(&self, slot_id: &ID) -> Result<Slot, SlotStoreError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        if lock_slot(&mut tx, slot_id).await? > 0 {
            return Err(SlotStoreError::HasConfirmedBookings);
        }

        let deleted = sqlx::query_as::<_, SlotRaw>(
            r#"
            DELETE FROM slots AS s
            WHERE s.slot_uid = $1
            RETURNING *
            "#,
        )
        .bind(slot_id.inner_ref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            error!("Unable to delete slot: {:?}. DB returned error: {:?}", slot_id, e);
            storage(e)
        })?;
        tx.commit().await.map_err(storage)?;
        Ok(deleted.into())
    }
}

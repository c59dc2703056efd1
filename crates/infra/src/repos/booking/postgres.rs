use super::{BookingStoreError, IBookingRepo};
use anyhow::anyhow;
use chrono::NaiveDate;
use creneau_domain::{Booking, BookingStatus, Positioning, ID};
use sqlx::{types::Uuid, FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::error;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct BookingRaw {
    booking_uid: Uuid,
    participant_uid: Uuid,
    slot_uid: Uuid,
    campaign_uid: Uuid,
    positioning: String,
    manager_uid: Option<Uuid>,
    actor_uid: Option<Uuid>,
    status: String,
    created: i64,
    updated: i64,
}

impl TryFrom<BookingRaw> for Booking {
    type Error = anyhow::Error;

    fn try_from(raw: BookingRaw) -> Result<Self, Self::Error> {
        let positioning = match (raw.positioning.as_str(), raw.manager_uid, raw.actor_uid) {
            ("self", _, _) => Positioning::SelfService,
            ("manager", Some(manager_id), actor_id) => Positioning::Manager {
                manager_id: manager_id.into(),
                actor_id: actor_id.map(|id| id.into()),
            },
            ("coordinator", _, Some(actor_id)) => Positioning::Coordinator {
                actor_id: actor_id.into(),
            },
            (kind, _, _) => {
                return Err(anyhow!(
                    "Booking {} has an inconsistent positioning: {}",
                    raw.booking_uid,
                    kind
                ))
            }
        };

        Ok(Self {
            id: raw.booking_uid.into(),
            participant_id: raw.participant_uid.into(),
            slot_id: raw.slot_uid.into(),
            campaign_id: raw.campaign_uid.into(),
            positioning,
            status: raw.status.parse().map_err(|e: String| anyhow!(e))?,
            created: raw.created,
            updated: raw.updated,
        })
    }
}

fn to_bookings(raws: Vec<BookingRaw>) -> Vec<Booking> {
    raws.into_iter()
        .filter_map(|raw| match Booking::try_from(raw) {
            Ok(booking) => Some(booking),
            Err(e) => {
                error!("Skipping unreadable booking row: {:?}", e);
                None
            }
        })
        .collect()
}

fn positioning_columns(positioning: &Positioning) -> (Option<Uuid>, Option<Uuid>) {
    match positioning {
        Positioning::SelfService => (None, None),
        Positioning::Manager {
            manager_id,
            actor_id,
        } => (Some(manager_id.inner()), actor_id.map(|id| id.inner())),
        Positioning::Coordinator { actor_id } => (None, Some(actor_id.inner())),
    }
}

/// Translates a violation of the one confirmed booking per participant and
/// campaign index to the same rejection as the pre-check
fn store_error(e: sqlx::Error) -> BookingStoreError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            BookingStoreError::AlreadyBooked
        }
        _ => BookingStoreError::Storage(e.into()),
    }
}

#[derive(Debug, FromRow)]
struct LockedSlotRaw {
    slot_uid: Uuid,
    capacity: i64,
    locked: bool,
}

/// Locks the slot rows in a stable order, so that two moves between the same
/// slots cannot deadlock
async fn lock_slots(
    tx: &mut Transaction<'_, Postgres>,
    slot_ids: &[ID],
) -> Result<Vec<LockedSlotRaw>, BookingStoreError> {
    let ids = slot_ids.iter().map(|id| id.inner()).collect::<Vec<_>>();
    sqlx::query_as::<_, LockedSlotRaw>(
        r#"
        SELECT slot_uid, capacity, locked FROM slots
        WHERE slot_uid = ANY($1)
        ORDER BY slot_uid
        FOR UPDATE
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut **tx)
    .await
    .map_err(store_error)
}

async fn count_confirmed(
    tx: &mut Transaction<'_, Postgres>,
    slot_id: &ID,
) -> Result<i64, BookingStoreError> {
    let (confirmed,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM bookings
        WHERE slot_uid = $1 AND status = 'confirmed'
        "#,
    )
    .bind(slot_id.inner_ref())
    .fetch_one(&mut **tx)
    .await
    .map_err(store_error)?;
    Ok(confirmed)
}

async fn lock_confirmed_booking(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: &ID,
) -> Result<Booking, BookingStoreError> {
    let raw = sqlx::query_as::<_, BookingRaw>(
        r#"
        SELECT * FROM bookings
        WHERE booking_uid = $1
        FOR UPDATE
        "#,
    )
    .bind(booking_id.inner_ref())
    .fetch_optional(&mut **tx)
    .await
    .map_err(store_error)?
    .ok_or(BookingStoreError::BookingNotFound)?;
    let booking = Booking::try_from(raw)?;
    if !booking.is_confirmed() {
        return Err(BookingStoreError::NotConfirmed);
    }
    Ok(booking)
}

#[async_trait::async_trait]
impl IBookingRepo for PostgresBookingRepo {
    async fn insert_confirmed(&self, booking: &Booking) -> Result<(), BookingStoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let slot = lock_slots(&mut tx, &[booking.slot_id])
            .await?
            .pop()
            .ok_or(BookingStoreError::SlotNotFound)?;

        let existing: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT booking_uid FROM bookings
            WHERE participant_uid = $1 AND campaign_uid = $2 AND status = 'confirmed'
            "#,
        )
        .bind(booking.participant_id.inner_ref())
        .bind(booking.campaign_id.inner_ref())
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error)?;
        if existing.is_some() {
            return Err(BookingStoreError::AlreadyBooked);
        }
        if slot.locked {
            return Err(BookingStoreError::SlotLocked);
        }
        if count_confirmed(&mut tx, &booking.slot_id).await? >= slot.capacity {
            return Err(BookingStoreError::SlotFull);
        }

        let (manager_uid, actor_uid) = positioning_columns(&booking.positioning);
        sqlx::query(
            r#"
            INSERT INTO bookings(booking_uid, participant_uid, slot_uid, campaign_uid, positioning, manager_uid, actor_uid, status, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(booking.id.inner_ref())
        .bind(booking.participant_id.inner_ref())
        .bind(booking.slot_id.inner_ref())
        .bind(booking.campaign_id.inner_ref())
        .bind(booking.positioning.kind())
        .bind(manager_uid)
        .bind(actor_uid)
        .bind(BookingStatus::Confirmed.as_str())
        .bind(booking.created)
        .bind(booking.updated)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;
        Ok(())
    }

    async fn move_to_slot(
        &self,
        booking_id: &ID,
        slot_id: &ID,
        positioning: Positioning,
        now: i64,
    ) -> Result<Booking, BookingStoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let mut booking = lock_confirmed_booking(&mut tx, booking_id).await?;
        let slots = lock_slots(&mut tx, &[booking.slot_id, *slot_id]).await?;
        let target = slots
            .iter()
            .find(|s| s.slot_uid == slot_id.inner())
            .ok_or(BookingStoreError::SlotNotFound)?;
        if slots.iter().any(|s| s.locked) {
            return Err(BookingStoreError::SlotLocked);
        }
        if booking.slot_id != *slot_id && count_confirmed(&mut tx, slot_id).await? >= target.capacity
        {
            return Err(BookingStoreError::SlotFull);
        }

        let (manager_uid, actor_uid) = positioning_columns(&positioning);
        sqlx::query(
            r#"
            UPDATE bookings
            SET slot_uid = $2, positioning = $3, manager_uid = $4, actor_uid = $5, updated = $6
            WHERE booking_uid = $1
            "#,
        )
        .bind(booking_id.inner_ref())
        .bind(slot_id.inner_ref())
        .bind(positioning.kind())
        .bind(manager_uid)
        .bind(actor_uid)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;
        tx.commit().await.map_err(store_error)?;

        booking.slot_id = *slot_id;
        booking.positioning = positioning;
        booking.updated = now;
        Ok(booking)
    }

    async fn cancel(&self, booking_id: &ID, now: i64) -> Result<Booking, BookingStoreError> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;
        let mut booking = lock_confirmed_booking(&mut tx, booking_id).await?;
        let slots = lock_slots(&mut tx, &[booking.slot_id]).await?;
        if slots.iter().any(|s| s.locked) {
            return Err(BookingStoreError::SlotLocked);
        }

        sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2, updated = $3
            WHERE booking_uid = $1
            "#,
        )
        .bind(booking_id.inner_ref())
        .bind(BookingStatus::Cancelled.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;
        tx.commit().await.map_err(store_error)?;

        booking.status = BookingStatus::Cancelled;
        booking.updated = now;
        Ok(booking)
    }

    async fn find(&self, booking_id: &ID) -> Option<Booking> {
        let raw = sqlx::query_as::<_, BookingRaw>(
            r#"
            SELECT * FROM bookings AS b
            WHERE b.booking_uid = $1
            "#,
        )
        .bind(booking_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Find booking with id: {:?} failed. DB returned error: {:?}", booking_id, e);
            e
        })
        .ok()??;
        to_bookings(vec![raw]).into_iter().next()
    }

    async fn find_by_participant(&self, participant_id: &ID) -> Vec<Booking> {
        let raws = sqlx::query_as::<_, BookingRaw>(
            r#"
            SELECT * FROM bookings AS b
            WHERE b.participant_uid = $1
            ORDER BY b.created
            "#,
        )
        .bind(participant_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Find bookings of participant: {:?} failed. DB returned error: {:?}", participant_id, e);
            vec![]
        });
        to_bookings(raws)
    }

    async fn find_confirmed_by_participant(
        &self,
        participant_id: &ID,
        campaign_id: &ID,
    ) -> Option<Booking> {
        let raw = sqlx::query_as::<_, BookingRaw>(
            r#"
            SELECT * FROM bookings AS b
            WHERE b.participant_uid = $1 AND b.campaign_uid = $2 AND b.status = 'confirmed'
            "#,
        )
        .bind(participant_id.inner_ref())
        .bind(campaign_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Find confirmed booking of participant: {:?} failed. DB returned error: {:?}", participant_id, e);
            e
        })
        .ok()??;
        to_bookings(vec![raw]).into_iter().next()
    }

    async fn find_confirmed_by_campaign(&self, campaign_id: &ID) -> Vec<Booking> {
        let raws = sqlx::query_as::<_, BookingRaw>(
            r#"
            SELECT b.* FROM bookings AS b
            INNER JOIN slots AS s ON s.slot_uid = b.slot_uid
            WHERE b.campaign_uid = $1 AND b.status = 'confirmed'
            ORDER BY s.date, s.start_time, b.created
            "#,
        )
        .bind(campaign_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Find confirmed bookings of campaign: {:?} failed. DB returned error: {:?}", campaign_id, e);
            vec![]
        });
        to_bookings(raws)
    }

    async fn count_confirmed_by_slots(&self, slot_ids: &[ID]) -> anyhow::Result<HashMap<ID, i64>> {
        let ids = slot_ids.iter().map(|id| id.inner()).collect::<Vec<_>>();
        let counts: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT slot_uid, COUNT(*) FROM bookings
            WHERE slot_uid = ANY($1) AND status = 'confirmed'
            GROUP BY slot_uid
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(counts
            .into_iter()
            .map(|(slot_uid, count)| (slot_uid.into(), count))
            .collect())
    }

    async fn find_confirmed_in_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Booking> {
        let raws = sqlx::query_as::<_, BookingRaw>(
            r#"
            SELECT b.* FROM bookings AS b
            INNER JOIN slots AS s ON s.slot_uid = b.slot_uid
            WHERE b.status = 'confirmed' AND s.date BETWEEN $1 AND $2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Find confirmed bookings between {} and {} failed. DB returned error: {:?}", start, end, e);
            vec![]
        });
        to_bookings(raws)
    }
}

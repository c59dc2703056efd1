use super::INotificationRepo;
use anyhow::anyhow;
use creneau_domain::{Notification, NotificationKind, NotificationStatus, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationRaw {
    notification_uid: Uuid,
    participant_uid: Uuid,
    booking_uid: Option<Uuid>,
    kind: String,
    subject: String,
    body: String,
    status: String,
    error: Option<String>,
    created: i64,
    sent_at: Option<i64>,
}

impl TryFrom<NotificationRaw> for Notification {
    type Error = anyhow::Error;

    fn try_from(raw: NotificationRaw) -> Result<Self, Self::Error> {
        Ok(Self {
            id: raw.notification_uid.into(),
            participant_id: raw.participant_uid.into(),
            booking_id: raw.booking_uid.map(|id| id.into()),
            kind: raw.kind.parse().map_err(|e: String| anyhow!(e))?,
            subject: raw.subject,
            body: raw.body,
            status: raw.status.parse().map_err(|e: String| anyhow!(e))?,
            error: raw.error,
            created: raw.created,
            sent_at: raw.sent_at,
        })
    }
}

fn to_notifications(raws: Vec<NotificationRaw>) -> Vec<Notification> {
    raws.into_iter()
        .filter_map(|raw| match Notification::try_from(raw) {
            Ok(notification) => Some(notification),
            Err(e) => {
                error!("Skipping unreadable notification row: {:?}", e);
                None
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl INotificationRepo for PostgresNotificationRepo {
    async fn insert(&self, notification: &Notification) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications(notification_uid, participant_uid, booking_uid, kind, subject, body, status, error, created, sent_at)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(notification.id.inner_ref())
        .bind(notification.participant_id.inner_ref())
        .bind(notification.booking_id.map(|id| id.inner()))
        .bind(notification.kind.as_str())
        .bind(&notification.subject)
        .bind(&notification.body)
        .bind(notification.status.as_str())
        .bind(&notification.error)
        .bind(notification.created)
        .bind(notification.sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to insert notification: {:?}. DB returned error: {:?}", notification.id, e);
            e
        })?;
        Ok(())
    }

    async fn save(&self, notification: &Notification) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE notifications
            SET status = $2, error = $3, sent_at = $4
            WHERE notification_uid = $1
            "#,
        )
        .bind(notification.id.inner_ref())
        .bind(notification.status.as_str())
        .bind(&notification.error)
        .bind(notification.sent_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to save notification: {:?}. DB returned error: {:?}", notification.id, e);
            e
        })?;
        Ok(())
    }

    async fn find(&self, notification_id: &ID) -> Option<Notification> {
        let raw = sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications AS n
            WHERE n.notification_uid = $1
            "#,
        )
        .bind(notification_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Find notification with id: {:?} failed. DB returned error: {:?}", notification_id, e);
            e
        })
        .ok()??;
        to_notifications(vec![raw]).into_iter().next()
    }

    async fn find_by_booking(&self, booking_id: &ID) -> Vec<Notification> {
        let raws = sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications AS n
            WHERE n.booking_uid = $1
            ORDER BY n.created
            "#,
        )
        .bind(booking_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Find notifications of booking: {:?} failed. DB returned error: {:?}", booking_id, e);
            vec![]
        });
        to_notifications(raws)
    }

    async fn find_by_participant(&self, participant_id: &ID) -> Vec<Notification> {
        let raws = sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications AS n
            WHERE n.participant_uid = $1
            ORDER BY n.created
            "#,
        )
        .bind(participant_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Find notifications of participant: {:?} failed. DB returned error: {:?}", participant_id, e);
            vec![]
        });
        to_notifications(raws)
    }

    async fn find_sent_reminder(&self, booking_id: &ID) -> Option<Notification> {
        let raw = sqlx::query_as::<_, NotificationRaw>(
            r#"
            SELECT * FROM notifications AS n
            WHERE n.booking_uid = $1 AND n.kind = $2 AND n.status = $3
            LIMIT 1
            "#,
        )
        .bind(booking_id.inner_ref())
        .bind(NotificationKind::Reminder.as_str())
        .bind(NotificationStatus::Sent.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Find sent reminder of booking: {:?} failed. DB returned error: {:?}", booking_id, e);
            e
        })
        .ok()??;
        to_notifications(vec![raw]).into_iter().next()
    }
}

use creneau_domain::{
    Booking, Notification, NotificationContent, NotificationKind, NotificationStatus, Participant,
    ID,
};
use creneau_infra::CreneauContext;
use tracing::{error, info, warn};

/// Records a pending `Notification` for the `Participant`
pub async fn enqueue(
    ctx: &CreneauContext,
    participant: &Participant,
    kind: NotificationKind,
    booking_id: Option<ID>,
    content: NotificationContent,
) -> anyhow::Result<Notification> {
    let notification = Notification::new(
        participant.id,
        booking_id,
        kind,
        content,
        ctx.sys.get_timestamp_millis(),
    );
    ctx.repos.notifications.insert(&notification).await?;
    Ok(notification)
}

/// Attempts to deliver the `Notification` and records the outcome on it.
/// A delivery failure ends up on the record and is never returned.
pub async fn deliver(
    ctx: &CreneauContext,
    mut notification: Notification,
    recipient: &Participant,
) -> Notification {
    match ctx.notifier.send(&notification, recipient).await {
        Ok(()) => {
            notification.mark_sent(ctx.sys.get_timestamp_millis());
            info!(
                notification_id = %notification.id,
                kind = notification.kind.as_str(),
                "Notification sent"
            );
        }
        Err(e) => {
            warn!(
                notification_id = %notification.id,
                kind = notification.kind.as_str(),
                "Notification delivery failed: {:#}",
                e
            );
            notification.mark_failed(format!("{:#}", e));
        }
    }

    if let Err(e) = ctx.repos.notifications.save(&notification).await {
        error!(
            "Unable to record the delivery status of notification {}: {:?}",
            notification.id, e
        );
    }
    notification
}

/// Enqueues then delivers, `None` if the notification could not be recorded
pub async fn dispatch(
    ctx: &CreneauContext,
    recipient: &Participant,
    kind: NotificationKind,
    booking_id: Option<ID>,
    content: NotificationContent,
) -> Option<Notification> {
    match enqueue(ctx, recipient, kind, booking_id, content).await {
        Ok(notification) => Some(deliver(ctx, notification, recipient).await),
        Err(e) => {
            error!(
                participant_id = %recipient.id,
                kind = kind.as_str(),
                "Unable to record notification: {:?}",
                e
            );
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderOutcome {
    AlreadySent,
    Sent,
    Failed,
}

/// Reminders are sent at most once per `Booking`: nothing is enqueued when
/// a sent reminder already exists, failed ones are retried
pub async fn dispatch_reminder(
    ctx: &CreneauContext,
    booking: &Booking,
    recipient: &Participant,
    content: NotificationContent,
) -> ReminderOutcome {
    if ctx
        .repos
        .notifications
        .find_sent_reminder(&booking.id)
        .await
        .is_some()
    {
        return ReminderOutcome::AlreadySent;
    }

    match dispatch(
        ctx,
        recipient,
        NotificationKind::Reminder,
        Some(booking.id),
        content,
    )
    .await
    {
        Some(notification) if notification.status == NotificationStatus::Sent => {
            ReminderOutcome::Sent
        }
        _ => ReminderOutcome::Failed,
    }
}

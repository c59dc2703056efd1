use super::dispatcher::{dispatch_reminder, ReminderOutcome};
use crate::shared::usecase::UseCase;
use chrono::Duration;
use creneau_domain::{NotificationContent, NotificationKind};
use creneau_infra::CreneauContext;
use std::collections::HashMap;

/// Reminds every participant whose confirmed booking is coming up within
/// the configured number of days. Reminders already sent are not sent again.
#[derive(Debug)]
pub struct SendRemindersUseCase;

#[derive(Debug, Default, PartialEq)]
pub struct ReminderReport {
    pub sent: usize,
    pub already_sent: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait(?Send)]
impl UseCase for SendRemindersUseCase {
    type Response = ReminderReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SendReminders";

    async fn execute(&mut self, ctx: &CreneauContext) -> Result<Self::Response, Self::Error> {
        let today = ctx.today();
        let until = today + Duration::days(ctx.config.reminder_days_before);
        let bookings = ctx
            .repos
            .bookings
            .find_confirmed_in_date_range(today, until)
            .await;

        let mut report = ReminderReport::default();
        if bookings.is_empty() {
            return Ok(report);
        }

        let slot_ids = bookings.iter().map(|b| b.slot_id).collect::<Vec<_>>();
        let participant_ids = bookings.iter().map(|b| b.participant_id).collect::<Vec<_>>();
        let slots = ctx.repos.slots.find_many(&slot_ids).await;
        let participants = ctx.repos.participants.find_many(&participant_ids).await;
        let mut campaigns = HashMap::new();

        for booking in &bookings {
            if !campaigns.contains_key(&booking.campaign_id) {
                let campaign = ctx.repos.campaigns.find(&booking.campaign_id).await;
                campaigns.insert(booking.campaign_id, campaign);
            }
            let campaign = match campaigns.get(&booking.campaign_id) {
                Some(Some(campaign)) if !campaign.is_read_only() => campaign,
                _ => continue,
            };
            let (slot, participant) = match (
                slots.iter().find(|s| s.id == booking.slot_id),
                participants.iter().find(|p| p.id == booking.participant_id),
            ) {
                (Some(slot), Some(participant)) => (slot, participant),
                _ => continue,
            };

            let content = NotificationContent::for_booking(
                NotificationKind::Reminder,
                participant,
                slot,
                campaign,
                &booking.positioning,
            );
            match dispatch_reminder(ctx, booking, participant, content).await {
                ReminderOutcome::Sent => report.sent += 1,
                ReminderOutcome::AlreadySent => report.already_sent += 1,
                ReminderOutcome::Failed => report.failed += 1,
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::usecase::execute;
    use crate::test_utils::{setup, TestContext};
    use creneau_domain::{Booking, NotificationStatus, Positioning, Slot};

    async fn book(test: &TestContext, name: &str, days: i64) -> (Booking, Slot) {
        let slot = test.insert_slot(days, 1).await;
        let participant = test.insert_participant(name, "IT").await;
        let booking = Booking::new(participant.id, &slot, Positioning::SelfService, 0);
        test.ctx.repos.bookings.insert_confirmed(&booking).await.unwrap();
        (booking, slot)
    }

    #[actix_web::test]
    async fn reminds_upcoming_bookings_once() {
        let test = setup().await;
        let (today, _) = book(&test, "Alice", 0).await;
        let (tomorrow, _) = book(&test, "Bob", 1).await;
        book(&test, "Carl", 5).await;

        let report = execute(SendRemindersUseCase, &test.ctx).await.unwrap();
        assert_eq!(
            report,
            ReminderReport {
                sent: 2,
                already_sent: 0,
                failed: 0
            }
        );

        let report = execute(SendRemindersUseCase, &test.ctx).await.unwrap();
        assert_eq!(report.sent, 0);
        assert_eq!(report.already_sent, 2);

        for booking in [today, tomorrow] {
            let reminders = test
                .ctx
                .repos
                .notifications
                .find_by_booking(&booking.id)
                .await
                .into_iter()
                .filter(|n| {
                    n.kind == NotificationKind::Reminder && n.status == NotificationStatus::Sent
                })
                .count();
            assert_eq!(reminders, 1);
        }
        assert_eq!(test.sender.sent().len(), 2);
    }

    #[actix_web::test]
    async fn failed_reminders_are_retried() {
        let test = setup().await;
        book(&test, "Alice", 1).await;

        test.sender.set_failing(true);
        let report = execute(SendRemindersUseCase, &test.ctx).await.unwrap();
        assert_eq!(report.failed, 1);

        test.sender.set_failing(false);
        let report = execute(SendRemindersUseCase, &test.ctx).await.unwrap();
        assert_eq!(report.sent, 1);
    }

    #[actix_web::test]
    async fn archived_campaigns_are_skipped() {
        let mut test = setup().await;
        book(&test, "Alice", 1).await;
        test.archive_campaign().await;

        let report = execute(SendRemindersUseCase, &test.ctx).await.unwrap();
        assert_eq!(report, ReminderReport::default());
        assert!(test.sender.sent().is_empty());
    }
}

use crate::{notification::send_reminders::SendRemindersUseCase, shared::usecase::execute};
use actix_web::rt::time::interval;
use creneau_infra::CreneauContext;
use std::time::Duration;
use tracing::info;

pub const SEND_REMINDERS_INTERVAL_SECS: u64 = 15 * 60;

/// Runs the reminder sweep every `SEND_REMINDERS_INTERVAL_SECS`. A sweep is
/// awaited before the next tick is taken so two sweeps never overlap.
pub fn start_send_reminders_job(ctx: CreneauContext) {
    actix_web::rt::spawn(async move {
        let mut reminders_interval = interval(Duration::from_secs(SEND_REMINDERS_INTERVAL_SECS));
        loop {
            reminders_interval.tick().await;
            if let Ok(report) = execute(SendRemindersUseCase, &ctx).await {
                if report.sent + report.failed > 0 {
                    info!(
                        sent = report.sent,
                        failed = report.failed,
                        already_sent = report.already_sent,
                        "Reminder sweep done"
                    );
                }
            }
        }
    });
}

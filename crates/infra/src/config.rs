use chrono_tz::Tz;
use creneau_domain::DEFAULT_LOCK_WINDOW_DAYS;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Number of days before its date during which a `Slot` is locked
    pub lock_window_days: i64,
    /// Timezone in which "today" is evaluated for lock windows, reminders
    /// and export file names
    pub timezone: Tz,
    /// Confirmed bookings whose slot is at most this many days ahead get a reminder
    pub reminder_days_before: i64,
    /// When set, notifications are POSTed as json to this url. Otherwise
    /// they are only written to the log.
    pub notification_webhook_url: Option<String>,
    /// Base url of the self-service pages, used to build invitation links
    pub public_url: String,
}

fn parse_env_or<T>(name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => match value.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    name, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    pub fn new() -> Self {
        let port = parse_env_or("PORT", 5000);
        let lock_window_days = parse_env_or("CRENEAU_LOCK_WINDOW_DAYS", DEFAULT_LOCK_WINDOW_DAYS);
        let timezone = parse_env_or("CRENEAU_TIMEZONE", chrono_tz::Europe::Paris);
        let reminder_days_before = parse_env_or("CRENEAU_REMINDER_DAYS_BEFORE", 1);
        let notification_webhook_url = std::env::var("CRENEAU_NOTIFICATION_WEBHOOK_URL").ok();
        if notification_webhook_url.is_none() {
            info!("Did not find CRENEAU_NOTIFICATION_WEBHOOK_URL environment variable. Notifications will only be logged.");
        }
        let public_url = std::env::var("CRENEAU_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        Self {
            port,
            lock_window_days,
            timezone,
            reminder_days_before,
            notification_webhook_url,
            public_url,
        }
    }

    /// Self-service link a participant receives in its invitation
    pub fn self_service_link(&self, access_token: &str) -> String {
        format!(
            "{}/reservation?token={}",
            self.public_url.trim_end_matches('/'),
            access_token
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

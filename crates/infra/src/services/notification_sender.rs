use creneau_domain::{Notification, Participant, ID};
use serde::Serialize;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};
use tracing::info;

/// Delivers a recorded `Notification` to its `Participant`
#[async_trait::async_trait]
pub trait INotificationSender: Send + Sync {
    async fn send(&self, notification: &Notification, recipient: &Participant)
        -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationPayload<'a> {
    notification_id: String,
    kind: &'a str,
    participant_id: String,
    recipient_name: &'a str,
    recipient_email: Option<&'a str>,
    booking_id: Option<String>,
    subject: &'a str,
    body: &'a str,
}

impl<'a> NotificationPayload<'a> {
    fn new(notification: &'a Notification, recipient: &'a Participant) -> Self {
        Self {
            notification_id: notification.id.to_string(),
            kind: notification.kind.as_str(),
            participant_id: recipient.id.to_string(),
            recipient_name: &recipient.display_name,
            recipient_email: recipient.email.as_deref(),
            booking_id: notification.booking_id.map(|id| id.to_string()),
            subject: &notification.subject,
            body: &notification.body,
        }
    }
}

/// Posts notifications as json to a mailing gateway
pub struct WebhookNotificationSender {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotificationSender {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait::async_trait]
impl INotificationSender for WebhookNotificationSender {
    async fn send(
        &self,
        notification: &Notification,
        recipient: &Participant,
    ) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(&NotificationPayload::new(notification, recipient))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Writes notifications to the log, used when no webhook is configured
pub struct LogNotificationSender {}

#[async_trait::async_trait]
impl INotificationSender for LogNotificationSender {
    async fn send(
        &self,
        notification: &Notification,
        recipient: &Participant,
    ) -> anyhow::Result<()> {
        info!(
            notification_id = %notification.id,
            kind = notification.kind.as_str(),
            participant_id = %recipient.id,
            "{}",
            notification.subject
        );
        Ok(())
    }
}

/// Records every delivered notification and can be switched to failing mode
#[derive(Default)]
pub struct InMemoryNotificationSender {
    sent: Mutex<Vec<(ID, Notification)>>,
    failing: AtomicBool,
}

impl InMemoryNotificationSender {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Notifications delivered so far with the id of their recipient
    pub fn sent(&self) -> Vec<(ID, Notification)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl INotificationSender for InMemoryNotificationSender {
    async fn send(
        &self,
        notification: &Notification,
        recipient: &Participant,
    ) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("Mail gateway unavailable");
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.id, notification.clone()));
        Ok(())
    }
}

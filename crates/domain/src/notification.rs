use crate::{
    booking::Positioning,
    campaign::Campaign,
    date::format_date_fr,
    participant::Participant,
    shared::entity::{Entity, ID},
    slot::Slot,
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Confirmation,
    Reminder,
    Modification,
    Cancellation,
    Invitation,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmation => "confirmation",
            Self::Reminder => "reminder",
            Self::Modification => "modification",
            Self::Cancellation => "cancellation",
            Self::Invitation => "invitation",
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmation" => Ok(Self::Confirmation),
            "reminder" => Ok(Self::Reminder),
            "modification" => Ok(Self::Modification),
            "cancellation" => Ok(Self::Cancellation),
            "invitation" => Ok(Self::Invitation),
            _ => Err(format!("Unknown notification kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for NotificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Unknown notification status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationContent {
    pub subject: String,
    pub body: String,
}

impl NotificationContent {
    /// Message about a booking, always addressed to the participant even when
    /// a manager or a coordinator performed the operation
    pub fn for_booking(
        kind: NotificationKind,
        participant: &Participant,
        slot: &Slot,
        campaign: &Campaign,
        positioning: &Positioning,
    ) -> Self {
        let when = format!(
            "le {} de {} à {} ({})",
            format_date_fr(&slot.date),
            slot.start_time.format("%H:%M"),
            slot.end_time.format("%H:%M"),
            slot.location
        );
        let (subject, action) = match kind {
            NotificationKind::Confirmation => ("Confirmation de votre créneau", "est confirmé"),
            NotificationKind::Reminder => ("Rappel de votre créneau", "approche"),
            NotificationKind::Modification => ("Modification de votre créneau", "a été déplacé"),
            NotificationKind::Cancellation => ("Annulation de votre créneau", "a été annulé"),
            NotificationKind::Invitation => ("Réservez votre créneau", "est à réserver"),
        };
        let on_behalf = match positioning {
            Positioning::SelfService => String::new(),
            Positioning::Manager { .. } => " par votre responsable".to_string(),
            Positioning::Coordinator { .. } => " par votre coordinateur".to_string(),
        };
        let body = match kind {
            NotificationKind::Reminder => format!(
                "Bonjour {},\n\nVotre créneau pour la campagne « {} » {} : {}.",
                participant.display_name, campaign.name, action, when
            ),
            _ => format!(
                "Bonjour {},\n\nVotre créneau pour la campagne « {} » {}{} : {}.",
                participant.display_name, campaign.name, action, on_behalf, when
            ),
        };

        Self {
            subject: format!("{} - {}", subject, campaign.name),
            body,
        }
    }

    pub fn invitation(participant: &Participant, campaign: &Campaign, link: &str) -> Self {
        Self {
            subject: format!("Réservez votre créneau - {}", campaign.name),
            body: format!(
                "Bonjour {},\n\nLa campagne « {} » se déroule du {} au {}. \
                 Choisissez votre créneau en suivant ce lien : {}",
                participant.display_name,
                campaign.name,
                format_date_fr(&campaign.start_date),
                format_date_fr(&campaign.end_date),
                link
            ),
        }
    }
}

/// A message for a `Participant`, recorded before delivery is attempted
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: ID,
    pub participant_id: ID,
    pub booking_id: Option<ID>,
    pub kind: NotificationKind,
    pub subject: String,
    pub body: String,
    pub status: NotificationStatus,
    /// Detail of the last delivery failure
    pub error: Option<String>,
    pub created: i64,
    pub sent_at: Option<i64>,
}

impl Notification {
    pub fn new(
        participant_id: ID,
        booking_id: Option<ID>,
        kind: NotificationKind,
        content: NotificationContent,
        now: i64,
    ) -> Self {
        Self {
            id: Default::default(),
            participant_id,
            booking_id,
            kind,
            subject: content.subject,
            body: content.body,
            status: NotificationStatus::Pending,
            error: None,
            created: now,
            sent_at: None,
        }
    }

    pub fn mark_sent(&mut self, now: i64) {
        self.status = NotificationStatus::Sent;
        self.error = None;
        self.sent_at = Some(now);
    }

    pub fn mark_failed(&mut self, error: String) {
        self.status = NotificationStatus::Failed;
        self.error = Some(error);
    }
}

impl Entity for Notification {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::TimeWindow;
    use chrono::{NaiveDate, NaiveTime};

    fn fixtures() -> (Participant, Slot, Campaign) {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let campaign = Campaign::new("Migration postes", start, end);
        let slot = Slot::new(
            campaign.id,
            NaiveDate::from_ymd_opt(2024, 3, 12).unwrap(),
            TimeWindow::new(
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            ),
            2,
            "Salle 4",
            None,
        );
        (Participant::new("Alice", "IT"), slot, campaign)
    }

    #[test]
    fn booking_content_mentions_slot_and_actor() {
        let (participant, slot, campaign) = fixtures();
        let content = NotificationContent::for_booking(
            NotificationKind::Confirmation,
            &participant,
            &slot,
            &campaign,
            &Positioning::Coordinator {
                actor_id: ID::new(),
            },
        );
        assert!(content.subject.starts_with("Confirmation"));
        assert!(content.body.contains("Alice"));
        assert!(content.body.contains("12/03/2024 de 09:00 à 09:30 (Salle 4)"));
        assert!(content.body.contains("par votre coordinateur"));

        let content = NotificationContent::for_booking(
            NotificationKind::Cancellation,
            &participant,
            &slot,
            &campaign,
            &Positioning::SelfService,
        );
        assert!(!content.body.contains(" par votre"));
    }

    #[test]
    fn delivery_status_transitions() {
        let (participant, _, campaign) = fixtures();
        let content = NotificationContent::invitation(&participant, &campaign, "http://link");
        let mut notification = Notification::new(
            participant.id,
            None,
            NotificationKind::Invitation,
            content,
            10,
        );
        assert_eq!(notification.status, NotificationStatus::Pending);

        notification.mark_failed("smtp down".into());
        assert_eq!(notification.status, NotificationStatus::Failed);
        assert_eq!(notification.error.as_deref(), Some("smtp down"));

        notification.mark_sent(20);
        assert_eq!(notification.status, NotificationStatus::Sent);
        assert_eq!(notification.error, None);
        assert_eq!(notification.sent_at, Some(20));
    }
}

mod audit;
mod notification_sender;

pub use audit::{AuditEntry, IAuditSink, InMemoryAuditSink, TracingAuditSink};
pub use notification_sender::{
    INotificationSender, InMemoryNotificationSender, LogNotificationSender,
    WebhookNotificationSender,
};

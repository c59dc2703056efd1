use serde::Serialize;
use std::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub who: String,
    pub what: String,
    /// Timestamp in millis
    pub when: i64,
}

/// Fire and forget sink for audit entries, never awaited by the caller
pub trait IAuditSink: Send + Sync {
    fn emit(&self, entry: AuditEntry);
}

pub struct TracingAuditSink {}

impl IAuditSink for TracingAuditSink {
    fn emit(&self, entry: AuditEntry) {
        info!(target: "audit", who = %entry.who, when = entry.when, "{}", entry.what);
    }
}

#[derive(Default)]
pub struct InMemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl IAuditSink for InMemoryAuditSink {
    fn emit(&self, entry: AuditEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}

//! The append-only, tamper-evident record of every accepted transition.

mod chain;
mod event;
mod sink;

pub use chain::{
    AuditDump, AuditFilter, AuditLog, AuditRecord, GENESIS_HASH, SUBSCRIBER_BACKLOG,
};
pub use event::{ContestEvent, EventKind};
pub use sink::{load_log, AuditSink, JsonLinesSink, LogHeader, MemorySink};

use data_encoding::HEXLOWER;
use log::error;
use rocket::{serde::json::serde_json, tokio::sync::broadcast};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::model::common::{ContestId, ContestPolicy, Principal, Timestamp};

use super::{
    event::{ContestEvent, EventKind},
    sink::AuditSink,
};

/// The `prev_hash` of the first record in every chain.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// How many records a slow subscriber may fall behind before it lags and
/// has to catch up from [`AuditLog::records_after`].
pub const SUBSCRIBER_BACKLOG: usize = 256;

/// One committed transition, linked to its predecessor by hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Position in the log, starting at 1.
    pub seq: u64,
    /// Host-clock time at which the transition was committed.
    pub timestamp: Timestamp,
    /// Who submitted the transition.
    pub principal: Principal,
    pub event: ContestEvent,
    /// Hex SHA-256 of the previous record, or [`GENESIS_HASH`].
    pub prev_hash: String,
    /// Hex SHA-256 of everything above.
    pub hash: String,
}

/// The hashed portion of a record.
#[derive(Serialize)]
struct HashMaterial<'a> {
    seq: u64,
    timestamp: &'a Timestamp,
    principal: &'a Principal,
    event: &'a ContestEvent,
    prev_hash: &'a str,
}

impl HashMaterial<'_> {
    fn digest(&self) -> String {
        let bytes = serde_json::to_vec(self).expect("Serialisation is infallible");
        HEXLOWER.encode(&Sha256::digest(bytes))
    }
}

impl AuditRecord {
    fn seal(
        seq: u64,
        timestamp: Timestamp,
        principal: Principal,
        event: ContestEvent,
        prev_hash: String,
    ) -> Self {
        let hash = HashMaterial {
            seq,
            timestamp: &timestamp,
            principal: &principal,
            event: &event,
            prev_hash: &prev_hash,
        }
        .digest();
        Self {
            seq,
            timestamp,
            principal,
            event,
            prev_hash,
            hash,
        }
    }

    /// The hash this record should carry given its contents.
    pub fn expected_hash(&self) -> String {
        HashMaterial {
            seq: self.seq,
            timestamp: &self.timestamp,
            principal: &self.principal,
            event: &self.event,
            prev_hash: &self.prev_hash,
        }
        .digest()
    }

    pub fn is_intact(&self) -> bool {
        self.hash == self.expected_hash()
    }
}

/// Observer-side filter; every present field must match.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromForm)]
pub struct AuditFilter {
    pub kind: Option<EventKind>,
    pub contest_id: Option<ContestId>,
}

impl AuditFilter {
    pub fn matches(&self, record: &AuditRecord) -> bool {
        self.kind.map_or(true, |kind| record.event.kind() == kind)
            && self
                .contest_id
                .map_or(true, |id| record.event.contest_id() == Some(id))
    }
}

/// Everything needed to independently rebuild and verify a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDump {
    /// The owner the ledger was bootstrapped with.
    pub genesis_owner: Principal,
    pub policy: ContestPolicy,
    pub records: Vec<AuditRecord>,
}

/// The ordered, append-only log of committed transitions.
///
/// Records reach the sink before they become visible in memory or to
/// subscribers, so a record is observed only once it is durable.
pub struct AuditLog {
    records: Vec<AuditRecord>,
    sink: Box<dyn AuditSink>,
    /// Set once the sink may hold a record that never became visible.
    poisoned: bool,
    notifier: broadcast::Sender<AuditRecord>,
}

impl AuditLog {
    pub fn new(sink: Box<dyn AuditSink>) -> Self {
        let (notifier, _) = broadcast::channel(SUBSCRIBER_BACKLOG);
        Self {
            records: Vec::new(),
            sink,
            poisoned: false,
            notifier,
        }
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hash of the latest record, or [`GENESIS_HASH`] for an empty log.
    pub fn head_hash(&self) -> &str {
        self.records
            .last()
            .map_or(GENESIS_HASH, |record| record.hash.as_str())
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.records.last().map(|record| record.timestamp)
    }

    /// Records committed after sequence number `seq`.
    pub fn records_after(&self, seq: u64) -> &[AuditRecord] {
        let len = self.records.len();
        let start = usize::try_from(seq).map_or(len, |seq| seq.min(len));
        &self.records[start..]
    }

    /// Records matching `filter`, in commit order.
    pub fn filter<'a>(
        &'a self,
        filter: &'a AuditFilter,
    ) -> impl Iterator<Item = &'a AuditRecord> + 'a {
        self.records.iter().filter(move |record| filter.matches(record))
    }

    /// Receive every record committed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<AuditRecord> {
        self.notifier.subscribe()
    }

    /// Build the record that would be committed next.
    pub(crate) fn seal(
        &self,
        timestamp: Timestamp,
        principal: Principal,
        event: ContestEvent,
    ) -> AuditRecord {
        let seq = self.records.len() as u64 + 1;
        AuditRecord::seal(seq, timestamp, principal, event, self.head_hash().to_string())
    }

    /// Write a sealed record to the sink.
    pub(crate) fn persist(&mut self, record: &AuditRecord) -> Result<()> {
        if self.poisoned {
            return Err(Error::internal(
                "the audit log stopped accepting records after a failed write",
            ));
        }
        match self.sink.append(record) {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("Failed to persist audit record {}: {e}", record.seq);
                if !self.sink.discards_failed_appends() {
                    error!(
                        "Audit record {} may be partially stored; refusing further commits",
                        record.seq
                    );
                    self.poisoned = true;
                }
                Err(Error::Io(e))
            }
        }
    }

    /// Make a persisted record visible and notify subscribers.
    pub(crate) fn push(&mut self, record: AuditRecord) {
        self.records.push(record.clone());
        // Having no subscribers is fine.
        let _ = self.notifier.send(record);
    }

    pub(crate) fn replace_sink(&mut self, sink: Box<dyn AuditSink>) {
        self.sink = sink;
        self.poisoned = false;
    }

    /// Check sequence numbers, hash links and hashes of a whole chain.
    pub fn verify_chain(records: &[AuditRecord]) -> Result<()> {
        let mut prev_hash = GENESIS_HASH;
        for (index, record) in records.iter().enumerate() {
            let expected_seq = index as u64 + 1;
            if record.seq != expected_seq {
                return Err(Error::Corrupt(format!(
                    "record {} carries sequence number {}",
                    expected_seq, record.seq
                )));
            }
            if record.prev_hash != prev_hash {
                return Err(Error::Corrupt(format!(
                    "record {} does not link to its predecessor",
                    record.seq
                )));
            }
            if !record.is_intact() {
                return Err(Error::Corrupt(format!(
                    "record {} has been altered",
                    record.seq
                )));
            }
            prev_hash = &record.hash;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone, Utc};

    use crate::model::audit::MemorySink;

    fn sample_log() -> AuditLog {
        let mut log = AuditLog::new(Box::new(MemorySink));
        let t0 = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let events = [
            ContestEvent::ContestCreated {
                id: 1,
                title: "Board".to_string(),
                description: None,
                admin: "owner".into(),
                start_time: t0,
                end_time: t0 + Duration::days(1),
            },
            ContestEvent::OptionAdded {
                contest_id: 1,
                option_id: 1,
                label: "A".to_string(),
            },
            ContestEvent::OwnershipTransferred {
                old: "owner".into(),
                new: "heir".into(),
            },
        ];
        for (i, event) in events.into_iter().enumerate() {
            let record = log.seal(t0 + Duration::seconds(i as i64), "owner".into(), event);
            log.persist(&record).unwrap();
            log.push(record);
        }
        log
    }

    #[test]
    fn chain_links() {
        let log = sample_log();
        let records = log.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].prev_hash, GENESIS_HASH);
        assert_eq!(records[1].prev_hash, records[0].hash);
        assert_eq!(records[2].prev_hash, records[1].hash);
        assert_eq!(log.head_hash(), records[2].hash);
        assert_eq!(records[0].hash.len(), 64);
        AuditLog::verify_chain(records).unwrap();
    }

    #[test]
    fn tampering_detected() {
        let log = sample_log();

        let mut altered = log.records().to_vec();
        altered[1].event = ContestEvent::OptionAdded {
            contest_id: 1,
            option_id: 1,
            label: "B".to_string(),
        };
        assert!(matches!(
            AuditLog::verify_chain(&altered),
            Err(Error::Corrupt(_))
        ));

        let mut dropped = log.records().to_vec();
        dropped.remove(1);
        assert!(matches!(
            AuditLog::verify_chain(&dropped),
            Err(Error::Corrupt(_))
        ));

        // Re-hashing a record doesn't help once its successor is linked to the old hash.
        let mut rehashed = log.records().to_vec();
        rehashed[0].principal = "mallory".into();
        rehashed[0].hash = rehashed[0].expected_hash();
        assert!(matches!(
            AuditLog::verify_chain(&rehashed),
            Err(Error::Corrupt(_))
        ));
    }

    #[test]
    fn filtering() {
        let log = sample_log();

        let all = AuditFilter::default();
        assert_eq!(log.filter(&all).count(), 3);

        let contest = AuditFilter {
            kind: None,
            contest_id: Some(1),
        };
        assert_eq!(log.filter(&contest).count(), 2);

        let options = AuditFilter {
            kind: Some(EventKind::OptionAdded),
            contest_id: Some(1),
        };
        let seqs: Vec<u64> = log.filter(&options).map(|r| r.seq).collect();
        assert_eq!(seqs, vec![2]);

        let other = AuditFilter {
            kind: None,
            contest_id: Some(2),
        };
        assert_eq!(log.filter(&other).count(), 0);
    }

    #[test]
    fn subscribers_see_commit_order() {
        let mut log = AuditLog::new(Box::new(MemorySink));
        let mut receiver = log.subscribe();
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        for contest_id in 1..=2 {
            let record = log.seal(now, "owner".into(), ContestEvent::ContestEnded { contest_id });
            log.persist(&record).unwrap();
            log.push(record);
        }
        assert_eq!(receiver.try_recv().unwrap().seq, 1);
        assert_eq!(receiver.try_recv().unwrap().seq, 2);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn records_after_seq() {
        let log = sample_log();
        let seqs = |seq| {
            log.records_after(seq)
                .iter()
                .map(|r| r.seq)
                .collect::<Vec<_>>()
        };
        assert_eq!(seqs(0), vec![1, 2, 3]);
        assert_eq!(seqs(2), vec![3]);
        assert!(seqs(3).is_empty());
        assert!(seqs(10).is_empty());
    }
}

use log::warn;
use rocket::{
    response::stream::{Event, EventStream},
    serde::json::Json,
    tokio::{select, sync::broadcast::error::RecvError},
    Route, Shutdown, State,
};

use crate::{
    config::SharedLedger,
    model::audit::{AuditDump, AuditFilter, AuditRecord},
};

pub fn routes() -> Vec<Route> {
    routes![records, dump, stream]
}

/// Committed records matching the filter, in commit order.
#[get("/audit?<filter..>")]
pub async fn records(filter: AuditFilter, ledger: &State<SharedLedger>) -> Json<Vec<AuditRecord>> {
    let ledger = ledger.read().await;
    Json(ledger.audit().filter(&filter).cloned().collect())
}

/// Everything needed to rebuild and verify the ledger offline.
#[get("/audit/dump")]
pub async fn dump(ledger: &State<SharedLedger>) -> Json<AuditDump> {
    Json(ledger.read().await.dump())
}

/// Records matching the filter as they are committed, as server-sent events.
///
/// A subscriber that falls behind the broadcast backlog catches up from the
/// log itself, so no record is skipped.
#[get("/audit/stream?<filter..>")]
pub async fn stream<'s>(
    filter: AuditFilter,
    ledger: &'s State<SharedLedger>,
    mut shutdown: Shutdown,
) -> EventStream![Event + 's] {
    // Subscribe under the same lock that fixes the starting point.
    let (mut receiver, mut last_seq) = {
        let ledger = ledger.read().await;
        (ledger.audit().subscribe(), ledger.audit().len() as u64)
    };
    EventStream! {
        loop {
            let records = select! {
                biased;
                record = receiver.recv() => match record {
                    Ok(record) => vec![record],
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(missed)) => {
                        warn!(
                            "Audit subscriber fell behind by {missed} records, catching up from #{}",
                            last_seq + 1
                        );
                        ledger.read().await.audit().records_after(last_seq).to_vec()
                    }
                },
                _ = &mut shutdown => break,
            };
            for record in records {
                // Already sent while catching up.
                if record.seq <= last_seq {
                    continue;
                }
                last_seq = record.seq;
                if filter.matches(&record) {
                    yield Event::json(&record).id(record.seq.to_string());
                }
            }
        }
    }
}

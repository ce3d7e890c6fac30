use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contest IDs are sequential integers starting at 1.
pub type ContestId = u32;
/// Option IDs are sequential within their contest, starting at 1.
pub type OptionId = u32;
/// All times are host-clock UTC instants.
pub type Timestamp = DateTime<Utc>;

/// Phases in the contest lifecycle.
///
/// The phase is never stored; it is derived from the clock and the contest's
/// explicit-end flag. Whether results are revealed is an orthogonal flag that
/// can only be set once `Closed`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Before the start time.
    Configuring,
    /// Between start and end time (inclusive), not explicitly ended.
    Open,
    /// Past the end time, or explicitly ended.
    Closed,
}

impl Phase {
    /// Derive the phase of a contest at time `now`.
    pub fn at(
        start_time: Timestamp,
        end_time: Timestamp,
        explicitly_ended: bool,
        now: Timestamp,
    ) -> Self {
        if explicitly_ended || now > end_time {
            Self::Closed
        } else if now < start_time {
            Self::Configuring
        } else {
            Self::Open
        }
    }
}

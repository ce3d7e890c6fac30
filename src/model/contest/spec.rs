use serde::{Deserialize, Serialize};

use crate::model::common::Principal;

/// Upper bound on start offsets and durations: one hundred years.
pub const MAX_WINDOW_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// A contest specification, as submitted by the owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to the creator.
    #[serde(default)]
    pub admin: Option<Principal>,
    /// Seconds from creation until voting opens. Only allowed under the
    /// deferred start policy; absent means "now".
    #[serde(default)]
    pub start_offset_secs: Option<i64>,
    /// Length of the voting window, before any configured buffer.
    pub duration_secs: i64,
}

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// When a contest stops accepting new options.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionFreeze {
    /// Options are frozen once voting starts.
    AtStart,
    /// Options may be added until the contest is explicitly ended.
    AtExplicitEnd,
}

/// How a new contest's start time is chosen.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    /// Voting opens at creation time.
    Immediate,
    /// The creator may supply a non-negative offset from creation time.
    Deferred,
}

/// The rules shared by every contest in a ledger.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContestPolicy {
    /// Only registered voters may vote.
    pub requires_registration: bool,
    pub option_freeze: OptionFreeze,
    pub start: StartPolicy,
    /// Extra seconds appended to every contest's voting window.
    pub end_buffer_secs: u32,
}

impl ContestPolicy {
    /// Voters must be registered by the owner; options are fixed before the
    /// (deferred) start.
    pub fn registration_gated() -> Self {
        Self {
            requires_registration: true,
            option_freeze: OptionFreeze::AtStart,
            start: StartPolicy::Deferred,
            end_buffer_secs: 0,
        }
    }

    /// Anyone may vote; each contest's admin manages options until they end
    /// the contest.
    pub fn admin_managed() -> Self {
        Self {
            requires_registration: false,
            option_freeze: OptionFreeze::AtExplicitEnd,
            start: StartPolicy::Immediate,
            end_buffer_secs: 0,
        }
    }

    pub fn end_buffer(&self) -> Duration {
        Duration::seconds(self.end_buffer_secs.into())
    }
}

impl Default for ContestPolicy {
    fn default() -> Self {
        Self::admin_managed()
    }
}

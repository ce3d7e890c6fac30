//! The command interface consumed from the submission layer.

use serde::{Deserialize, Serialize};

use crate::model::{
    audit::{AuditRecord, ContestEvent},
    common::{ContestId, ContestPolicy, OptionId, Principal, StartPolicy, Timestamp},
    contest::NewContest,
};

/// One state-changing request: who, when, and what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub principal: Principal,
    /// Supplied by the host clock.
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub action: Action,
}

/// The action of a [`Command`], with its contest ID and payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    CreateContest(NewContest),
    AddOption {
        contest_id: ContestId,
        label: String,
    },
    RegisterVoter {
        contest_id: ContestId,
        voter: Principal,
    },
    Vote {
        contest_id: ContestId,
        option_id: OptionId,
    },
    EndContest {
        contest_id: ContestId,
    },
    Reveal {
        contest_id: ContestId,
    },
    TransferOwnership {
        new_owner: Principal,
    },
}

/// What a successful command produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    ContestCreated { contest_id: ContestId, seq: u64 },
    OptionAdded { option_id: OptionId, seq: u64 },
    /// Committed as audit record `seq`.
    Committed { seq: u64 },
    /// Accepted, but there was nothing to change.
    Unchanged,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateContest(_) => "create_contest",
            Self::AddOption { .. } => "add_option",
            Self::RegisterVoter { .. } => "register_voter",
            Self::Vote { .. } => "vote",
            Self::EndContest { .. } => "end_contest",
            Self::Reveal { .. } => "reveal",
            Self::TransferOwnership { .. } => "transfer_ownership",
        }
    }

    /// Reconstruct the action that produced `event` under `policy`, given the
    /// time it was committed at.
    pub fn from_event(event: &ContestEvent, policy: &ContestPolicy, committed_at: Timestamp) -> Self {
        match event.clone() {
            ContestEvent::ContestCreated {
                title,
                description,
                admin,
                start_time,
                end_time,
                ..
            } => {
                let start_offset_secs = match policy.start {
                    StartPolicy::Immediate => None,
                    StartPolicy::Deferred => Some((start_time - committed_at).num_seconds()),
                };
                let duration_secs =
                    (end_time - start_time).num_seconds() - i64::from(policy.end_buffer_secs);
                Self::CreateContest(NewContest {
                    title,
                    description,
                    admin: Some(admin),
                    start_offset_secs,
                    duration_secs,
                })
            }
            ContestEvent::OptionAdded {
                contest_id, label, ..
            } => Self::AddOption { contest_id, label },
            ContestEvent::VoterRegistered { contest_id, voter } => {
                Self::RegisterVoter { contest_id, voter }
            }
            ContestEvent::VoteCast {
                contest_id,
                option_id,
                ..
            } => Self::Vote {
                contest_id,
                option_id,
            },
            ContestEvent::ContestEnded { contest_id } => Self::EndContest { contest_id },
            ContestEvent::ResultsRevealed { contest_id } => Self::Reveal { contest_id },
            ContestEvent::OwnershipTransferred { new, .. } => Self::TransferOwnership { new_owner: new },
        }
    }
}

impl Command {
    pub fn new(principal: impl Into<Principal>, timestamp: Timestamp, action: Action) -> Self {
        Self {
            principal: principal.into(),
            timestamp,
            action,
        }
    }

    /// The command that, replayed against the preceding log, reproduces
    /// `record`.
    pub fn from_record(record: &AuditRecord, policy: &ContestPolicy) -> Self {
        Self {
            principal: record.principal.clone(),
            timestamp: record.timestamp,
            action: Action::from_event(&record.event, policy, record.timestamp),
        }
    }
}

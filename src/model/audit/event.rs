use rocket::form::FromFormField;
use serde::{Deserialize, Serialize};

use crate::model::common::{ContestId, OptionId, Principal, Timestamp};

/// A state transition, as committed to the audit log.
///
/// Events are the only input to [`ContestStore::apply`](crate::model::contest::ContestStore::apply)
/// and [`AccessRegistry::apply`](crate::model::access::AccessRegistry::apply).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContestEvent {
    ContestCreated {
        id: ContestId,
        title: String,
        description: Option<String>,
        admin: Principal,
        start_time: Timestamp,
        end_time: Timestamp,
    },
    OptionAdded {
        contest_id: ContestId,
        option_id: OptionId,
        label: String,
    },
    VoterRegistered {
        contest_id: ContestId,
        voter: Principal,
    },
    VoteCast {
        contest_id: ContestId,
        voter: Principal,
        option_id: OptionId,
    },
    ContestEnded {
        contest_id: ContestId,
    },
    ResultsRevealed {
        contest_id: ContestId,
    },
    OwnershipTransferred {
        old: Principal,
        new: Principal,
    },
}

/// The type of a [`ContestEvent`], used by observers to filter the log.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    #[field(value = "contest_created")]
    ContestCreated,
    #[field(value = "option_added")]
    OptionAdded,
    #[field(value = "voter_registered")]
    VoterRegistered,
    #[field(value = "vote_cast")]
    VoteCast,
    #[field(value = "contest_ended")]
    ContestEnded,
    #[field(value = "results_revealed")]
    ResultsRevealed,
    #[field(value = "ownership_transferred")]
    OwnershipTransferred,
}

impl ContestEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ContestCreated { .. } => EventKind::ContestCreated,
            Self::OptionAdded { .. } => EventKind::OptionAdded,
            Self::VoterRegistered { .. } => EventKind::VoterRegistered,
            Self::VoteCast { .. } => EventKind::VoteCast,
            Self::ContestEnded { .. } => EventKind::ContestEnded,
            Self::ResultsRevealed { .. } => EventKind::ResultsRevealed,
            Self::OwnershipTransferred { .. } => EventKind::OwnershipTransferred,
        }
    }

    /// The contest this event concerns, if any.
    pub fn contest_id(&self) -> Option<ContestId> {
        match *self {
            Self::ContestCreated { id, .. } => Some(id),
            Self::OptionAdded { contest_id, .. }
            | Self::VoterRegistered { contest_id, .. }
            | Self::VoteCast { contest_id, .. }
            | Self::ContestEnded { contest_id }
            | Self::ResultsRevealed { contest_id } => Some(contest_id),
            Self::OwnershipTransferred { .. } => None,
        }
    }

    /// The option this event concerns, if any.
    pub fn option_id(&self) -> Option<OptionId> {
        match *self {
            Self::OptionAdded { option_id, .. } | Self::VoteCast { option_id, .. } => {
                Some(option_id)
            }
            _ => None,
        }
    }
}

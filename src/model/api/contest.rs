use serde::{Deserialize, Serialize};

use crate::model::{
    common::{ContestId, OptionId, Phase, Principal, Timestamp},
    contest::{Contest, ContestOption},
};

/// A contest as seen by anyone, at a given time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestDescription {
    pub id: ContestId,
    pub title: String,
    pub description: Option<String>,
    pub admin: Principal,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub phase: Phase,
    pub explicitly_ended: bool,
    pub results_revealed: bool,
    /// Aggregate counts are always public.
    pub options: Vec<ContestOption>,
    pub total_votes: u64,
    pub registered_voters: usize,
}

impl ContestDescription {
    pub fn new(contest: &Contest, now: Timestamp) -> Self {
        Self {
            id: contest.id,
            title: contest.title.clone(),
            description: contest.description.clone(),
            admin: contest.admin.clone(),
            start_time: contest.start_time,
            end_time: contest.end_time,
            phase: contest.phase(now),
            explicitly_ended: contest.is_explicitly_ended(),
            results_revealed: contest.results_revealed(),
            options: contest.options().to_vec(),
            total_votes: contest.total_votes(),
            registered_voters: contest.registered_voters().count(),
        }
    }
}

/// Brief listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestSummary {
    pub id: ContestId,
    pub title: String,
    pub phase: Phase,
}

impl ContestSummary {
    pub fn new(contest: &Contest, now: Timestamp) -> Self {
        Self {
            id: contest.id,
            title: contest.title.clone(),
            phase: contest.phase(now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterSpec {
    pub voter: Principal,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteSpec {
    pub option_id: OptionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSpec {
    pub owner: Principal,
}

/// Public participation status of one principal in one contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterStatus {
    pub voter: Principal,
    pub is_registered: bool,
    pub has_voted: bool,
}

/// A disclosed ballot. `option_id` is `None` if the voter has not voted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceDescription {
    pub voter: Principal,
    pub option_id: Option<OptionId>,
}

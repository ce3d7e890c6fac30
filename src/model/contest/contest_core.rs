use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{
    access::AccessRegistry,
    common::{ContestId, ContestPolicy, OptionFreeze, OptionId, Phase, Principal, Timestamp},
};

/// A candidate or answer choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestOption {
    /// Unique within its contest, sequential from 1.
    pub id: OptionId,
    pub label: String,
    /// Incremented only by accepted votes.
    pub vote_count: u64,
}

/// One election or poll.
///
/// Options, registrations and ballots are only ever appended, and only by
/// [`ContestStore::apply`](super::ContestStore::apply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contest {
    pub id: ContestId,
    pub title: String,
    pub description: Option<String>,
    /// Manages this contest's options alongside the owner.
    pub admin: Principal,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub(super) explicitly_ended: bool,
    pub(super) results_revealed: bool,
    /// Option `n` lives at index `n - 1`.
    pub(super) options: Vec<ContestOption>,
    pub(super) registrations: BTreeSet<Principal>,
    /// Presence of a voter here means they have voted.
    pub(super) ballots: BTreeMap<Principal, OptionId>,
}

impl Contest {
    pub(super) fn new(
        id: ContestId,
        title: String,
        description: Option<String>,
        admin: Principal,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Self {
        Self {
            id,
            title,
            description,
            admin,
            start_time,
            end_time,
            explicitly_ended: false,
            results_revealed: false,
            options: Vec::new(),
            registrations: BTreeSet::new(),
            ballots: BTreeMap::new(),
        }
    }

    pub fn phase(&self, now: Timestamp) -> Phase {
        Phase::at(self.start_time, self.end_time, self.explicitly_ended, now)
    }

    pub fn is_explicitly_ended(&self) -> bool {
        self.explicitly_ended
    }

    pub fn results_revealed(&self) -> bool {
        self.results_revealed
    }

    pub fn options(&self) -> &[ContestOption] {
        &self.options
    }

    pub fn option(&self, id: OptionId) -> Option<&ContestOption> {
        let index = usize::try_from(id.checked_sub(1)?).ok()?;
        self.options.get(index)
    }

    pub fn is_registered(&self, voter: &Principal) -> bool {
        self.registrations.contains(voter)
    }

    pub fn registered_voters(&self) -> impl Iterator<Item = &Principal> {
        self.registrations.iter()
    }

    pub fn has_voted(&self, voter: &Principal) -> bool {
        self.ballots.contains_key(voter)
    }

    /// The option `voter` chose, if they voted.
    pub fn ballot(&self, voter: &Principal) -> Option<OptionId> {
        self.ballots.get(voter).copied()
    }

    pub fn ballot_count(&self) -> usize {
        self.ballots.len()
    }

    /// Sum of all option counts; always equal to the number of ballots.
    pub fn total_votes(&self) -> u64 {
        self.options.iter().map(|option| option.vote_count).sum()
    }

    /// Is `principal` this contest's admin or the ledger owner?
    pub fn is_manager(&self, access: &AccessRegistry, principal: &Principal) -> bool {
        *principal == self.admin || access.is_owner(principal)
    }

    /// Is the configuration window still open under `policy`?
    pub fn accepts_options(&self, policy: &ContestPolicy, now: Timestamp) -> bool {
        match policy.option_freeze {
            OptionFreeze::AtStart => now < self.start_time,
            OptionFreeze::AtExplicitEnd => !self.explicitly_ended,
        }
    }
}

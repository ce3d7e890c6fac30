//! The contest state machine.
//!
//! Every mutating operation is split in two. A `&self` check validates the
//! caller, arguments and phase and yields the [`ContestEvent`] describing the
//! transition; [`ContestStore::apply`] is the only place state changes. A
//! rejected operation therefore never leaves partial state behind, and a
//! ledger can be rebuilt by applying its audit log.

use chrono::Duration;

use crate::error::{Error, Result};
use crate::model::{
    access::AccessRegistry,
    audit::ContestEvent,
    common::{ContestId, ContestPolicy, OptionId, Phase, Principal, StartPolicy, Timestamp},
};

use super::{
    contest_core::{Contest, ContestOption},
    spec::{NewContest, MAX_WINDOW_SECS},
};

/// Flat table of contests, indexed by ID.
#[derive(Debug, Clone)]
pub struct ContestStore {
    policy: ContestPolicy,
    /// Contest `n` lives at index `n - 1`.
    contests: Vec<Contest>,
}

impl ContestStore {
    pub fn new(policy: ContestPolicy) -> Self {
        Self {
            policy,
            contests: Vec::new(),
        }
    }

    pub fn policy(&self) -> &ContestPolicy {
        &self.policy
    }

    pub fn contests(&self) -> &[Contest] {
        &self.contests
    }

    pub fn get_contest(&self, contest_id: ContestId) -> Result<&Contest> {
        contest_id
            .checked_sub(1)
            .and_then(|index| self.contests.get(index as usize))
            .ok_or_else(|| Error::not_found(format!("Contest {contest_id}")))
    }

    fn get_contest_mut(&mut self, contest_id: ContestId) -> Result<&mut Contest> {
        contest_id
            .checked_sub(1)
            .and_then(|index| self.contests.get_mut(index as usize))
            .ok_or_else(|| Error::Corrupt(format!("event for unknown contest {contest_id}")))
    }

    pub fn get_option(&self, contest_id: ContestId, option_id: OptionId) -> Result<&ContestOption> {
        self.get_contest(contest_id)?
            .option(option_id)
            .ok_or_else(|| Error::not_found(format!("Option {option_id} of contest {contest_id}")))
    }

    pub fn has_voted(&self, contest_id: ContestId, voter: &Principal) -> Result<bool> {
        Ok(self.get_contest(contest_id)?.has_voted(voter))
    }

    pub fn is_registered(&self, contest_id: ContestId, voter: &Principal) -> Result<bool> {
        Ok(self.get_contest(contest_id)?.is_registered(voter))
    }

    fn require_manager(
        &self,
        access: &AccessRegistry,
        contest: &Contest,
        caller: &Principal,
        action: &str,
    ) -> Result<()> {
        if contest.is_manager(access, caller) {
            Ok(())
        } else {
            Err(Error::unauthorized(format!(
                "Only the owner or the admin of contest {} may {action}",
                contest.id
            )))
        }
    }

    /// Validate a new contest. Only the owner may create contests.
    pub fn create_contest(
        &self,
        access: &AccessRegistry,
        caller: &Principal,
        spec: &NewContest,
        now: Timestamp,
    ) -> Result<ContestEvent> {
        access.require_owner(caller, "create contests")?;

        let title = spec.title.trim();
        if title.is_empty() {
            return Err(Error::invalid("Contest title cannot be empty"));
        }
        if spec.duration_secs <= 0 || spec.duration_secs > MAX_WINDOW_SECS {
            return Err(Error::invalid(format!(
                "Contest duration must be between 1 and {MAX_WINDOW_SECS} seconds, got {}",
                spec.duration_secs
            )));
        }
        let admin = match &spec.admin {
            Some(admin) if admin.is_null() => {
                return Err(Error::invalid("Contest admin cannot be the null principal"))
            }
            Some(admin) => admin.clone(),
            None => caller.clone(),
        };

        let offset = match (self.policy.start, spec.start_offset_secs) {
            (_, None) => 0,
            (StartPolicy::Immediate, Some(0)) => 0,
            (StartPolicy::Immediate, Some(_)) => {
                return Err(Error::invalid(
                    "Contests start immediately; a start offset is not allowed",
                ))
            }
            (StartPolicy::Deferred, Some(offset)) if (0..=MAX_WINDOW_SECS).contains(&offset) => {
                offset
            }
            (StartPolicy::Deferred, Some(offset)) => {
                return Err(Error::invalid(format!(
                    "Start offset must be between 0 and {MAX_WINDOW_SECS} seconds, got {offset}"
                )))
            }
        };
        let start_time = now
            .checked_add_signed(Duration::seconds(offset))
            .ok_or_else(|| Error::invalid("Start time out of range"))?;
        let end_time = start_time
            .checked_add_signed(Duration::seconds(spec.duration_secs) + self.policy.end_buffer())
            .ok_or_else(|| Error::invalid("End time out of range"))?;

        let description = spec
            .description
            .as_deref()
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .map(str::to_string);

        Ok(ContestEvent::ContestCreated {
            id: self.contests.len() as ContestId + 1,
            title: title.to_string(),
            description,
            admin,
            start_time,
            end_time,
        })
    }

    /// Validate a new option for a contest whose configuration window is
    /// still open.
    pub fn add_option(
        &self,
        access: &AccessRegistry,
        caller: &Principal,
        contest_id: ContestId,
        label: &str,
        now: Timestamp,
    ) -> Result<ContestEvent> {
        let contest = self.get_contest(contest_id)?;
        self.require_manager(access, contest, caller, "add options")?;

        let label = label.trim();
        if label.is_empty() {
            return Err(Error::invalid("Option label cannot be empty"));
        }
        if !contest.accepts_options(&self.policy, now) {
            return Err(Error::phase(format!(
                "Contest {contest_id} no longer accepts options"
            )));
        }

        Ok(ContestEvent::OptionAdded {
            contest_id,
            option_id: contest.options.len() as OptionId + 1,
            label: label.to_string(),
        })
    }

    /// Validate registering `voter` for a contest. Only the owner may
    /// register voters.
    pub fn register_voter(
        &self,
        access: &AccessRegistry,
        caller: &Principal,
        contest_id: ContestId,
        voter: &Principal,
    ) -> Result<ContestEvent> {
        let contest = self.get_contest(contest_id)?;
        access.require_owner(caller, "register voters")?;

        if voter.is_null() {
            return Err(Error::invalid("Cannot register the null principal"));
        }
        if contest.is_registered(voter) {
            return Err(Error::conflict(format!(
                "{voter} is already registered for contest {contest_id}"
            )));
        }

        Ok(ContestEvent::VoterRegistered {
            contest_id,
            voter: voter.clone(),
        })
    }

    /// Validate a ballot from `caller`.
    pub fn vote(
        &self,
        caller: &Principal,
        contest_id: ContestId,
        option_id: OptionId,
        now: Timestamp,
    ) -> Result<ContestEvent> {
        let contest = self.get_contest(contest_id)?;
        if contest.option(option_id).is_none() {
            return Err(Error::not_found(format!(
                "Option {option_id} of contest {contest_id}"
            )));
        }

        let phase = contest.phase(now);
        if phase != Phase::Open {
            return Err(Error::phase(format!(
                "Contest {contest_id} is not open for voting ({phase:?})"
            )));
        }
        if self.policy.requires_registration && !contest.is_registered(caller) {
            return Err(Error::unauthorized(format!(
                "{caller} is not registered for contest {contest_id}"
            )));
        }
        if contest.has_voted(caller) {
            return Err(Error::conflict(format!(
                "{caller} has already voted in contest {contest_id}"
            )));
        }

        Ok(ContestEvent::VoteCast {
            contest_id,
            voter: caller.clone(),
            option_id,
        })
    }

    /// Validate explicitly ending a contest whose voting window has passed.
    pub fn end_contest(
        &self,
        access: &AccessRegistry,
        caller: &Principal,
        contest_id: ContestId,
        now: Timestamp,
    ) -> Result<ContestEvent> {
        let contest = self.get_contest(contest_id)?;
        self.require_manager(access, contest, caller, "end it")?;

        if contest.explicitly_ended {
            return Err(Error::conflict(format!(
                "Contest {contest_id} has already been ended"
            )));
        }
        if now < contest.end_time {
            return Err(Error::phase(format!(
                "Contest {contest_id} cannot be ended before {}",
                contest.end_time
            )));
        }

        Ok(ContestEvent::ContestEnded { contest_id })
    }

    /// Apply a validated event. Ownership events are ignored.
    ///
    /// Votes record the ballot and increment the option's count in one step;
    /// no reader can observe one without the other.
    pub fn apply(&mut self, event: &ContestEvent) -> Result<()> {
        match event {
            ContestEvent::ContestCreated {
                id,
                title,
                description,
                admin,
                start_time,
                end_time,
            } => {
                let expected = self.contests.len() as ContestId + 1;
                if *id != expected {
                    return Err(Error::Corrupt(format!(
                        "contest created with ID {id}, expected {expected}"
                    )));
                }
                if end_time <= start_time {
                    return Err(Error::Corrupt(format!(
                        "contest {id} ends before it starts"
                    )));
                }
                self.contests.push(Contest::new(
                    *id,
                    title.clone(),
                    description.clone(),
                    admin.clone(),
                    *start_time,
                    *end_time,
                ));
            }
            ContestEvent::OptionAdded {
                contest_id,
                option_id,
                label,
            } => {
                let contest = self.get_contest_mut(*contest_id)?;
                let expected = contest.options.len() as OptionId + 1;
                if *option_id != expected {
                    return Err(Error::Corrupt(format!(
                        "option added with ID {option_id}, expected {expected}"
                    )));
                }
                contest.options.push(ContestOption {
                    id: *option_id,
                    label: label.clone(),
                    vote_count: 0,
                });
            }
            ContestEvent::VoterRegistered { contest_id, voter } => {
                let contest = self.get_contest_mut(*contest_id)?;
                if !contest.registrations.insert(voter.clone()) {
                    return Err(Error::Corrupt(format!(
                        "{voter} registered twice for contest {contest_id}"
                    )));
                }
            }
            ContestEvent::VoteCast {
                contest_id,
                voter,
                option_id,
            } => {
                let contest = self.get_contest_mut(*contest_id)?;
                if contest.ballots.contains_key(voter) {
                    return Err(Error::Corrupt(format!(
                        "{voter} voted twice in contest {contest_id}"
                    )));
                }
                let index = option_id
                    .checked_sub(1)
                    .map(|index| index as usize)
                    .filter(|index| *index < contest.options.len())
                    .ok_or_else(|| {
                        Error::Corrupt(format!(
                            "vote for unknown option {option_id} of contest {contest_id}"
                        ))
                    })?;
                contest.options[index].vote_count += 1;
                contest.ballots.insert(voter.clone(), *option_id);
            }
            ContestEvent::ContestEnded { contest_id } => {
                self.get_contest_mut(*contest_id)?.explicitly_ended = true;
            }
            ContestEvent::ResultsRevealed { contest_id } => {
                self.get_contest_mut(*contest_id)?.results_revealed = true;
            }
            ContestEvent::OwnershipTransferred { .. } => {}
        }
        Ok(())
    }
}

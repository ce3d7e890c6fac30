//! Disclosure of individual ballots.
//!
//! Aggregate counts are always public. Who voted for what is visible to the
//! owner and the contest admin at any time, and to everyone once the results
//! have been revealed.

use crate::error::{Error, Result};
use crate::model::{
    access::AccessRegistry,
    audit::ContestEvent,
    common::{ContestId, OptionId, Phase, Principal, Timestamp},
    contest::ContestStore,
};

/// Validate revealing a closed contest's ballots.
///
/// Revealing twice is a no-op: `Ok(None)` means there is nothing to commit.
pub fn reveal(
    store: &ContestStore,
    access: &AccessRegistry,
    caller: &Principal,
    contest_id: ContestId,
    now: Timestamp,
) -> Result<Option<ContestEvent>> {
    let contest = store.get_contest(contest_id)?;
    if !contest.is_manager(access, caller) {
        return Err(Error::unauthorized(format!(
            "Only the owner or the admin of contest {contest_id} may reveal it"
        )));
    }
    if contest.phase(now) != Phase::Closed {
        return Err(Error::phase(format!(
            "Contest {contest_id} must be closed before revealing"
        )));
    }
    if contest.results_revealed() {
        return Ok(None);
    }
    Ok(Some(ContestEvent::ResultsRevealed { contest_id }))
}

/// The option `voter` chose, as seen by `caller` (`None` for anonymous
/// readers). `Ok(None)` means the voter has not voted.
pub fn voter_choice(
    store: &ContestStore,
    access: &AccessRegistry,
    caller: Option<&Principal>,
    contest_id: ContestId,
    voter: &Principal,
) -> Result<Option<OptionId>> {
    let contest = store.get_contest(contest_id)?;
    let privileged = caller.map_or(false, |caller| contest.is_manager(access, caller));
    if !(contest.results_revealed() || privileged) {
        return Err(Error::unauthorized(format!(
            "Ballots of contest {contest_id} have not been revealed"
        )));
    }
    Ok(contest.ballot(voter))
}

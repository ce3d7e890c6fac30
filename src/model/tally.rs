//! Winner determination from stored vote counts.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::{OptionId, Phase, Timestamp},
    contest::{Contest, ContestOption},
};

/// The outcome of a closed contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Winner {
    Winner {
        option_id: OptionId,
        label: String,
        vote_count: u64,
    },
    /// No option received a vote, including when there are no options.
    NoWinner,
}

/// The option with the most votes, lowest ID first among equals.
///
/// The scan replaces the incumbent only on a strictly greater count, so the
/// first option seen with the maximum wins ties. Options with zero votes
/// never lead.
pub fn leading_option(options: &[ContestOption]) -> Option<&ContestOption> {
    let mut leader: Option<&ContestOption> = None;
    for option in options {
        if option.vote_count > leader.map_or(0, |l| l.vote_count) {
            leader = Some(option);
        }
    }
    leader
}

/// Compute the winner of a contest. Fails unless the contest is closed.
pub fn compute_winner(contest: &Contest, now: Timestamp) -> Result<Winner> {
    if contest.phase(now) != Phase::Closed {
        return Err(Error::phase(format!(
            "Contest {} has not closed yet",
            contest.id
        )));
    }

    Ok(match leading_option(contest.options()) {
        Some(option) => Winner::Winner {
            option_id: option.id,
            label: option.label.clone(),
            vote_count: option.vote_count,
        },
        None => Winner::NoWinner,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(counts: &[u64]) -> Vec<ContestOption> {
        counts
            .iter()
            .enumerate()
            .map(|(i, count)| ContestOption {
                id: i as OptionId + 1,
                label: format!("option {}", i + 1),
                vote_count: *count,
            })
            .collect()
    }

    fn leader(counts: &[u64]) -> Option<OptionId> {
        leading_option(&options(counts)).map(|option| option.id)
    }

    #[test]
    fn strict_maximum() {
        assert_eq!(leader(&[1, 5, 3]), Some(2));
        assert_eq!(leader(&[0, 0, 1]), Some(3));
    }

    #[test]
    fn ties_go_to_lowest_id() {
        assert_eq!(leader(&[2, 4, 4]), Some(2));
        assert_eq!(leader(&[3, 3, 3]), Some(1));
        assert_eq!(leader(&[0, 7, 1, 7]), Some(2));
    }

    #[test]
    fn no_votes_no_leader() {
        assert_eq!(leader(&[]), None);
        assert_eq!(leader(&[0, 0]), None);
    }
}

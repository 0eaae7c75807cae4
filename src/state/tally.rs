//! Deterministic conversion of a completed vote round into an outcome.

use std::collections::HashMap;

use crate::dao::models::PlayerId;

/// Why a round resolved to a skip instead of an ejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// More than one target tied for the highest count.
    Tie,
    /// Skip votes reached the highest target count.
    SkipMajority,
    /// Nobody voted for a target at all.
    NoVotes,
}

/// Result of tallying a completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TallyOutcome {
    /// A single player received the strictly highest vote count.
    Eject(PlayerId),
    /// No unambiguous majority; the round continues.
    Skip(SkipReason),
}

/// Tally the `voted_for` values of a roster whose members have all voted.
///
/// The tie-break policy is deliberately conservative: a tie among the top
/// vote-getters, or skip votes matching the top count, resolves to a skip so
/// play continues rather than ejecting on an ambiguous result.
pub fn tally(votes: &[Option<PlayerId>]) -> TallyOutcome {
    let mut counts: HashMap<PlayerId, usize> = HashMap::new();
    let mut skips = 0usize;
    for vote in votes {
        match vote {
            Some(target) => *counts.entry(*target).or_default() += 1,
            None => skips += 1,
        }
    }

    let Some(&max_count) = counts.values().max() else {
        return TallyOutcome::Skip(SkipReason::NoVotes);
    };

    let top: Vec<PlayerId> = counts
        .iter()
        .filter(|&(_, &count)| count == max_count)
        .map(|(&target, _)| target)
        .collect();

    if top.len() > 1 {
        return TallyOutcome::Skip(SkipReason::Tie);
    }
    if skips >= max_count {
        return TallyOutcome::Skip(SkipReason::SkipMajority);
    }

    TallyOutcome::Eject(top[0])
}

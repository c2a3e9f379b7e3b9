//! Hands out ballots to voters.
//!
//! A voter is given a batch of teams to review at a time. Teams with the
//! fewest outstanding reviews are handed out first, so that every entry ends
//! up with a similar number of reviewers.

use std::cmp::Ordering;

use db::{
    ballot::{ballot_infos, Ballot, BallotInfo},
    event::EventId,
    team::Team,
    user::UserId,
    Database, Result,
};
use serde::Serialize;

use crate::results::{tally, TeamResult};

/// The number of ballots handed to a voter who has not yet reviewed that
/// many teams. Afterwards they get one ballot at a time.
pub const FIRST_BATCH_COUNT: usize = 3;

/// A voter's ballots, each list ordered by `Ballot::index`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Assignments {
    pub complete: Vec<BallotInfo>,
    pub incomplete: Vec<BallotInfo>,
}

/// Teams which should be reviewed next sort first: those with the fewest
/// pending reviews, then those with the fewest completed reviews.
pub fn review_priority(a: &TeamResult, b: &TeamResult) -> Ordering {
    (a.pending, a.complete).cmp(&(b.pending, b.complete))
}

/// The outcome of planning more work for a voter.
#[derive(Debug)]
pub(crate) struct Plan {
    pub assignments: Assignments,
    /// Ballots which have to be stored for the assignments to hold.
    pub created: Vec<Ballot>,
}

/// Decides which teams `voter` should review next, given every team and
/// ballot of the event.
pub(crate) fn plan(voter: UserId, teams: &[Team], ballots: &[Ballot]) -> Plan {
    let own = ballots
        .iter()
        .filter(|ballot| ballot.voter == voter)
        .cloned()
        .collect::<Vec<_>>();
    let (complete, mut incomplete): (Vec<_>, Vec<_>) =
        ballot_infos(teams, &own)
            .into_iter()
            .partition(|info| info.ballot.completed);

    if complete.len() + incomplete.len() >= FIRST_BATCH_COUNT
        && !incomplete.is_empty()
    {
        tracing::trace!(
            "Voter {voter} still has {} ballots to fill in",
            incomplete.len()
        );
        return Plan {
            assignments: Assignments {
                complete,
                incomplete,
            },
            created: vec![],
        };
    }

    let mut candidates = tally(teams, ballots);
    candidates.sort_by(review_priority);

    let need = if complete.len() >= FIRST_BATCH_COUNT {
        1
    } else {
        FIRST_BATCH_COUNT
    };

    let mut created = vec![];
    for candidate in candidates {
        if incomplete.len() >= need {
            break;
        }

        let team = candidate.team;
        if own.iter().any(|ballot| ballot.team == team.id) {
            continue;
        }
        if team.has_member(voter) {
            tracing::trace!("Skipping team {} of voter {voter}", team.id);
            continue;
        }
        if !team.has_submitted() {
            tracing::trace!("Skipping team {} without an entry", team.id);
            continue;
        }

        let index = (complete.len() + incomplete.len()) as i64;
        let ballot = Ballot::assigned(voter, team.id, index);
        created.push(ballot.clone());
        incomplete.push(BallotInfo { team, ballot });
    }

    Plan {
        assignments: Assignments {
            complete,
            incomplete,
        },
        created,
    }
}

/// Returns the ballots of `voter`, after handing them more teams to review
/// if they have run out of work.
///
/// Reading the current ballots and storing the new ones happens in a single
/// transaction, so concurrent calls for the same voter never hand out the
/// same team twice.
#[tracing::instrument(skip(db))]
pub fn assign_more(
    db: &Database,
    event_id: &EventId,
    voter: UserId,
) -> Result<Assignments> {
    db.transaction(|repo| {
        repo.event(event_id)?;
        let teams = repo.teams(event_id)?;
        let ballots = repo.ballots(event_id)?;

        let Plan {
            assignments,
            created,
        } = plan(voter, &teams, &ballots);
        if !created.is_empty() {
            repo.put_ballots(event_id, &created)?;
            tracing::info!(
                "Assigned {} ballots to voter {voter}",
                created.len()
            );
        }

        Ok(assignments)
    })
}

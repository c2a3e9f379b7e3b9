use serde::{Deserialize, Serialize};

use crate::{
    aspects::{Aspects, DEFAULT_ASPECTS},
    team::{Team, TeamId},
    user::UserId,
};

/// One voter's review of one team's entry.
///
/// There is at most one ballot per (event, voter, team).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: UserId,
    pub team: TeamId,
    /// The order in which the ballot was handed to the voter. Only used for
    /// presenting ballots in a stable order.
    pub index: i64,
    pub completed: bool,
    pub aspects: Aspects,
}

impl Ballot {
    /// A ballot handed to `voter` which they still have to fill in.
    pub fn assigned(voter: UserId, team: TeamId, index: i64) -> Self {
        Ballot {
            voter,
            team,
            index,
            completed: false,
            aspects: DEFAULT_ASPECTS,
        }
    }
}

/// A ballot together with the team it reviews.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallotInfo {
    pub team: Team,
    pub ballot: Ballot,
}

/// Pairs each ballot with its team, ordered by `Ballot::index`.
///
/// Ballots whose team cannot be found are dropped.
pub fn ballot_infos(teams: &[Team], ballots: &[Ballot]) -> Vec<BallotInfo> {
    let mut infos = ballots
        .iter()
        .filter_map(|ballot| {
            let team = teams.iter().find(|team| team.id == ballot.team);
            if team.is_none() {
                tracing::warn!(
                    "Ballot of voter {} refers to missing team {}",
                    ballot.voter,
                    ballot.team
                );
            }
            team.map(|team| BallotInfo {
                team: team.clone(),
                ballot: ballot.clone(),
            })
        })
        .collect::<Vec<_>>();
    infos.sort_by_key(|info| info.ballot.index);
    infos
}

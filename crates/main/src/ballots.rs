//! Submitting and looking up ballots.

use db::{
    ballot::{ballot_infos, Ballot, BallotInfo},
    event::EventId,
    team::TeamId,
    user::UserId,
    Database, Error, Result,
};

/// Stores a voter's review of a team.
///
/// The scores are forced into range and the overall score is recomputed
/// before the ballot is stored as completed. A ballot which was handed out
/// earlier keeps its position among the voter's ballots.
#[tracing::instrument(
    skip(db, ballot),
    fields(voter = %ballot.voter, team = %ballot.team)
)]
pub fn submit(
    db: &Database,
    event_id: &EventId,
    mut ballot: Ballot,
) -> Result<Ballot> {
    ballot.aspects.ensure_range();
    ballot.aspects.update_total();
    ballot.completed = true;

    db.transaction(|repo| {
        let event = repo.event(event_id)?;
        if !event.can_vote() {
            return Err(Error::validation("voting is not open for this event"));
        }

        let team = repo.team(event_id, ballot.team)?;
        if team.has_member(ballot.voter) {
            return Err(Error::validation("cannot review your own team"));
        }

        let mut stored = ballot.clone();
        let existing = repo.ballot(event_id, ballot.voter, ballot.team);
        stored.index = match existing {
            Ok(existing) => existing.index,
            Err(Error::NotFound) => repo
                .ballots(event_id)?
                .iter()
                .filter(|other| other.voter == ballot.voter)
                .count() as i64,
            Err(e) => return Err(e),
        };

        repo.put_ballots(event_id, std::slice::from_ref(&stored))?;
        Ok(stored)
    })
}

/// All ballots of `voter`, ordered by the order they were handed out in.
#[tracing::instrument(skip(db))]
pub fn user_ballots(
    db: &Database,
    event_id: &EventId,
    voter: UserId,
) -> Result<Vec<BallotInfo>> {
    db.read(|repo| {
        let teams = repo.teams(event_id)?;
        let ballots = repo
            .ballots(event_id)?
            .into_iter()
            .filter(|ballot| ballot.voter == voter)
            .collect::<Vec<_>>();
        Ok(ballot_infos(&teams, &ballots))
    })
}

#[tracing::instrument(skip(db))]
pub fn user_ballot(
    db: &Database,
    event_id: &EventId,
    voter: UserId,
    team: TeamId,
) -> Result<BallotInfo> {
    db.read(|repo| {
        let ballot = repo.ballot(event_id, voter, team)?;
        let team = repo.team(event_id, team)?;
        Ok(BallotInfo { team, ballot })
    })
}

//! Per-team results of an event.
//!
//! Ballots are grouped per team by [`tally`], which the assignment engine
//! shares, and averaged per voter class (judges and participants) by
//! [`average_scores`].

use std::cmp::Ordering;

use db::{
    aspects::{AspectKind, Aspects},
    ballot::Ballot,
    event::{Event, EventId},
    natural,
    team::Team,
    user::UserId,
    Database, Error, Result,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamResult {
    pub team: Team,
    /// Ballots by voters outside of the team.
    pub ballots: Vec<Ballot>,
    /// Ballots by members of the team. These never count towards the score.
    pub member_ballots: Vec<Ballot>,
    /// Completed ballots by voters outside of the team.
    pub complete: usize,
    /// Assigned, but not yet completed, ballots by voters outside of the team.
    pub pending: usize,

    pub average: Aspects,
    pub participant_average: Aspects,
    pub judge_average: Aspects,
}

impl TeamResult {
    fn new(team: Team) -> Self {
        TeamResult {
            team,
            ballots: vec![],
            member_ballots: vec![],
            complete: 0,
            pending: 0,
            average: Aspects::default(),
            participant_average: Aspects::default(),
            judge_average: Aspects::default(),
        }
    }

    /// Whether `voter` holds a ballot (complete or not) for this team.
    pub fn has_reviewer(&self, voter: UserId) -> bool {
        self.ballots
            .iter()
            .chain(&self.member_ballots)
            .any(|ballot| ballot.voter == voter)
    }

    fn overall(&self) -> f64 {
        self.average.score(AspectKind::Overall)
    }
}

/// Groups `ballots` by the team they review, one result per team in the
/// order of `teams`. Averages are left zeroed.
pub fn tally(teams: &[Team], ballots: &[Ballot]) -> Vec<TeamResult> {
    let mut results =
        teams.iter().cloned().map(TeamResult::new).collect::<Vec<_>>();

    for ballot in ballots {
        let Some(result) =
            results.iter_mut().find(|result| result.team.id == ballot.team)
        else {
            tracing::warn!(
                "Ignoring ballot of voter {} for missing team {}",
                ballot.voter,
                ballot.team
            );
            continue;
        };

        if result.team.has_member(ballot.voter) {
            result.member_ballots.push(ballot.clone());
            continue;
        }

        if ballot.completed {
            result.complete += 1;
        } else {
            result.pending += 1;
        }
        result.ballots.push(ballot.clone());
    }

    results
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Averages {
    pub overall: Aspects,
    pub participant: Aspects,
    pub judge: Aspects,
}

/// Averages the completed ballots among `ballots`, separately for the judges
/// of `event` and everyone else, and weighs the two by the event's judge
/// percentage.
pub fn average_scores(ballots: &[Ballot], event: &Event) -> Averages {
    let mut participant = Aspects::default();
    let mut participant_count = 0u32;
    let mut judge = Aspects::default();
    let mut judge_count = 0u32;

    for ballot in ballots.iter().filter(|ballot| ballot.completed) {
        if event.is_judge(ballot.voter) {
            judge.add(&ballot.aspects);
            judge_count += 1;
        } else {
            participant.add(&ballot.aspects);
            participant_count += 1;
        }
    }

    if participant_count > 0 {
        participant.scale(1.0 / f64::from(participant_count));
    }
    if judge_count > 0 {
        judge.scale(1.0 / f64::from(judge_count));
    }
    participant.clear_comments();
    judge.clear_comments();

    let overall = if event.judge_percentage == 0 {
        participant.clone()
    } else {
        let p = f64::from(event.judge_percentage) / 100.0;
        let mut overall = participant.scaled(1.0 - p);
        overall.add(&judge.scaled(p));
        overall
    };

    Averages {
        overall,
        participant,
        judge,
    }
}

/// Best result first; ties are ordered by team name.
fn cmp_ranking(a: &TeamResult, b: &TeamResult) -> Ordering {
    b.overall()
        .total_cmp(&a.overall())
        .then_with(|| natural::compare(&a.team.name, &b.team.name))
}

/// Computes the results of every team of the event.
///
/// This only reads. The reads are not isolated from concurrent submissions.
#[tracing::instrument(skip(db))]
pub fn results(db: &Database, event_id: &EventId) -> Result<Vec<TeamResult>> {
    let (event, teams, ballots) = db.read(|repo| {
        Ok((
            repo.event(event_id)?,
            repo.teams(event_id)?,
            repo.ballots(event_id)?,
        ))
    })?;

    let mut results = tally(&teams, &ballots);
    for result in &mut results {
        let averages = average_scores(&result.ballots, &event);
        result.average = averages.overall;
        result.participant_average = averages.participant;
        result.judge_average = averages.judge;
    }
    results.sort_by(cmp_ranking);

    tracing::trace!("Computed results for {} teams", results.len());
    Ok(results)
}

/// The results of an event as seen by `viewer`.
///
/// Organizers can always look at the results. Everyone else has to wait
/// until they are revealed, and does not get to read the comments.
#[tracing::instrument(skip(db))]
pub fn revealed_results(
    db: &Database,
    event_id: &EventId,
    viewer: Option<UserId>,
) -> Result<Vec<TeamResult>> {
    let event = db.read(|repo| repo.event(event_id))?;
    let organizer = viewer.is_some_and(|user| event.is_organizer(user));
    if !organizer && !event.revealed {
        return Err(Error::validation("results have not been revealed yet"));
    }

    let mut results = results(db, event_id)?;
    if !organizer {
        for result in &mut results {
            for ballot in
                result.ballots.iter_mut().chain(&mut result.member_ballots)
            {
                ballot.aspects.clear_comments();
            }
        }
    }
    Ok(results)
}

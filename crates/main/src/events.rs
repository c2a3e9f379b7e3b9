//! Managing events and the teams taking part in them.

use db::{
    event::{Event, EventId, Stage},
    team::{Team, TeamId},
    user::UserId,
    Database, Error, Result,
};
use serde::{Deserialize, Serialize};

#[tracing::instrument(skip(db, event), fields(event = %event.id))]
pub fn create_event(db: &Database, event: &Event) -> Result<()> {
    event.verify()?;
    db.transaction(|repo| repo.create_event(event))?;
    tracing::info!("Created event {}", event.id);
    Ok(())
}

pub fn event(db: &Database, id: &EventId) -> Result<Event> {
    db.read(|repo| repo.event(id))
}

/// Every event, the most recent one first.
pub fn events(db: &Database) -> Result<Vec<Event>> {
    Ok(events_sorted(db.read(|repo| repo.events())?))
}

#[tracing::instrument(skip(db, event), fields(event = %event.id))]
pub fn update_event(db: &Database, event: &Event) -> Result<()> {
    event.verify()?;
    db.transaction(|repo| repo.update_event(event))
}

/// Loads the event, applies `change` and stores the result, all in one
/// transaction.
fn modify_event<F>(
    db: &Database,
    id: &EventId,
    mut change: F,
) -> Result<Event>
where
    F: FnMut(&mut Event) -> Result<()>,
{
    db.transaction(|repo| {
        let mut event = repo.event(id)?;
        change(&mut event)?;
        event.verify()?;
        repo.update_event(&event)?;
        Ok(event)
    })
}

#[tracing::instrument(skip(db))]
pub fn set_stage(db: &Database, id: &EventId, stage: Stage) -> Result<Event> {
    let event = modify_event(db, id, |event| event.advance_to(stage))?;
    tracing::info!("Event {id} moved to {stage:?}");
    Ok(event)
}

#[tracing::instrument(skip(db))]
pub fn set_judge_percentage(
    db: &Database,
    id: &EventId,
    percentage: i64,
) -> Result<Event> {
    let percentage = u8::try_from(percentage)
        .ok()
        .filter(|percentage| *percentage <= 100)
        .ok_or_else(|| {
            Error::validation(format!(
                "judge percentage must be between 0 and 100, got {percentage}"
            ))
        })?;
    modify_event(db, id, |event| {
        event.judge_percentage = percentage;
        Ok(())
    })
}

/// Users to add to and remove from the jammers and judges of an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleChanges {
    pub jammers_added: Vec<UserId>,
    pub jammers_removed: Vec<UserId>,
    pub judges_added: Vec<UserId>,
    pub judges_removed: Vec<UserId>,
}

#[tracing::instrument(skip(db))]
pub fn update_roles(
    db: &Database,
    id: &EventId,
    changes: &RoleChanges,
) -> Result<Event> {
    modify_event(db, id, |event| {
        event.add_remove_jammers(
            &changes.jammers_added,
            &changes.jammers_removed,
        );
        event
            .add_remove_judges(&changes.judges_added, &changes.judges_removed);
        Ok(())
    })
}

/// Registers a team for the event. Once registration has closed only
/// administrators can still add teams.
#[tracing::instrument(skip(db, team), fields(team = %team.name))]
pub fn create_team(
    db: &Database,
    event_id: &EventId,
    team: &Team,
    as_admin: bool,
) -> Result<TeamId> {
    team.verify()?;
    let id = db.transaction(|repo| {
        let event = repo.event(event_id)?;
        if !event.can_register(as_admin) {
            return Err(Error::validation("registration is closed"));
        }
        repo.create_team(event_id, team)
    })?;
    tracing::info!("Registered team {id} for event {event_id}");
    Ok(id)
}

#[tracing::instrument(skip(db, team), fields(team = %team.id))]
pub fn update_team(
    db: &Database,
    event_id: &EventId,
    team: &Team,
) -> Result<()> {
    team.verify()?;
    db.transaction(|repo| repo.update_team(event_id, team))
}

#[tracing::instrument(skip(db))]
pub fn delete_team(
    db: &Database,
    event_id: &EventId,
    id: TeamId,
) -> Result<()> {
    db.transaction(|repo| repo.delete_team(event_id, id))
}

pub fn team(db: &Database, event_id: &EventId, id: TeamId) -> Result<Team> {
    db.read(|repo| repo.team(event_id, id))
}

/// The teams of an event, ordered by name.
pub fn teams(db: &Database, event_id: &EventId) -> Result<Vec<Team>> {
    let mut teams = db.read(|repo| repo.teams(event_id))?;
    teams.sort_by(Team::cmp_by_name);
    Ok(teams)
}

/// A team together with the event it takes part in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventTeam {
    pub event: Event,
    pub team: Team,
}

/// Every team `user` is a member of, across all events.
#[tracing::instrument(skip(db))]
pub fn teams_by_user(db: &Database, user: UserId) -> Result<Vec<EventTeam>> {
    db.read(|repo| {
        let mut found = vec![];
        for event in events_sorted(repo.events()?) {
            for team in repo.teams(&event.id)? {
                if team.has_member(user) {
                    found.push(EventTeam {
                        event: event.clone(),
                        team,
                    });
                }
            }
        }
        Ok(found)
    })
}

fn events_sorted(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by(Event::cmp_recent_first);
    events
}

//! Access to events, teams and ballots.
//!
//! The voting logic only talks to storage through [`Repository`]. The SQLite
//! implementation, [`SqliteRepo`], operates on a single connection; running a
//! sequence of calls atomically is the job of
//! [`Database::transaction`](crate::Database::transaction).

use diesel::{dsl::insert_into, prelude::*};
use itertools::Itertools;

use crate::{
    ballot::Ballot,
    error::{Error, Result},
    event::{Event, EventId},
    schema::{ballots, event_roles, events, team_members, teams},
    team::{Member, Team, TeamId},
    user::UserId,
};

mod rows;

use rows::{BallotRow, EventRow, MemberRow, NewRoleRow, NewTeamRow, TeamRow};

pub trait Repository {
    fn events(&mut self) -> Result<Vec<Event>>;
    fn event(&mut self, id: &EventId) -> Result<Event>;
    /// Fails with [`Error::AlreadyExists`] if the id is taken.
    fn create_event(&mut self, event: &Event) -> Result<()>;
    fn update_event(&mut self, event: &Event) -> Result<()>;

    fn teams(&mut self, event: &EventId) -> Result<Vec<Team>>;
    fn team(&mut self, event: &EventId, team: TeamId) -> Result<Team>;
    fn create_team(&mut self, event: &EventId, team: &Team) -> Result<TeamId>;
    fn update_team(&mut self, event: &EventId, team: &Team) -> Result<()>;
    /// Teams which have been reviewed cannot be deleted.
    fn delete_team(&mut self, event: &EventId, team: TeamId) -> Result<()>;

    /// All ballots of an event, including incomplete ones.
    fn ballots(&mut self, event: &EventId) -> Result<Vec<Ballot>>;
    fn ballot(
        &mut self,
        event: &EventId,
        voter: UserId,
        team: TeamId,
    ) -> Result<Ballot>;
    /// Inserts the ballots, replacing any existing ballot of the same voter
    /// for the same team.
    fn put_ballots(&mut self, event: &EventId, batch: &[Ballot]) -> Result<()>;
}

pub struct SqliteRepo<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqliteRepo<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        SqliteRepo { conn }
    }

    fn event_row(&mut self, id: &EventId) -> Result<Option<EventRow>> {
        Ok(events::table
            .find(id.as_str())
            .select(EventRow::as_select())
            .first::<EventRow>(self.conn)
            .optional()?)
    }

    fn load_event(&mut self, row: EventRow) -> Result<Event> {
        let roles = event_roles::table
            .filter(event_roles::event_id.eq(&row.id))
            .order_by((event_roles::role, event_roles::position))
            .select((event_roles::user_id, event_roles::role))
            .load::<(i64, String)>(self.conn)?;
        row.into_event(roles)
    }

    fn write_roles(&mut self, event: &Event) -> Result<()> {
        diesel::delete(
            event_roles::table
                .filter(event_roles::event_id.eq(event.id.as_str())),
        )
        .execute(self.conn)?;
        let roles = NewRoleRow::of_event(event);
        if !roles.is_empty() {
            insert_into(event_roles::table)
                .values(roles)
                .execute(self.conn)?;
        }
        Ok(())
    }

    fn write_members(
        &mut self,
        team: TeamId,
        members: &[Member],
    ) -> Result<()> {
        diesel::delete(
            team_members::table.filter(team_members::team_id.eq(team.0)),
        )
        .execute(self.conn)?;
        let rows = MemberRow::of_team(team, members);
        if !rows.is_empty() {
            insert_into(team_members::table)
                .values(rows)
                .execute(self.conn)?;
        }
        Ok(())
    }

    fn load_teams(&mut self, rows: Vec<TeamRow>) -> Result<Vec<Team>> {
        let ids = rows.iter().map(|row| row.id).collect::<Vec<_>>();
        let mut members = team_members::table
            .filter(team_members::team_id.eq_any(ids))
            .order_by((team_members::team_id, team_members::position))
            .select(MemberRow::as_select())
            .load::<MemberRow>(self.conn)?
            .into_iter()
            .map(|row| (row.team_id, row.into_member()))
            .into_group_map();

        rows.into_iter()
            .map(|row| {
                let members = members.remove(&row.id).unwrap_or_default();
                row.into_team(members)
            })
            .collect()
    }
}

impl Repository for SqliteRepo<'_> {
    #[tracing::instrument(skip(self))]
    fn events(&mut self) -> Result<Vec<Event>> {
        let rows = events::table
            .select(EventRow::as_select())
            .load::<EventRow>(self.conn)?;
        rows.into_iter().map(|row| self.load_event(row)).collect()
    }

    #[tracing::instrument(skip(self))]
    fn event(&mut self, id: &EventId) -> Result<Event> {
        let row = self.event_row(id)?.ok_or(Error::NotFound)?;
        self.load_event(row)
    }

    #[tracing::instrument(skip(self, event), fields(event = %event.id))]
    fn create_event(&mut self, event: &Event) -> Result<()> {
        event.verify()?;
        if self.event_row(&event.id)?.is_some() {
            return Err(Error::AlreadyExists);
        }

        insert_into(events::table)
            .values(EventRow::of_event(event))
            .execute(self.conn)?;
        self.write_roles(event)
    }

    #[tracing::instrument(skip(self, event), fields(event = %event.id))]
    fn update_event(&mut self, event: &Event) -> Result<()> {
        event.verify()?;
        let n = diesel::update(events::table.find(event.id.as_str()))
            .set(&EventRow::of_event(event))
            .execute(self.conn)?;
        if n == 0 {
            return Err(Error::NotFound);
        }
        self.write_roles(event)
    }

    #[tracing::instrument(skip(self))]
    fn teams(&mut self, event: &EventId) -> Result<Vec<Team>> {
        let rows = teams::table
            .filter(teams::event_id.eq(event.as_str()))
            .order_by(teams::id)
            .select(TeamRow::as_select())
            .load::<TeamRow>(self.conn)?;
        self.load_teams(rows)
    }

    #[tracing::instrument(skip(self))]
    fn team(&mut self, event: &EventId, team: TeamId) -> Result<Team> {
        let row = teams::table
            .filter(teams::event_id.eq(event.as_str()))
            .filter(teams::id.eq(team.0))
            .select(TeamRow::as_select())
            .first::<TeamRow>(self.conn)?;
        self.load_teams(vec![row])?
            .pop()
            .ok_or(Error::NotFound)
    }

    #[tracing::instrument(skip(self, team), fields(team = %team.name))]
    fn create_team(&mut self, event: &EventId, team: &Team) -> Result<TeamId> {
        if self.event_row(event)?.is_none() {
            return Err(Error::NotFound);
        }

        let id = insert_into(teams::table)
            .values(NewTeamRow::of_team(event, team))
            .returning(teams::id)
            .get_result::<i64>(self.conn)?;
        let id = TeamId(id);
        self.write_members(id, &team.members)?;

        tracing::trace!("Created team {id}");
        Ok(id)
    }

    #[tracing::instrument(skip(self, team), fields(team = %team.id))]
    fn update_team(&mut self, event: &EventId, team: &Team) -> Result<()> {
        let n = diesel::update(
            teams::table
                .filter(teams::event_id.eq(event.as_str()))
                .filter(teams::id.eq(team.id.0)),
        )
        .set(&NewTeamRow::of_team(event, team))
        .execute(self.conn)?;
        if n == 0 {
            return Err(Error::NotFound);
        }
        self.write_members(team.id, &team.members)
    }

    #[tracing::instrument(skip(self))]
    fn delete_team(&mut self, event: &EventId, team: TeamId) -> Result<()> {
        let reviews = ballots::table
            .filter(ballots::event_id.eq(event.as_str()))
            .filter(ballots::team_id.eq(team.0))
            .count()
            .get_result::<i64>(self.conn)?;
        if reviews > 0 {
            return Err(Error::validation(
                "team has already been reviewed and cannot be deleted",
            ));
        }

        diesel::delete(
            team_members::table.filter(team_members::team_id.eq(team.0)),
        )
        .execute(self.conn)?;
        let n = diesel::delete(
            teams::table
                .filter(teams::event_id.eq(event.as_str()))
                .filter(teams::id.eq(team.0)),
        )
        .execute(self.conn)?;
        if n == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn ballots(&mut self, event: &EventId) -> Result<Vec<Ballot>> {
        Ok(ballots::table
            .filter(ballots::event_id.eq(event.as_str()))
            .order_by((ballots::voter_id, ballots::idx))
            .select(BallotRow::as_select())
            .load::<BallotRow>(self.conn)?
            .into_iter()
            .map(BallotRow::into_ballot)
            .collect())
    }

    #[tracing::instrument(skip(self))]
    fn ballot(
        &mut self,
        event: &EventId,
        voter: UserId,
        team: TeamId,
    ) -> Result<Ballot> {
        let row = ballots::table
            .filter(ballots::event_id.eq(event.as_str()))
            .filter(ballots::voter_id.eq(voter.0))
            .filter(ballots::team_id.eq(team.0))
            .select(BallotRow::as_select())
            .first::<BallotRow>(self.conn)?;
        Ok(row.into_ballot())
    }

    #[tracing::instrument(skip(self, batch), fields(n = batch.len()))]
    fn put_ballots(&mut self, event: &EventId, batch: &[Ballot]) -> Result<()> {
        for ballot in batch {
            let row = BallotRow::of_ballot(event, ballot);
            insert_into(ballots::table)
                .values(&row)
                .on_conflict((
                    ballots::event_id,
                    ballots::voter_id,
                    ballots::team_id,
                ))
                .do_update()
                .set(&row)
                .execute(self.conn)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test_repo {
    use chrono::NaiveDate;

    use crate::{
        ballot::Ballot,
        error::Error,
        event::{Event, EventId},
        team::{Entry, Links, Member, Team, TeamId},
        test_util::temp_database,
        user::UserId,
    };

    fn event(id: &str) -> Event {
        let created = NaiveDate::from_ymd_opt(2024, 5, 4)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let mut event = Event::new(EventId::new(id).unwrap(), "Jam", created);
        event.judges = vec![UserId(7), UserId(3)];
        event.organizers = vec![UserId(1)];
        event
    }

    fn team(event: &Event, name: &str, members: &[i64]) -> Team {
        Team {
            id: TeamId(0),
            event: event.id.clone(),
            name: name.to_string(),
            members: members
                .iter()
                .map(|id| Member {
                    user: Some(UserId(*id)),
                    name: format!("user{id}"),
                })
                .collect(),
            entry: Entry {
                name: format!("{name} game"),
                info: String::new(),
                noncompeting: false,
                links: Links {
                    jam: Some("https://example.com/jam".to_string()),
                    ..Links::default()
                },
            },
        }
    }

    #[test]
    fn events_round_trip_with_roles_in_order() {
        let db = temp_database();
        let created = event("spring");
        db.transaction(|repo| repo.create_event(&created)).unwrap();

        let loaded = db.read(|repo| repo.event(&created.id)).unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.judges, vec![UserId(7), UserId(3)]);
    }

    #[test]
    fn duplicate_events_are_rejected() {
        let db = temp_database();
        let created = event("spring");
        db.transaction(|repo| repo.create_event(&created)).unwrap();

        let again = db.transaction(|repo| repo.create_event(&created));
        assert!(matches!(again, Err(Error::AlreadyExists)));
    }

    #[test]
    fn missing_rows_are_not_found() {
        let db = temp_database();
        let id = EventId::new("nothing-here").unwrap();
        assert!(matches!(
            db.read(|repo| repo.event(&id)),
            Err(Error::NotFound)
        ));
        assert!(matches!(
            db.read(|repo| repo.team(&id, TeamId(4))),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn teams_keep_member_order() {
        let db = temp_database();
        let created = event("spring");
        let id = db
            .transaction(|repo| {
                repo.create_event(&created)?;
                repo.create_team(&created.id, &team(&created, "b", &[9, 2, 5]))
            })
            .unwrap();

        let loaded = db.read(|repo| repo.team(&created.id, id)).unwrap();
        let users = loaded
            .members
            .iter()
            .map(|member| member.user)
            .collect::<Vec<_>>();
        assert_eq!(
            users,
            vec![Some(UserId(9)), Some(UserId(2)), Some(UserId(5))]
        );
        assert_eq!(loaded.id, id);
    }

    #[test]
    fn put_ballots_replaces_existing_ballot() {
        let db = temp_database();
        let created = event("spring");
        let team_id = db
            .transaction(|repo| {
                repo.create_event(&created)?;
                repo.create_team(&created.id, &team(&created, "a", &[1]))
            })
            .unwrap();

        let assigned = Ballot::assigned(UserId(2), team_id, 0);
        let mut completed = assigned.clone();
        completed.completed = true;
        completed.aspects.theme.score = 5.0;

        db.transaction(|repo| {
            repo.put_ballots(&created.id, std::slice::from_ref(&assigned))
        })
        .unwrap();
        db.transaction(|repo| {
            repo.put_ballots(&created.id, std::slice::from_ref(&completed))
        })
        .unwrap();

        let ballots = db.read(|repo| repo.ballots(&created.id)).unwrap();
        assert_eq!(ballots, vec![completed]);
    }

    #[test]
    fn reviewed_teams_cannot_be_deleted() {
        let db = temp_database();
        let created = event("spring");
        let (reviewed, unreviewed) = db
            .transaction(|repo| {
                repo.create_event(&created)?;
                let a =
                    repo.create_team(&created.id, &team(&created, "a", &[1]))?;
                let b =
                    repo.create_team(&created.id, &team(&created, "b", &[2]))?;
                repo.put_ballots(
                    &created.id,
                    &[Ballot::assigned(UserId(2), a, 0)],
                )?;
                Ok((a, b))
            })
            .unwrap();

        let deleted =
            db.transaction(|repo| repo.delete_team(&created.id, reviewed));
        assert!(matches!(deleted, Err(Error::Validation(_))));

        db.transaction(|repo| repo.delete_team(&created.id, unreviewed))
            .unwrap();
        let teams = db.read(|repo| repo.teams(&created.id)).unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].id, reviewed);
    }

    #[test]
    fn failed_work_is_rolled_back() {
        let db = temp_database();
        let created = event("spring");
        let outcome: crate::Result<()> = db.transaction(|repo| {
            repo.create_event(&created)?;
            Err(Error::validation("abort"))
        });
        assert!(outcome.is_err());
        assert!(db.read(|repo| repo.events()).unwrap().is_empty());
    }

    #[test]
    fn repeated_judges_fail_without_retrying() {
        let db = temp_database();
        let mut created = event("summer");
        created.judges = vec![UserId(7), UserId(7)];

        let mut calls = 0;
        let outcome = db.transaction(|repo| {
            calls += 1;
            repo.create_event(&created)
        });
        assert!(matches!(outcome, Err(Error::Validation(_))));
        assert_eq!(calls, 1);
        assert!(db.read(|repo| repo.events()).unwrap().is_empty());
    }
}

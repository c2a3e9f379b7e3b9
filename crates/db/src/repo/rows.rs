//! Row types, and conversions between rows and the domain types.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::{
    aspects::{Aspect, Aspects},
    ballot::Ballot,
    error::{Error, Result},
    event::{Event, EventId},
    schema::{ballots, event_roles, events, team_members, teams},
    team::{Entry, Links, Member, Team, TeamId},
    user::UserId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Role {
    Organizer,
    Judge,
    Jammer,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::Organizer => "organizer",
            Role::Judge => "judge",
            Role::Jammer => "jammer",
        }
    }

    fn parse(role: &str) -> Result<Self> {
        match role {
            "organizer" => Ok(Role::Organizer),
            "judge" => Ok(Role::Judge),
            "jammer" => Ok(Role::Jammer),
            other => Err(corrupt(format!("unknown event role {other:?}"))),
        }
    }
}

fn corrupt(message: String) -> Error {
    Error::Storage(message.into())
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub(super) struct EventRow {
    pub id: String,
    pub name: String,
    pub theme: String,
    pub info: String,
    pub created_at: NaiveDateTime,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub registration: bool,
    pub voting: bool,
    pub closed: bool,
    pub revealed: bool,
    pub judge_percentage: i64,
}

impl EventRow {
    pub fn of_event(event: &Event) -> Self {
        EventRow {
            id: event.id.to_string(),
            name: event.name.clone(),
            theme: event.theme.clone(),
            info: event.info.clone(),
            created_at: event.created_at,
            start_time: event.start_time,
            end_time: event.end_time,
            registration: event.registration,
            voting: event.voting,
            closed: event.closed,
            revealed: event.revealed,
            judge_percentage: i64::from(event.judge_percentage),
        }
    }

    /// Builds the event from this row and its `(user_id, role)` rows, which
    /// must already be in position order.
    pub fn into_event(self, roles: Vec<(i64, String)>) -> Result<Event> {
        let judge_percentage =
            u8::try_from(self.judge_percentage).map_err(|_| {
                corrupt(format!(
                    "judge percentage {} of event {} is out of range",
                    self.judge_percentage, self.id
                ))
            })?;

        let mut event = Event {
            id: EventId::new(self.id)?,
            name: self.name,
            theme: self.theme,
            info: self.info,
            created_at: self.created_at,
            start_time: self.start_time,
            end_time: self.end_time,
            registration: self.registration,
            voting: self.voting,
            closed: self.closed,
            revealed: self.revealed,
            judge_percentage,
            organizers: vec![],
            judges: vec![],
            jammers: vec![],
        };

        for (user_id, role) in roles {
            let list = match Role::parse(&role)? {
                Role::Organizer => &mut event.organizers,
                Role::Judge => &mut event.judges,
                Role::Jammer => &mut event.jammers,
            };
            list.push(UserId(user_id));
        }

        Ok(event)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = event_roles)]
pub(super) struct NewRoleRow<'a> {
    pub event_id: &'a str,
    pub user_id: i64,
    pub role: &'static str,
    pub position: i64,
}

impl<'a> NewRoleRow<'a> {
    pub fn of_event(event: &'a Event) -> Vec<Self> {
        [
            (Role::Organizer, &event.organizers),
            (Role::Judge, &event.judges),
            (Role::Jammer, &event.jammers),
        ]
        .into_iter()
        .flat_map(|(role, users)| {
            users.iter().enumerate().map(move |(position, user)| {
                NewRoleRow {
                    event_id: event.id.as_str(),
                    user_id: user.0,
                    role: role.as_str(),
                    position: position as i64,
                }
            })
        })
        .collect()
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = teams)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(super) struct TeamRow {
    pub id: i64,
    pub event_id: String,
    pub name: String,
    pub entry_name: String,
    pub entry_info: String,
    pub noncompeting: bool,
    pub jam_link: Option<String>,
    pub download_link: Option<String>,
    pub page_link: Option<String>,
}

impl TeamRow {
    pub fn into_team(self, members: Vec<Member>) -> Result<Team> {
        Ok(Team {
            id: TeamId(self.id),
            event: EventId::new(self.event_id)?,
            name: self.name,
            members,
            entry: Entry {
                name: self.entry_name,
                info: self.entry_info,
                noncompeting: self.noncompeting,
                links: Links {
                    jam: self.jam_link,
                    download: self.download_link,
                    page: self.page_link,
                },
            },
        })
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = teams)]
#[diesel(treat_none_as_null = true)]
pub(super) struct NewTeamRow<'a> {
    pub event_id: &'a str,
    pub name: &'a str,
    pub entry_name: &'a str,
    pub entry_info: &'a str,
    pub noncompeting: bool,
    pub jam_link: Option<&'a str>,
    pub download_link: Option<&'a str>,
    pub page_link: Option<&'a str>,
}

impl<'a> NewTeamRow<'a> {
    pub fn of_team(event: &'a EventId, team: &'a Team) -> Self {
        NewTeamRow {
            event_id: event.as_str(),
            name: &team.name,
            entry_name: &team.entry.name,
            entry_info: &team.entry.info,
            noncompeting: team.entry.noncompeting,
            jam_link: team.entry.links.jam.as_deref(),
            download_link: team.entry.links.download.as_deref(),
            page_link: team.entry.links.page.as_deref(),
        }
    }
}

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = team_members)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(super) struct MemberRow {
    pub team_id: i64,
    pub position: i64,
    pub user_id: Option<i64>,
    pub name: String,
}

impl MemberRow {
    pub fn of_team(team: TeamId, members: &[Member]) -> Vec<Self> {
        members
            .iter()
            .enumerate()
            .map(|(position, member)| MemberRow {
                team_id: team.0,
                position: position as i64,
                user_id: member.user.map(|user| user.0),
                name: member.name.clone(),
            })
            .collect()
    }

    pub fn into_member(self) -> Member {
        Member {
            user: self.user_id.map(UserId),
            name: self.name,
        }
    }
}

#[derive(Debug, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = ballots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(super) struct BallotRow {
    pub event_id: String,
    pub voter_id: i64,
    pub team_id: i64,
    pub idx: i64,
    pub completed: bool,
    pub theme_score: f64,
    pub theme_comment: String,
    pub enjoyment_score: f64,
    pub enjoyment_comment: String,
    pub aesthetics_score: f64,
    pub aesthetics_comment: String,
    pub innovation_score: f64,
    pub innovation_comment: String,
    pub bonus_score: f64,
    pub bonus_comment: String,
    pub overall_score: f64,
    pub overall_comment: String,
}

impl BallotRow {
    pub fn of_ballot(event: &EventId, ballot: &Ballot) -> Self {
        let aspects = ballot.aspects.clone();
        BallotRow {
            event_id: event.to_string(),
            voter_id: ballot.voter.0,
            team_id: ballot.team.0,
            idx: ballot.index,
            completed: ballot.completed,
            theme_score: aspects.theme.score,
            theme_comment: aspects.theme.comment,
            enjoyment_score: aspects.enjoyment.score,
            enjoyment_comment: aspects.enjoyment.comment,
            aesthetics_score: aspects.aesthetics.score,
            aesthetics_comment: aspects.aesthetics.comment,
            innovation_score: aspects.innovation.score,
            innovation_comment: aspects.innovation.comment,
            bonus_score: aspects.bonus.score,
            bonus_comment: aspects.bonus.comment,
            overall_score: aspects.overall.score,
            overall_comment: aspects.overall.comment,
        }
    }

    pub fn into_ballot(self) -> Ballot {
        Ballot {
            voter: UserId(self.voter_id),
            team: TeamId(self.team_id),
            index: self.idx,
            completed: self.completed,
            aspects: Aspects {
                theme: Aspect {
                    score: self.theme_score,
                    comment: self.theme_comment,
                },
                enjoyment: Aspect {
                    score: self.enjoyment_score,
                    comment: self.enjoyment_comment,
                },
                aesthetics: Aspect {
                    score: self.aesthetics_score,
                    comment: self.aesthetics_comment,
                },
                innovation: Aspect {
                    score: self.innovation_score,
                    comment: self.innovation_comment,
                },
                bonus: Aspect {
                    score: self.bonus_score,
                    comment: self.bonus_comment,
                },
                overall: Aspect {
                    score: self.overall_score,
                    comment: self.overall_comment,
                },
            },
        }
    }
}

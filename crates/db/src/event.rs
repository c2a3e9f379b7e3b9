use std::{cmp::Ordering, fmt};

use chrono::NaiveDateTime;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    user::{add_remove_users, contains_user, UserId},
};

/// A URL-safe slug identifying an event, e.g. `ocean-depths`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct EventId(String);

impl EventId {
    /// Only lowercase letters, digits and dashes are allowed.
    pub fn is_valid(id: &str) -> bool {
        static RE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());
        RE.is_match(id)
    }

    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if EventId::is_valid(&id) {
            Ok(EventId(id))
        } else {
            Err(Error::validation(format!("invalid event id {id:?}")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EventId {
    type Error = Error;

    fn try_from(id: String) -> Result<Self> {
        EventId::new(id)
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> String {
        id.0
    }
}

/// The stages an event moves through, in order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Stage {
    Registration,
    Voting,
    Closed,
    Revealed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub theme: String,
    pub info: String,

    pub created_at: NaiveDateTime,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,

    /// New teams may register.
    pub registration: bool,
    /// Ballots may be assigned and submitted.
    pub voting: bool,
    /// No further entries or ballots are accepted.
    pub closed: bool,
    /// Results are publicly viewable.
    pub revealed: bool,

    /// How much of the final score comes from judges, between 0 and 100.
    pub judge_percentage: u8,

    pub organizers: Vec<UserId>,
    pub judges: Vec<UserId>,
    pub jammers: Vec<UserId>,
}

impl Event {
    /// A new event, open for registration.
    pub fn new(
        id: EventId,
        name: impl Into<String>,
        created_at: NaiveDateTime,
    ) -> Self {
        Event {
            id,
            name: name.into(),
            theme: String::new(),
            info: String::new(),
            created_at,
            start_time: None,
            end_time: None,
            registration: true,
            voting: false,
            closed: false,
            revealed: false,
            judge_percentage: 0,
            organizers: vec![],
            judges: vec![],
            jammers: vec![],
        }
    }

    pub fn verify(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("event name cannot be empty"));
        }
        if self.judge_percentage > 100 {
            return Err(Error::validation(
                "judge percentage must be between 0 and 100",
            ));
        }
        for (role, users) in [
            ("organizer", &self.organizers),
            ("judge", &self.judges),
            ("jammer", &self.jammers),
        ] {
            if !users.iter().all_unique() {
                return Err(Error::validation(format!(
                    "a user is listed more than once as {role}"
                )));
            }
        }
        Ok(())
    }

    pub fn can_vote(&self) -> bool {
        self.voting && !self.closed
    }

    pub fn can_register(&self, is_admin: bool) -> bool {
        is_admin || (!self.closed && self.registration)
    }

    pub fn has_jammer(&self, user: UserId) -> bool {
        contains_user(&self.jammers, user)
    }

    pub fn is_judge(&self, user: UserId) -> bool {
        contains_user(&self.judges, user)
    }

    pub fn is_organizer(&self, user: UserId) -> bool {
        contains_user(&self.organizers, user)
    }

    pub fn add_remove_jammers(&mut self, added: &[UserId], removed: &[UserId]) {
        self.jammers = add_remove_users(&self.jammers, added, removed);
    }

    pub fn add_remove_judges(&mut self, added: &[UserId], removed: &[UserId]) {
        self.judges = add_remove_users(&self.judges, added, removed);
    }

    pub fn stage(&self) -> Stage {
        if self.revealed {
            Stage::Revealed
        } else if self.closed {
            Stage::Closed
        } else if self.voting {
            Stage::Voting
        } else {
            Stage::Registration
        }
    }

    /// Moves the event to `stage`. Stages only ever move forward.
    pub fn advance_to(&mut self, stage: Stage) -> Result<()> {
        if stage < self.stage() {
            return Err(Error::validation(format!(
                "cannot move event from {:?} back to {:?}",
                self.stage(),
                stage
            )));
        }

        let (registration, voting, closed, revealed) = match stage {
            Stage::Registration => (true, false, false, false),
            Stage::Voting => (false, true, false, false),
            Stage::Closed => (false, false, true, false),
            Stage::Revealed => (false, false, true, true),
        };
        self.registration = registration;
        self.voting = voting;
        self.closed = closed;
        self.revealed = revealed;
        Ok(())
    }

    fn effective_start(&self) -> NaiveDateTime {
        self.start_time.unwrap_or(self.created_at)
    }

    /// Orders events for listing: the most recently started event first.
    pub fn cmp_recent_first(&self, other: &Event) -> Ordering {
        other.effective_start().cmp(&self.effective_start())
    }
}

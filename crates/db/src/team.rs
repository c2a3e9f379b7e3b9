use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    error::{Error, Result},
    event::EventId,
    natural,
    user::UserId,
};

/// Hard limit on the number of members in a team.
pub const MAX_TEAM_MEMBERS: usize = 9;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct TeamId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A member of a team. Not every member needs to be a registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user: Option<UserId>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    pub jam: Option<String>,
    pub download: Option<String>,
    pub page: Option<String>,
}

impl Links {
    fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("jam", &self.jam),
            ("download", &self.download),
            ("page", &self.page),
        ]
        .into_iter()
        .filter_map(|(name, link)| {
            link.as_deref()
                .map(str::trim)
                .filter(|link| !link.is_empty())
                .map(|link| (name, link))
        })
    }
}

/// What a team submits to the jam.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub info: String,
    /// The entry is shown and reviewed, but does not compete for prizes.
    pub noncompeting: bool,
    pub links: Links,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub event: EventId,
    pub name: String,
    pub members: Vec<Member>,
    pub entry: Entry,
}

impl Team {
    /// Whether `user` is one of the members of this team.
    pub fn has_member(&self, user: UserId) -> bool {
        self.members.iter().any(|member| member.user == Some(user))
    }

    /// Whether the team has submitted enough information about their entry
    /// for it to be reviewed.
    pub fn has_submitted(&self) -> bool {
        !self.entry.name.trim().is_empty()
            && self.entry.links.iter().next().is_some()
    }

    /// Whether the team takes part in the prizes.
    pub fn is_competing(&self) -> bool {
        self.has_submitted() && !self.entry.noncompeting
    }

    pub fn verify(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("team name cannot be empty"));
        }
        if self.members.is_empty() {
            return Err(Error::validation(
                "team must have at least one member",
            ));
        }
        if self.members.len() > MAX_TEAM_MEMBERS {
            return Err(Error::validation(format!(
                "team cannot have more than {MAX_TEAM_MEMBERS} members"
            )));
        }

        for (name, link) in self.entry.links.iter() {
            let url = Url::parse(link).map_err(|err| {
                Error::validation(format!("invalid {name} link: {err}"))
            })?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(Error::validation(format!(
                    "invalid {name} link: must be http or https"
                )));
            }
        }

        Ok(())
    }

    /// Natural ordering by team name.
    pub fn cmp_by_name(&self, other: &Team) -> Ordering {
        natural::compare(&self.name, &other.name)
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[cfg(test)]
mod test_team {
    use super::{Entry, Links, Member, Team, TeamId};
    use crate::{event::EventId, user::UserId};

    fn team(download: Option<&str>) -> Team {
        Team {
            id: TeamId(1),
            event: EventId::new("tiny-worlds").unwrap(),
            name: "Cache Cats".to_string(),
            members: vec![
                Member {
                    user: Some(UserId(4)),
                    name: "Diana".to_string(),
                },
                Member {
                    user: None,
                    name: "A friend".to_string(),
                },
            ],
            entry: Entry {
                name: "Orb Orbit".to_string(),
                info: String::new(),
                noncompeting: false,
                links: Links {
                    download: download.map(str::to_string),
                    ..Links::default()
                },
            },
        }
    }

    #[test]
    fn submission_requires_a_link() {
        assert!(team(Some("https://example.com/orb-orbit")).has_submitted());
        assert!(!team(None).has_submitted());
        assert!(!team(Some("   ")).has_submitted());
    }

    #[test]
    fn noncompeting_entries_are_not_competing() {
        let mut team = team(Some("https://example.com/orb-orbit"));
        assert!(team.is_competing());
        team.entry.noncompeting = true;
        assert!(!team.is_competing());
        assert!(team.has_submitted());
    }

    #[test]
    fn members_without_accounts_never_match() {
        let team = team(None);
        assert!(team.has_member(UserId(4)));
        assert!(!team.has_member(UserId(5)));
    }

    #[test]
    fn links_must_be_http() {
        assert!(team(Some("https://example.com/orb-orbit")).verify().is_ok());
        assert!(team(Some("ftp://example.com/orb-orbit")).verify().is_err());
        assert!(team(Some("not a url")).verify().is_err());
    }

    #[test]
    fn teams_need_members() {
        let mut team = team(None);
        team.members.clear();
        assert!(team.verify().is_err());
    }
}

use std::collections::{BTreeSet, HashMap};

use arbitrary::Arbitrary;
use chrono::NaiveDate;
use db::{
    aspects::{AspectKind, Aspects},
    ballot::Ballot,
    event::{Event, EventId, Stage},
    team::{Entry, Links, Member, Team, TeamId},
    user::UserId,
    Database, Error,
};
use serde::{Deserialize, Serialize};

use crate::{
    assignment::{assign_more, FIRST_BATCH_COUNT},
    ballots::{submit, user_ballots},
};

/// Users `1..=USERS` take part in the simulated event.
const USERS: i64 = 8;

#[derive(Debug, Clone, Arbitrary, Serialize, Deserialize)]
pub enum Action {
    AssignMore {
        voter: u8,
    },
    /// Fills in one of the voter's incomplete ballots. Without aspects the
    /// ballot is submitted with the scores it was handed out with.
    Complete {
        voter: u8,
        nth: u8,
        aspects: Option<Aspects>,
    },
    /// Submits a ballot for a team, whether or not it was handed out.
    Submit {
        voter: u8,
        team: u8,
        aspects: Option<Aspects>,
    },
}

/// The state of the model, next to the database it mirrors.
pub struct State<'db> {
    db: &'db Database,
    event: EventId,
    teams: Vec<Team>,
    /// Whether the ballot of a voter for a team has been completed.
    ballots: HashMap<(UserId, TeamId), bool>,
}

fn voter(raw: u8) -> UserId {
    UserId(i64::from(raw) % USERS + 1)
}

fn team(name: &str, members: &[i64], submitted: bool) -> Team {
    Team {
        id: TeamId(0),
        event: EventId::new("model").unwrap(),
        name: name.to_string(),
        members: members
            .iter()
            .map(|id| Member {
                user: Some(UserId(*id)),
                name: format!("user {id}"),
            })
            .chain(std::iter::once(Member {
                user: None,
                name: "guest".to_string(),
            }))
            .collect(),
        entry: Entry {
            name: if submitted {
                format!("{name} game")
            } else {
                String::new()
            },
            info: String::new(),
            noncompeting: false,
            links: Links {
                page: Some("https://example.com/page".to_string()),
                ..Links::default()
            },
        },
    }
}

impl<'db> State<'db> {
    /// Sets up an event which is open for voting, with a handful of teams.
    /// Users 7 and 8 are not in any team.
    pub fn new(db: &'db Database) -> Self {
        let created = NaiveDate::from_ymd_opt(2024, 4, 20)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap();
        let mut event =
            Event::new(EventId::new("model").unwrap(), "Model", created);
        event.advance_to(Stage::Voting).unwrap();
        event.jammers = (1..=USERS).map(UserId).collect();
        event.judges = vec![UserId(8)];

        let mut teams = vec![
            team("one", &[1, 2], true),
            team("two", &[3], true),
            team("three", &[4, 5], true),
            team("four", &[6], false),
            team("five", &[], true),
            team("six", &[2], true),
        ];
        db.transaction(|repo| {
            repo.create_event(&event)?;
            for team in teams.iter_mut() {
                team.id = repo.create_team(&event.id, team)?;
            }
            Ok(())
        })
        .unwrap();

        State {
            db,
            event: event.id,
            teams,
            ballots: HashMap::new(),
        }
    }

    pub fn run(&mut self, actions: &[Action]) {
        for action in actions {
            self.step(action);
            self.check();
        }
    }

    fn own(&self, voter: UserId) -> (usize, BTreeSet<TeamId>) {
        let mut complete = 0;
        let mut incomplete = BTreeSet::new();
        for ((v, team), completed) in &self.ballots {
            if *v != voter {
                continue;
            }
            if *completed {
                complete += 1;
            } else {
                incomplete.insert(*team);
            }
        }
        (complete, incomplete)
    }

    fn step(&mut self, action: &Action) {
        match action {
            Action::AssignMore { voter: raw } => self.assign_more(voter(*raw)),
            Action::Complete {
                voter: raw,
                nth,
                aspects,
            } => {
                let voter = voter(*raw);
                let incomplete = user_ballots(self.db, &self.event, voter)
                    .unwrap()
                    .into_iter()
                    .filter(|info| !info.ballot.completed)
                    .collect::<Vec<_>>();
                if incomplete.is_empty() {
                    return;
                }
                let nth = *nth as usize % incomplete.len();
                let mut ballot = incomplete[nth].ballot.clone();
                if let Some(aspects) = aspects {
                    ballot.aspects = aspects.clone();
                }
                self.submit(ballot);
            }
            Action::Submit {
                voter: raw,
                team,
                aspects,
            } => {
                let team = &self.teams[*team as usize % self.teams.len()];
                let mut ballot = Ballot::assigned(voter(*raw), team.id, 0);
                if let Some(aspects) = aspects {
                    ballot.aspects = aspects.clone();
                }
                self.submit(ballot);
            }
        }
    }

    fn assign_more(&mut self, voter: UserId) {
        let (complete, incomplete) = self.own(voter);
        let throttled = complete + incomplete.len() >= FIRST_BATCH_COUNT
            && !incomplete.is_empty();
        let need = if complete >= FIRST_BATCH_COUNT {
            1
        } else {
            FIRST_BATCH_COUNT
        };
        let eligible = self
            .teams
            .iter()
            .filter(|team| {
                team.has_submitted()
                    && !team.has_member(voter)
                    && !self.ballots.contains_key(&(voter, team.id))
            })
            .count();

        let assignments = assign_more(self.db, &self.event, voter).unwrap();
        let returned = assignments
            .incomplete
            .iter()
            .map(|info| info.ballot.team)
            .collect::<BTreeSet<_>>();

        if throttled {
            assert_eq!(returned, incomplete, "throttled voter got more work");
        } else {
            let expected =
                incomplete.len().max(need.min(incomplete.len() + eligible));
            assert_eq!(returned.len(), expected);
            assert!(returned.is_superset(&incomplete));
        }
        assert_eq!(assignments.complete.len(), complete);

        for team in returned {
            self.ballots.entry((voter, team)).or_insert(false);
        }
    }

    fn submit(&mut self, ballot: Ballot) {
        let key = (ballot.voter, ballot.team);
        let own_team = self
            .teams
            .iter()
            .find(|team| team.id == ballot.team)
            .unwrap()
            .has_member(ballot.voter);

        match submit(self.db, &self.event, ballot) {
            Ok(stored) => {
                assert!(!own_team);
                assert!(stored.completed);
                assert_eq!(
                    stored.aspects.overall.score,
                    stored.aspects.total()
                );
                self.ballots.insert(key, true);
            }
            Err(Error::Validation(_)) => assert!(own_team),
            Err(e) => panic!("unexpected error when submitting: {e}"),
        }
    }

    /// Compares the stored ballots with the model, and checks the rules every
    /// ballot has to follow.
    fn check(&self) {
        let stored = self
            .db
            .read(|repo| repo.ballots(&self.event))
            .unwrap();

        let mut seen = HashMap::new();
        let mut indices: HashMap<UserId, BTreeSet<i64>> = HashMap::new();
        for ballot in &stored {
            let team = self
                .teams
                .iter()
                .find(|team| team.id == ballot.team)
                .unwrap();
            assert!(
                !team.has_member(ballot.voter),
                "voter {} reviews their own team",
                ballot.voter
            );
            if !ballot.completed {
                assert!(team.has_submitted(), "assigned a team without entry");
            }
            for kind in AspectKind::ALL {
                if !ballot.completed && kind == AspectKind::Overall {
                    continue;
                }
                let range = kind.range();
                let score = ballot.aspects.score(kind);
                assert!(score >= range.min && score <= range.max);
            }
            assert!(
                seen.insert((ballot.voter, ballot.team), ballot.completed)
                    .is_none(),
                "duplicate ballot"
            );
            indices.entry(ballot.voter).or_default().insert(ballot.index);
        }
        assert_eq!(seen, self.ballots);

        for indices in indices.values() {
            let expected = (0..indices.len() as i64).collect::<BTreeSet<_>>();
            assert_eq!(*indices, expected);
        }
    }
}

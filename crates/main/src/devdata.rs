//! Demo data for local development.
//!
//! Everything is derived from fixed seeds, so two databases seeded at the
//! same time hold the same events, teams and ballots.

use std::{collections::HashMap, f64::consts::PI};

use chrono::{Duration, NaiveDateTime};
use db::{
    aspects::{Aspect, AspectKind, Aspects},
    ballot::Ballot,
    event::{Event, EventId, Stage},
    team::{Entry, Links, Member, Team, TeamId},
    user::UserId,
    Database, Repository, Result,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

const USER_NAMES: [&str; 50] = [
    "Admin", "Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace",
    "Hank", "Ivy", "Jack", "Karen", "Leo", "Mona", "Nate", "Olivia", "Pete",
    "Quinn", "Ruby", "Sam", "Tina", "Ulysses", "Vera", "Walt", "Xena", "Yuri",
    "Zara", "Amber", "Blake", "Cleo", "Derek", "Elsa", "Felix", "Gina", "Hugo",
    "Iris", "Jasper", "Kira", "Liam", "Maya", "Noah", "Opal", "Piper", "Reed",
    "Sage", "Troy", "Uma", "Vince", "Wren", "Zelda",
];

const TEAM_NAMES: [&str; 48] = [
    "Pixel Pirates", "Code Wizards", "Byte Busters", "Dream Weavers",
    "Neon Coders", "Glitch Goblins", "Logic Lords", "Turbo Turtles",
    "Data Dragons", "Sprite Smiths", "Shader Sharks", "Vector Vikings",
    "Kernel Knights", "Raster Rebels", "Mesh Mages", "Voxel Vandals",
    "Loot Llamas", "Bug Bashers", "Frame Fighters", "Stack Samurai",
    "Null Knights", "Poly Phantoms", "Render Rangers", "Bit Bandits",
    "Hex Heroes", "Cache Cats", "Loop Legends", "Spawn Scouts",
    "Flux Foxes", "Warp Wolves", "Ping Pandas", "Debug Demons",
    "Sync Serpents", "Node Nomads", "Frag Falcons", "Query Queens",
    "Drift Droids", "Parse Parrots", "Crypt Crows", "Blaze Bots",
    "Tilt Titans", "Rust Raiders", "Jam Jackals", "Core Cobras",
    "Echo Eagles", "Zoom Zombies", "Grind Griffins", "Mana Monkeys",
];

const GAME_NAMES: [&str; 40] = [
    "Starbound Escape", "Dungeon Pulse", "Chrono Drift", "Shadow Sprint",
    "Neon Blitz", "Frost Forge", "Pixel Storm", "Void Walker",
    "Flame Dash", "Crystal Caves", "Astro Hop", "Lava Loop",
    "Cyber Slice", "Dream Dash", "Ether Edge", "Fury Flight",
    "Glyph Guard", "Hex Hunt", "Ion Ignite", "Jade Jump",
    "Kinetic Keep", "Luna Lash", "Mist March", "Nova Nudge",
    "Orb Orbit", "Prism Prowl", "Quake Quest", "Rift Run",
    "Spark Surge", "Terra Twist", "Ultra Unity", "Volt Vault",
    "Wave Whirl", "Xenon Xing", "Yonder Yell", "Zephyr Zone",
    "Amber Arc", "Blaze Bolt", "Coral Crash", "Dune Dive",
];

struct EventDef {
    id: &'static str,
    name: &'static str,
    theme: &'static str,
    stage: Stage,
    /// Days since the jam ended. Negative for jams still to come.
    ended_days_ago: i64,
}

const fn def(
    id: &'static str,
    name: &'static str,
    theme: &'static str,
    stage: Stage,
    ended_days_ago: i64,
) -> EventDef {
    EventDef {
        id,
        name,
        theme,
        stage,
        ended_days_ago,
    }
}

const EVENTS: [EventDef; 12] = [
    def(
        "neon-nights-2024",
        "Neon Nights 2024",
        "Glow in the Dark",
        Stage::Registration,
        -21,
    ),
    def(
        "pixel-odyssey",
        "Pixel Odyssey",
        "Retro Revival",
        Stage::Registration,
        -14,
    ),
    def(
        "clockwork-dreams",
        "Clockwork Dreams",
        "Time Manipulation",
        Stage::Registration,
        -7,
    ),
    def(
        "cosmic-clash",
        "Cosmic Clash",
        "Space Battles",
        Stage::Voting,
        3,
    ),
    def(
        "shadow-realm",
        "Shadow Realm",
        "Light and Darkness",
        Stage::Voting,
        10,
    ),
    def(
        "wild-cards",
        "Wild Cards",
        "Randomness",
        Stage::Closed,
        20,
    ),
    def(
        "ocean-depths",
        "Ocean Depths",
        "Underwater Adventure",
        Stage::Revealed,
        35,
    ),
    def(
        "robot-uprising",
        "Robot Uprising",
        "AI Gone Wrong",
        Stage::Revealed,
        60,
    ),
    def(
        "mystic-forest",
        "Mystic Forest",
        "Nature Magic",
        Stage::Revealed,
        90,
    ),
    def(
        "fire-and-ice",
        "Fire and Ice",
        "Elemental Forces",
        Stage::Revealed,
        120,
    ),
    def(
        "tiny-worlds",
        "Tiny Worlds",
        "Microscopic",
        Stage::Revealed,
        180,
    ),
    def(
        "last-stand",
        "Last Stand",
        "Survival",
        Stage::Revealed,
        365,
    ),
];

const JAMMERS_PER_EVENT: usize = 30;
const JUDGES_PER_EVENT: usize = 3;
/// Share of jammers who review any given team.
const TURNOUT: f64 = 0.7;

fn user(index: usize) -> (UserId, &'static str) {
    let index = index % USER_NAMES.len();
    (UserId(index as i64 + 1), USER_NAMES[index])
}

fn fnv1a(parts: &[&[u8]]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for part in parts {
        for byte in *part {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
    }
    hash
}

fn rng_of(parts: &[&[u8]]) -> StdRng {
    StdRng::seed_from_u64(fnv1a(parts))
}

/// A normally distributed score around `mean`, rounded to one decimal and
/// forced into the range of `kind`.
fn normal_score(
    rng: &mut StdRng,
    kind: AspectKind,
    mean: f64,
    stddev: f64,
) -> f64 {
    // Box-Muller; `1 - u` keeps the logarithm finite
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    let score = ((z * stddev + mean) * 10.0).round() / 10.0;
    kind.range().clamp(score)
}

/// Fills an empty database with demo events in every stage, together with
/// their teams and, once voting has started, completed ballots.
///
/// Returns `false` without touching anything if the database already holds
/// events.
#[tracing::instrument(skip(db))]
pub fn seed(db: &Database, now: NaiveDateTime) -> Result<bool> {
    if !db.read(|repo| repo.events())?.is_empty() {
        tracing::info!("Database already has events, not seeding");
        return Ok(false);
    }

    let mut team_index = 0;
    for (i, def) in EVENTS.iter().enumerate() {
        let event = demo_event(i, def, now)?;
        let first_team = team_index;
        let (team_count, ballot_count) = db.transaction(|repo| {
            team_index = first_team;
            seed_event(repo, i, &event, &mut team_index)
        })?;
        tracing::info!(
            "Seeded event {} with {team_count} teams and {ballot_count} \
             ballots",
            def.id
        );
    }

    Ok(true)
}

fn demo_event(i: usize, def: &EventDef, now: NaiveDateTime) -> Result<Event> {
    let ended = now - Duration::days(def.ended_days_ago);
    let mut event = Event::new(
        EventId::new(def.id)?,
        def.name,
        ended - Duration::days(7),
    );
    event.theme = def.theme.to_string();
    event.start_time = Some(ended - Duration::days(2));
    event.end_time = Some(ended);
    event.advance_to(def.stage)?;
    event.organizers = vec![user(0).0];
    event.jammers = (0..JAMMERS_PER_EVENT)
        .map(|j| user(i * 7 + j).0)
        .collect();
    event.judges = (0..JUDGES_PER_EVENT)
        .map(|j| user(i * 3 + j + 40).0)
        .collect();
    Ok(event)
}

/// Stores `event` and its teams and ballots. Returns the number of teams and
/// ballots created.
fn seed_event(
    repo: &mut dyn Repository,
    i: usize,
    event: &Event,
    team_index: &mut usize,
) -> Result<(usize, usize)> {
    repo.create_event(event)?;

    let mut rng = rng_of(&[event.id.as_str().as_bytes()]);
    let team_count = 6 + rng.gen_range(0..7);
    let mut teams = Vec::with_capacity(team_count);
    for t in 0..team_count {
        let member_count = rng.gen_range(1..=5);
        let members = (0..member_count)
            .map(|m| {
                let (id, name) = user(i * 10 + t * 3 + m);
                Member {
                    user: Some(id),
                    name: name.to_string(),
                }
            })
            .collect();

        let name = TEAM_NAMES[*team_index % TEAM_NAMES.len()];
        let game = GAME_NAMES[*team_index % GAME_NAMES.len()];
        *team_index += 1;

        let mut team = Team {
            id: TeamId(0),
            event: event.id.clone(),
            name: name.to_string(),
            members,
            entry: Entry {
                name: game.to_string(),
                info: format!(
                    "A game created for {} by team {name}.",
                    event.name
                ),
                noncompeting: false,
                links: Links {
                    download: Some(format!(
                        "https://example.com/games/{}",
                        game.to_lowercase().replace(' ', "-")
                    )),
                    ..Links::default()
                },
            },
        };
        team.id = repo.create_team(&event.id, &team)?;
        teams.push(team);
    }

    let ballots = if event.stage() >= Stage::Voting {
        demo_ballots(event, &teams)
    } else {
        vec![]
    };
    if !ballots.is_empty() {
        repo.put_ballots(&event.id, &ballots)?;
    }

    Ok((teams.len(), ballots.len()))
}

/// Completed ballots by the jammers of `event`. Every team has a quality of
/// its own, and each voter's scores scatter around it.
fn demo_ballots(event: &Event, teams: &[Team]) -> Vec<Ballot> {
    let mut ballots = vec![];
    let mut handed_out = HashMap::<UserId, i64>::new();

    for team in teams {
        let mut rng =
            rng_of(&[team.name.as_bytes(), &[0], team.entry.name.as_bytes()]);
        let mut means = Aspects::default();
        for kind in [
            AspectKind::Theme,
            AspectKind::Enjoyment,
            AspectKind::Aesthetics,
            AspectKind::Innovation,
        ] {
            means.aspect_mut(kind).score = 1.5 + rng.gen::<f64>() * 3.0;
        }
        means.bonus.score = rng.gen::<f64>() * 1.5;

        for &voter in &event.jammers {
            if team.has_member(voter) {
                continue;
            }

            let mut rng = rng_of(&[
                event.id.as_str().as_bytes(),
                &voter.0.to_le_bytes(),
                team.name.as_bytes(),
            ]);
            if rng.gen::<f64>() > TURNOUT {
                continue;
            }

            let mut aspects = Aspects::default();
            for kind in AspectKind::SCORED {
                let stddev = if kind == AspectKind::Bonus { 0.5 } else { 0.7 };
                aspects.aspect_mut(kind).score =
                    normal_score(&mut rng, kind, means.score(kind), stddev);
            }
            aspects.overall = Aspect::scored(aspects.total());

            let index = handed_out.entry(voter).or_default();
            ballots.push(Ballot {
                voter,
                team: team.id,
                index: *index,
                completed: true,
                aspects,
            });
            *index += 1;
        }
    }

    ballots
}

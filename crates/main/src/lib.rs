//! Ballot assignment and score aggregation for game jams.

pub mod assignment;
pub mod ballots;
pub mod config;
pub mod devdata;
pub mod events;
#[cfg(test)]
mod model;
pub mod results;
pub mod telemetry;

pub use assignment::{assign_more, review_priority, Assignments};
pub use ballots::{submit, user_ballot, user_ballots};
pub use results::{
    average_scores, results, revealed_results, Averages, TeamResult,
};

use std::fmt;

use arbitrary::Arbitrary;
use serde::{Deserialize, Serialize};

/// Identifies a registered user. Resolving who is behind an id (login,
/// profiles) happens outside of this crate.
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
    Arbitrary,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether `user` appears in `users`.
pub fn contains_user(users: &[UserId], user: UserId) -> bool {
    users.iter().any(|id| *id == user)
}

/// Removes `removed` from `users` and then appends every id of `added` that
/// is not already present, keeping the original order.
pub fn add_remove_users(
    users: &[UserId],
    added: &[UserId],
    removed: &[UserId],
) -> Vec<UserId> {
    let mut result = users
        .iter()
        .copied()
        .filter(|id| !contains_user(removed, *id))
        .collect::<Vec<_>>();
    for id in added {
        if !contains_user(&result, *id) {
            result.push(*id);
        }
    }
    result
}

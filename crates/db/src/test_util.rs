//! A throwaway database for tests.

use std::{ops::Deref, time::Duration};

use tempfile::TempDir;

use crate::{Database, PoolSettings};

/// A migrated database stored in a temporary directory, which is removed when
/// this is dropped.
pub struct TestDatabase {
    db: Database,
    _dir: TempDir,
}

impl Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Database {
        &self.db
    }
}

pub fn temp_database() -> TestDatabase {
    let dir = tempfile::tempdir().expect("failed to create temporary dir");
    let url = dir.path().join("jamvote.db").to_string_lossy().into_owned();

    let db = Database::connect(&PoolSettings {
        url,
        pool_size: 8,
        timeout: Duration::from_secs(5),
        max_attempts: 10,
    })
    .expect("failed to open test database");
    db.run_migrations().expect("failed to run migrations");

    TestDatabase { db, _dir: dir }
}

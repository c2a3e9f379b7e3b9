pub mod aspects;
pub mod ballot;
pub mod error;
pub mod event;
pub mod natural;
pub mod repo;
/// Database schema
pub mod schema;
pub mod team;
#[cfg(any(test, feature = "test-util"))]
pub mod test_util;
pub mod user;

use std::time::Duration;

use diesel::{
    connection::{Instrumentation, InstrumentationEvent, SimpleConnection},
    r2d2::{ConnectionManager, CustomizeConnection, Pool},
    Connection, SqliteConnection,
};
use diesel_migrations::{
    embed_migrations, EmbeddedMigrations, MigrationHarness,
};

pub use error::{Error, Result};
pub use repo::{Repository, SqliteRepo};

pub const MIGRATIONS: EmbeddedMigrations =
    embed_migrations!("../../migrations");

/// Base delay between attempts of a conflicting transaction. The n-th retry
/// waits n times this long.
const RETRY_BACKOFF: Duration = Duration::from_millis(20);

pub type ConnectionPool = Pool<ConnectionManager<SqliteConnection>>;

#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub pool_size: u32,
    pub timeout: Duration,
    /// How many times a transaction is attempted before a conflict is
    /// reported to the caller.
    pub max_attempts: u32,
}

struct ConnectionTracer;

impl Instrumentation for ConnectionTracer {
    fn on_connection_event(&mut self, event: InstrumentationEvent<'_>) {
        match event {
            InstrumentationEvent::StartQuery { query, .. } => {
                tracing::trace!("Started running query {query:?}");
            }
            InstrumentationEvent::FinishQuery { query, error, .. } => {
                if let Some(error) = error {
                    tracing::warn!(
                        "Encountered an error when running query {query} \
                         (error: {error})"
                    );
                }
            }
            _ => (),
        }
    }
}

#[derive(Debug)]
struct Customizer;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for Customizer {
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        conn.set_instrumentation(ConnectionTracer);

        conn.batch_execute(
            "\
            PRAGMA busy_timeout = 1000;\
            PRAGMA journal_mode = WAL;\
            PRAGMA foreign_keys = ON;\
        ",
        )
        .map_err(diesel::r2d2::Error::QueryError)?;

        Ok(())
    }
}

/// A pool of SQLite connections, and the entry point for running work
/// against it.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
    max_attempts: u32,
}

impl Database {
    pub fn connect(settings: &PoolSettings) -> Result<Self> {
        let manager = ConnectionManager::new(&settings.url);
        let pool = Pool::builder()
            .connection_customizer(Box::new(Customizer))
            .max_size(settings.pool_size)
            .connection_timeout(settings.timeout)
            .build(manager)?;

        Ok(Database {
            pool,
            max_attempts: settings.max_attempts.max(1),
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<()> {
        let mut pooled = self.pool.get()?;
        let conn: &mut SqliteConnection = &mut pooled;
        let applied =
            conn.run_pending_migrations(MIGRATIONS).map_err(Error::Storage)?;
        tracing::info!("Applied {} migrations", applied.len());
        Ok(())
    }

    /// Runs `work` inside a single transaction.
    ///
    /// The transaction takes the database write lock up front, so units of
    /// work never interleave with each other. If the transaction fails with
    /// [`Error::Conflict`] it is rolled back and `work` is run again, up to
    /// the configured number of attempts. Any other error rolls back the
    /// transaction and is returned as is.
    pub fn transaction<T, F>(&self, mut work: F) -> Result<T>
    where
        F: FnMut(&mut dyn Repository) -> Result<T>,
    {
        let mut conn = self.pool.get()?;
        let mut attempt = 1;
        loop {
            let outcome = conn.immediate_transaction(|conn| {
                work(&mut SqliteRepo::new(conn))
            });

            match outcome {
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(
                        "Transaction conflicted (attempt {attempt} of {}), \
                         retrying",
                        self.max_attempts
                    );
                    std::thread::sleep(RETRY_BACKOFF * attempt);
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    /// Runs `work` on a pooled connection without opening a transaction.
    /// Separate reads may observe different snapshots.
    pub fn read<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Repository) -> Result<T>,
    {
        let mut conn = self.pool.get()?;
        work(&mut SqliteRepo::new(&mut conn))
    }
}

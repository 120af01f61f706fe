// Copyright 2023 Remi Bernotavicius

use crate::error::{Error, Result};
use diesel::prelude::Connection as _;
use diesel::RunQueryDsl as _;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::Path;

pub mod models;
pub mod query;
pub mod schema;

pub type Connection = diesel::sqlite::SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Opens (or creates) the database at `path` and brings its schema up to date. `":memory:"`
/// gives a private in-memory database.
pub fn establish_connection(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let url = path
        .to_str()
        .ok_or_else(|| Error::Internal(format!("database path {path:?} is not valid UTF-8")))?;
    let mut connection = Connection::establish(url)?;

    // SQLite leaves foreign keys (and with them the cascading deletes) off unless asked.
    diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut connection)?;
    diesel::sql_query("PRAGMA busy_timeout = 5000").execute(&mut connection)?;

    connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(Error::Migration)?;
    Ok(connection)
}

#[test]
fn migrations() {
    let mut connection = establish_connection(":memory:").unwrap();
    connection.revert_all_migrations(MIGRATIONS).unwrap();
    assert!(connection.has_pending_migration(MIGRATIONS).unwrap());
    connection.run_pending_migrations(MIGRATIONS).unwrap();
    assert!(!connection.has_pending_migration(MIGRATIONS).unwrap());
}

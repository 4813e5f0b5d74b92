//! Database module: models, schema and storage for password history.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: parameterized queries over the `passwords` table

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::PasswordRecord;
pub use sqlite::{PasswordStorage, SqlitePool};

use crate::error::PasskeepError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

/// Open a pool for `database_url`, creating the database file if needed.
///
/// In-memory databases live and die with their connection, so they get a single
/// connection that is never recycled.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, PasskeepError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_opts)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(connect_opts)
            .await?
    };
    Ok(pool)
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One stored password hash for a (`user`, `createdBy`) pair.
///
/// Rows are append-only as far as `password` is concerned: a rotation inserts a new
/// row and marks the previous active one deleted.
#[derive(Debug, Clone, Serialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRecord {
    pub id: i64,
    pub user: i64,
    /// bcrypt hash, never the plaintext.
    pub password: String,
    #[sqlx(rename = "createdBy")]
    pub created_by: String,
    pub deleted: bool,
    #[sqlx(rename = "deletedAt")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl PasswordRecord {
    pub fn is_active(&self) -> bool {
        !self.deleted
    }
}

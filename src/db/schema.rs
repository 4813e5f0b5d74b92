//! SQL DDL for initializing the password history storage.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `id` INTEGER PRIMARY KEY AUTOINCREMENT (ids are never reused after a forced delete)
/// - camelCase column names, compatible with tables created by the previous deployment
/// - `deleted` BOOLEAN (stored as INTEGER 0/1)
/// - timestamps as RFC3339 TEXT
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS passwords (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user INTEGER NOT NULL,
    password TEXT NOT NULL,
    createdBy TEXT NOT NULL,
    deleted INTEGER NOT NULL DEFAULT 0,
    deletedAt TEXT NULL DEFAULT NULL,
    createdAt TEXT NOT NULL,
    updatedAt TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_passwords_user_creator ON passwords(user, createdBy);
"#;

/// Tables written by the previous deployment can hold several active rows for one pair.
/// Keep the newest (highest id) active and retire the rest. Binds: `deletedAt`, `updatedAt`.
pub const RETIRE_DUPLICATE_ACTIVE: &str = r#"
UPDATE passwords SET deleted = 1, deletedAt = ?, updatedAt = ?
WHERE deleted = 0
  AND id NOT IN (
      SELECT MAX(id) FROM passwords WHERE deleted = 0 GROUP BY user, createdBy
  )
"#;

/// At most one active (`deleted = 0`) row per (`user`, `createdBy`).
pub const ACTIVE_UNIQUE_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS uq_passwords_active
    ON passwords(user, createdBy) WHERE deleted = 0
"#;

use crate::db::models::PasswordRecord;
use crate::db::schema::{ACTIVE_UNIQUE_INDEX, RETIRE_DUPLICATE_ACTIVE, SQLITE_INIT};
use crate::error::PasskeepError;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite, Transaction};
use tracing::warn;

pub type SqlitePool = Pool<Sqlite>;

const RECORD_COLUMNS: &str =
    "id, user, password, createdBy, deleted, deletedAt, createdAt, updatedAt";

#[derive(Clone)]
pub struct PasswordStorage {
    pool: SqlitePool,
}

impl PasswordStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    ///
    /// Duplicate active rows left by the previous deployment are retired before the
    /// unique active index is built, otherwise the index cannot be created.
    pub async fn init_schema(&self) -> Result<(), PasskeepError> {
        // sqlx::query runs a single statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }

        let now = Utc::now();
        let retired = sqlx::query(RETIRE_DUPLICATE_ACTIVE)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if retired > 0 {
            warn!(retired, "retired duplicate active passwords, newest kept");
        }

        sqlx::query(ACTIVE_UNIQUE_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    /// Every stored `(id, hash)` for the pair, active or not, oldest first.
    pub async fn history(
        &self,
        user: i64,
        created_by: &str,
    ) -> Result<Vec<(i64, String)>, PasskeepError> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT id, password FROM passwords WHERE user = ? AND createdBy = ? ORDER BY id",
        )
        .bind(user)
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_active(
        &self,
        user: i64,
        created_by: &str,
    ) -> Result<Option<PasswordRecord>, PasskeepError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM passwords
             WHERE user = ? AND createdBy = ? AND deleted = 0
             ORDER BY id DESC LIMIT 1"
        );
        let rec = sqlx::query_as::<_, PasswordRecord>(&sql)
            .bind(user)
            .bind(created_by)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec)
    }

    /// Open a rotation of the pair: start a transaction and retire its active row(s).
    ///
    /// The supersede `UPDATE` is the first statement, so the transaction holds the write
    /// lock before anything is read and concurrent rotations of the same pair queue
    /// behind it.
    pub async fn begin_rotation(
        &self,
        user: i64,
        created_by: &str,
    ) -> Result<Rotation, PasskeepError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let superseded = sqlx::query(
            r#"UPDATE passwords SET deleted = 1, deletedAt = ?, updatedAt = ?
               WHERE user = ? AND createdBy = ? AND deleted = 0"#,
        )
        .bind(now)
        .bind(now)
        .bind(user)
        .bind(created_by)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        Ok(Rotation {
            tx,
            user,
            created_by: created_by.to_owned(),
            now,
            superseded,
        })
    }

    /// Mark the row deleted. Returns the number of rows touched (0 or 1).
    pub async fn soft_delete(&self, id: i64, created_by: &str) -> Result<u64, PasskeepError> {
        let now = Utc::now();
        let res = sqlx::query(
            r#"UPDATE passwords SET deleted = 1, deletedAt = ?, updatedAt = ?
               WHERE id = ? AND createdBy = ?"#,
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .bind(created_by)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected())
    }

    /// Physically remove the row. Returns the number of rows removed (0 or 1).
    pub async fn hard_delete(&self, id: i64, created_by: &str) -> Result<u64, PasskeepError> {
        let res = sqlx::query("DELETE FROM passwords WHERE id = ? AND createdBy = ?")
            .bind(id)
            .bind(created_by)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    pub async fn list_by_user(
        &self,
        user: i64,
        created_by: &str,
    ) -> Result<Vec<PasswordRecord>, PasskeepError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM passwords WHERE user = ? AND createdBy = ? ORDER BY id"
        );
        let rows = sqlx::query_as::<_, PasswordRecord>(&sql)
            .bind(user)
            .bind(created_by)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_active(&self, created_by: &str) -> Result<Vec<PasswordRecord>, PasskeepError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM passwords WHERE createdBy = ? AND deleted = 0 ORDER BY id"
        );
        let rows = sqlx::query_as::<_, PasswordRecord>(&sql)
            .bind(created_by)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<PasswordRecord>, PasskeepError> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM passwords WHERE id = ?");
        let rec = sqlx::query_as::<_, PasswordRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rec)
    }
}

/// A rotation in progress. Dropping it without [`Rotation::commit`] rolls back.
pub struct Rotation {
    tx: Transaction<'static, Sqlite>,
    user: i64,
    created_by: String,
    now: DateTime<Utc>,
    superseded: u64,
}

impl Rotation {
    /// Previously active rows retired by this rotation.
    pub fn superseded(&self) -> u64 {
        self.superseded
    }

    /// Hashes of the pair stored with an id above `seen_up_to`, i.e. committed by a
    /// racing rotation after the caller's reuse scan.
    pub async fn hashes_after(&mut self, seen_up_to: i64) -> Result<Vec<String>, PasskeepError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT password FROM passwords WHERE user = ? AND createdBy = ? AND id > ?",
        )
        .bind(self.user)
        .bind(&self.created_by)
        .bind(seen_up_to)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(rows.into_iter().map(|(hash,)| hash).collect())
    }

    /// Insert `hash` as the new active row and commit. Returns the new row id.
    pub async fn commit(mut self, hash: &str) -> Result<i64, PasskeepError> {
        let id = sqlx::query(
            r#"INSERT INTO passwords (user, password, createdBy, deleted, deletedAt, createdAt, updatedAt)
               VALUES (?, ?, ?, 0, NULL, ?, ?)"#,
        )
        .bind(self.user)
        .bind(hash)
        .bind(&self.created_by)
        .bind(self.now)
        .bind(self.now)
        .execute(&mut *self.tx)
        .await?
        .last_insert_rowid();

        self.tx.commit().await?;
        Ok(id)
    }

    /// Undo the supersede and write nothing.
    pub async fn abandon(self) -> Result<(), PasskeepError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

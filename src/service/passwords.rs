use crate::db::PasswordStorage;
use crate::error::PasskeepError;
use crate::service::hasher::PasswordHasher;
use crate::types::{ActionResult, Message};
use std::fmt;
use tracing::{debug, info};

/// Normalized caller identity; the partition key of every record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Creator(String);

impl Creator {
    /// Trim and lower-case `raw`. Blank identities are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        (!normalized.is_empty()).then_some(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Creator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Password history operations for one store.
///
/// Business-rule outcomes (reuse, not found, mismatch) come back as `Ok(ActionResult)`
/// with code 400; `Err` is reserved for storage and hashing failures.
#[derive(Clone)]
pub struct PasswordService {
    storage: PasswordStorage,
    hasher: PasswordHasher,
}

impl PasswordService {
    pub fn new(storage: PasswordStorage, hasher: PasswordHasher) -> Self {
        Self { storage, hasher }
    }

    pub fn storage(&self) -> &PasswordStorage {
        &self.storage
    }

    /// Rotate the password of `user`: reject any previously stored password, otherwise
    /// retire the active record and store the new hash as the only active one.
    pub async fn save(
        &self,
        user: i64,
        password: &str,
        creator: &Creator,
    ) -> Result<ActionResult, PasskeepError> {
        let history = self.storage.history(user, creator.as_str()).await?;
        let seen_up_to = history.iter().map(|(id, _)| *id).max().unwrap_or(0);
        let stored = history.into_iter().map(|(_, hash)| hash).collect();
        if self.hasher.matches_any(password, stored).await? {
            info!(user, creator = %creator, "password reuse rejected");
            return Ok(ActionResult::rejected(Message::PasswordExists));
        }

        let hash = self.hasher.hash(password).await?;

        let mut rotation = self.storage.begin_rotation(user, creator.as_str()).await?;
        // Only a racing rotation leaves rows here; bcrypt then runs under the write lock.
        let late = rotation.hashes_after(seen_up_to).await?;
        if self.hasher.matches_any(password, late).await? {
            rotation.abandon().await?;
            info!(user, creator = %creator, "password reuse rejected during rotation");
            return Ok(ActionResult::rejected(Message::PasswordExists));
        }
        let superseded = rotation.superseded();
        let id = rotation.commit(&hash).await?;

        info!(user, creator = %creator, id, superseded, "password saved");
        Ok(ActionResult::ok(Message::PasswordSaved))
    }

    /// Check `password` against the active record of `user`.
    pub async fn compare(
        &self,
        user: i64,
        password: &str,
        creator: &Creator,
    ) -> Result<ActionResult, PasskeepError> {
        let Some(active) = self.storage.find_active(user, creator.as_str()).await? else {
            return Ok(ActionResult::rejected(Message::PasswordNotFound));
        };

        if self.hasher.verify(password, &active.password).await? {
            Ok(ActionResult::ok(Message::PasswordIsSame))
        } else {
            Ok(ActionResult::rejected(Message::PasswordIsNotSame))
        }
    }

    /// Soft-delete (or, with `force`, physically remove) record `id`.
    ///
    /// Reports `PASSWORD_DELETED` even when no row matched `id` under `creator`.
    pub async fn delete_by_id(
        &self,
        id: i64,
        force: bool,
        creator: &Creator,
    ) -> Result<ActionResult, PasskeepError> {
        let affected = if force {
            self.storage.hard_delete(id, creator.as_str()).await?
        } else {
            self.storage.soft_delete(id, creator.as_str()).await?
        };
        if affected == 0 {
            debug!(id, force, creator = %creator, "delete matched no record");
        } else {
            info!(id, force, creator = %creator, "password deleted");
        }
        Ok(ActionResult::ok(Message::PasswordDeleted))
    }

    /// Full history of `user`, active and deleted.
    pub async fn get_all_by_user(
        &self,
        user: i64,
        creator: &Creator,
    ) -> Result<ActionResult, PasskeepError> {
        let records = self.storage.list_by_user(user, creator.as_str()).await?;
        Ok(ActionResult::listing(records))
    }

    /// Active records of every user owned by `creator`.
    pub async fn get_all(&self, creator: &Creator) -> Result<ActionResult, PasskeepError> {
        let records = self.storage.list_active(creator.as_str()).await?;
        Ok(ActionResult::listing(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect;

    async fn service() -> PasswordService {
        let pool = connect("sqlite::memory:", 1).await.expect("open memory db");
        let storage = PasswordStorage::new(pool);
        storage.init_schema().await.expect("init schema");
        PasswordService::new(storage, PasswordHasher::new(4))
    }

    fn creator(raw: &str) -> Creator {
        Creator::parse(raw).expect("valid creator")
    }

    #[tokio::test(flavor = "current_thread")]
    async fn save_keeps_the_executor_responsive() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::time::{Duration, Instant};

        let pool = connect("sqlite::memory:", 1).await.expect("open memory db");
        let storage = PasswordStorage::new(pool);
        storage.init_schema().await.expect("init schema");
        let svc = PasswordService::new(storage, PasswordHasher::new(6));
        let a = creator("a");
        for i in 0..4 {
            svc.save(1, &format!("secret{i}"), &a).await.unwrap();
        }

        let ticks = Arc::new(AtomicU32::new(0));
        let ticker = tokio::spawn({
            let ticks = ticks.clone();
            async move {
                let mut interval = tokio::time::interval(Duration::from_millis(10));
                loop {
                    interval.tick().await;
                    ticks.fetch_add(1, Ordering::Relaxed);
                }
            }
        });

        let started = Instant::now();
        let res = svc.save(1, "secret-new", &a).await.unwrap();
        let elapsed = started.elapsed();
        ticker.abort();

        assert_eq!(res.i18n, Message::PasswordSaved);
        let expected = (elapsed.as_millis() / 10) as u32;
        let ticked = ticks.load(Ordering::Relaxed);
        assert!(
            ticked * 2 >= expected,
            "save took {elapsed:?} but the sibling task ticked only {ticked} times"
        );
    }

    #[test]
    fn creator_is_trimmed_and_lowercased() {
        assert_eq!(creator("  Alice@Example ").as_str(), "alice@example");
        assert!(Creator::parse("   ").is_none());
        assert!(Creator::parse("").is_none());
    }

    #[tokio::test]
    async fn rotation_scenario() {
        let svc = service().await;
        let a = creator("a");

        let res = svc.save(1, "secret1", &a).await.unwrap();
        assert_eq!((res.code, res.i18n), (200, Message::PasswordSaved));

        let res = svc.save(1, "secret1", &a).await.unwrap();
        assert_eq!((res.code, res.i18n), (400, Message::PasswordExists));

        let res = svc.save(1, "secret2", &a).await.unwrap();
        assert_eq!((res.code, res.i18n), (200, Message::PasswordSaved));

        let res = svc.compare(1, "secret1", &a).await.unwrap();
        assert_eq!((res.code, res.i18n), (400, Message::PasswordIsNotSame));

        let res = svc.compare(1, "secret2", &a).await.unwrap();
        assert_eq!((res.code, res.i18n), (200, Message::PasswordIsSame));
    }

    #[tokio::test]
    async fn reuse_rejection_writes_nothing() {
        let svc = service().await;
        let a = creator("a");
        svc.save(1, "secret1", &a).await.unwrap();
        svc.save(1, "secret1", &a).await.unwrap();

        let rows = svc.storage().list_by_user(1, "a").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_active());
    }

    #[tokio::test]
    async fn rotation_leaves_one_active_record() {
        let svc = service().await;
        let a = creator("a");
        svc.save(1, "secret1", &a).await.unwrap();
        svc.save(1, "secret2", &a).await.unwrap();

        let rows = svc.storage().list_by_user(1, "a").await.unwrap();
        assert_eq!(rows.len(), 2);
        let active: Vec<_> = rows.iter().filter(|r| r.is_active()).collect();
        assert_eq!(active.len(), 1);
        assert!(bcrypt::verify("secret2", &active[0].password).unwrap());

        let old = rows.iter().find(|r| r.deleted).unwrap();
        assert!(bcrypt::verify("secret1", &old.password).unwrap());
        assert!(old.deleted_at.is_some());
    }

    #[tokio::test]
    async fn soft_deleted_history_still_blocks_reuse() {
        let svc = service().await;
        let a = creator("a");
        svc.save(1, "secret1", &a).await.unwrap();
        let id = svc.storage().find_active(1, "a").await.unwrap().unwrap().id;
        svc.delete_by_id(id, false, &a).await.unwrap();

        let res = svc.save(1, "secret1", &a).await.unwrap();
        assert_eq!(res.i18n, Message::PasswordExists);
    }

    #[tokio::test]
    async fn forced_delete_forgets_history() {
        let svc = service().await;
        let a = creator("a");
        svc.save(1, "secret1", &a).await.unwrap();
        let id = svc.storage().find_active(1, "a").await.unwrap().unwrap().id;
        svc.delete_by_id(id, true, &a).await.unwrap();

        let res = svc.save(1, "secret1", &a).await.unwrap();
        assert_eq!(res.i18n, Message::PasswordSaved);
    }

    #[tokio::test]
    async fn compare_without_active_record_is_not_found() {
        let svc = service().await;
        let a = creator("a");
        let res = svc.compare(1, "secret1", &a).await.unwrap();
        assert_eq!((res.code, res.i18n), (400, Message::PasswordNotFound));

        svc.save(1, "secret1", &a).await.unwrap();
        let id = svc.storage().find_active(1, "a").await.unwrap().unwrap().id;
        svc.delete_by_id(id, false, &a).await.unwrap();
        let res = svc.compare(1, "secret1", &a).await.unwrap();
        assert_eq!(res.i18n, Message::PasswordNotFound);
    }

    #[tokio::test]
    async fn delete_of_unknown_id_still_reports_deleted() {
        let svc = service().await;
        let a = creator("a");
        for force in [false, true] {
            let res = svc.delete_by_id(999, force, &a).await.unwrap();
            assert_eq!((res.code, res.i18n), (200, Message::PasswordDeleted));
        }
    }

    #[tokio::test]
    async fn creators_do_not_see_each_other() {
        let svc = service().await;
        let (a, b) = (creator("a"), creator("b"));
        svc.save(1, "secret1", &a).await.unwrap();

        // Same password under another creator is not a reuse.
        let res = svc.save(1, "secret1", &b).await.unwrap();
        assert_eq!(res.i18n, Message::PasswordSaved);

        let res = svc.get_all(&b).await.unwrap();
        let data = res.data.unwrap();
        assert_eq!(data.len(), 1);
        assert!(data.iter().all(|r| r.created_by == "b"));

        let res = svc.get_all_by_user(1, &creator("c")).await.unwrap();
        assert!(res.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listings_differ_in_deleted_rows() {
        let svc = service().await;
        let a = creator("a");
        svc.save(1, "secret1", &a).await.unwrap();
        svc.save(1, "secret2", &a).await.unwrap();
        svc.save(2, "secret3", &a).await.unwrap();

        let by_user = svc.get_all_by_user(1, &a).await.unwrap();
        assert_eq!(by_user.meta.unwrap().total, 2);

        let all = svc.get_all(&a).await.unwrap();
        let meta = all.meta.unwrap();
        assert_eq!((meta.page, meta.last, meta.limit, meta.total), (1, 1, 2, 2));
    }

    #[tokio::test]
    async fn storage_failure_surfaces_as_error() {
        let svc = service().await;
        svc.storage().pool().close().await;

        let err = svc.save(1, "secret1", &creator("a")).await.unwrap_err();
        assert!(matches!(err, PasskeepError::DatabaseError(_)));
    }
}

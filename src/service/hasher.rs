//! Salted password hashing.
//!
//! bcrypt with a configurable work factor; hashes produced by the previous deployment
//! (bcrypt, cost 10) verify unchanged. All bcrypt work runs on the blocking pool.

use crate::error::PasskeepError;
use bcrypt::BcryptError;
use tokio::task;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash with a fresh random salt.
    pub async fn hash(&self, password: &str) -> Result<String, PasskeepError> {
        let cost = self.cost;
        let password = password.to_owned();
        let hash = task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(hash)
    }

    /// Verify `password` against a stored hash. The whole hash is always computed,
    /// so the effort does not depend on where a mismatch occurs.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasskeepError> {
        self.matches_any(password, vec![hash.to_owned()]).await
    }

    /// Whether `password` matches any of `hashes`, checked in one blocking task.
    pub async fn matches_any(
        &self,
        password: &str,
        hashes: Vec<String>,
    ) -> Result<bool, PasskeepError> {
        if hashes.is_empty() {
            return Ok(false);
        }
        let password = password.to_owned();
        let matched = task::spawn_blocking(move || -> Result<bool, BcryptError> {
            for stored in &hashes {
                if bcrypt::verify(&password, stored)? {
                    return Ok(true);
                }
            }
            Ok(false)
        })
        .await??;
        Ok(matched)
    }
}

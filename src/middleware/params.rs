//! Parameter extraction and constraint checks.
//!
//! Malformed bodies, paths and query strings are reported the same way as values
//! that parse but break a constraint: `PasskeepError::Validation` (HTTP 422).

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
};
use serde::{Deserialize, de::DeserializeOwned};

use crate::error::PasskeepError;

pub const PASSWORD_MIN_CHARS: usize = 6;
pub const PASSWORD_MAX_CHARS: usize = 255;

pub trait Validate {
    fn validate(&self) -> Result<(), PasskeepError>;
}

fn positive(name: &str, value: i64) -> Result<(), PasskeepError> {
    if value < 1 {
        return Err(PasskeepError::Validation(format!(
            "`{name}` must be a positive integer"
        )));
    }
    Ok(())
}

/// Body of `save` and `compare`.
#[derive(Debug, Deserialize)]
pub struct PasswordParams {
    pub user: i64,
    pub password: String,
}

impl Validate for PasswordParams {
    fn validate(&self) -> Result<(), PasskeepError> {
        positive("user", self.user)?;
        let len = self.password.chars().count();
        if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&len) {
            return Err(PasskeepError::Validation(format!(
                "`password` length must be between {PASSWORD_MIN_CHARS} and {PASSWORD_MAX_CHARS}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct IdParam {
    pub id: i64,
}

impl Validate for IdParam {
    fn validate(&self) -> Result<(), PasskeepError> {
        positive("id", self.id)
    }
}

#[derive(Debug, Deserialize)]
pub struct UserParam {
    pub user: i64,
}

impl Validate for UserParam {
    fn validate(&self) -> Result<(), PasskeepError> {
        positive("user", self.user)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub force: bool,
}

impl Validate for DeleteQuery {
    fn validate(&self) -> Result<(), PasskeepError> {
        Ok(())
    }
}

pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = PasskeepError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| PasskeepError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

pub struct ValidatedPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = PasskeepError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| PasskeepError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = PasskeepError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| PasskeepError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(user: i64, password: &str) -> PasswordParams {
        PasswordParams {
            user,
            password: password.to_string(),
        }
    }

    #[test]
    fn password_length_bounds_are_inclusive() {
        assert!(params(1, "abcdef").validate().is_ok());
        assert!(params(1, &"x".repeat(255)).validate().is_ok());
        assert!(params(1, "abcde").validate().is_err());
        assert!(params(1, &"x".repeat(256)).validate().is_err());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 6 characters, 12 bytes
        assert!(params(1, "пароль").validate().is_ok());
    }

    #[test]
    fn ids_must_be_positive() {
        assert!(params(0, "abcdef").validate().is_err());
        assert!(IdParam { id: -3 }.validate().is_err());
        assert!(UserParam { user: 1 }.validate().is_ok());
    }

    #[test]
    fn force_defaults_to_false() {
        let q: DeleteQuery = serde_json::from_str("{}").unwrap();
        assert!(!q.force);
    }
}

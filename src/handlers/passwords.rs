use axum::extract::State;

use crate::middleware::RequireKeyAuth;
use crate::middleware::params::{
    DeleteQuery, IdParam, PasswordParams, UserParam, ValidatedJson, ValidatedPath, ValidatedQuery,
};
use crate::service::Creator;
use crate::types::ActionResult;
use crate::{PasskeepError, router::PasskeepState};

/// POST /save -> rotate the user's password, rejecting any previously used one.
pub async fn save(
    State(state): State<PasskeepState>,
    _auth: RequireKeyAuth,
    creator: Creator,
    ValidatedJson(params): ValidatedJson<PasswordParams>,
) -> Result<ActionResult, PasskeepError> {
    state
        .passwords
        .save(params.user, &params.password, &creator)
        .await
}

/// POST /compare -> check a password against the active one.
pub async fn compare(
    State(state): State<PasskeepState>,
    _auth: RequireKeyAuth,
    creator: Creator,
    ValidatedJson(params): ValidatedJson<PasswordParams>,
) -> Result<ActionResult, PasskeepError> {
    state
        .passwords
        .compare(params.user, &params.password, &creator)
        .await
}

/// DELETE /delete/{id}?force= -> soft delete, or remove the row when `force` is set.
pub async fn delete_by_id(
    State(state): State<PasskeepState>,
    _auth: RequireKeyAuth,
    creator: Creator,
    ValidatedPath(IdParam { id }): ValidatedPath<IdParam>,
    ValidatedQuery(DeleteQuery { force }): ValidatedQuery<DeleteQuery>,
) -> Result<ActionResult, PasskeepError> {
    state.passwords.delete_by_id(id, force, &creator).await
}

/// GET /user/{user} -> every record of one user, deleted ones included.
pub async fn get_all_by_user(
    State(state): State<PasskeepState>,
    _auth: RequireKeyAuth,
    creator: Creator,
    ValidatedPath(UserParam { user }): ValidatedPath<UserParam>,
) -> Result<ActionResult, PasskeepError> {
    state.passwords.get_all_by_user(user, &creator).await
}

/// GET / -> active records of all users.
pub async fn get_all(
    State(state): State<PasskeepState>,
    _auth: RequireKeyAuth,
    creator: Creator,
) -> Result<ActionResult, PasskeepError> {
    state.passwords.get_all(&creator).await
}

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::handlers::passwords;
use crate::service::PasswordService;

/// Versioned mount point of the password actions.
pub const BASE_PATH: &str = "/api/v1/password";

#[derive(Clone)]
pub struct PasskeepState {
    pub passwords: PasswordService,
    pub api_key: Option<Arc<str>>,
}

impl PasskeepState {
    pub fn new(passwords: PasswordService, api_key: Option<&str>) -> Self {
        Self {
            passwords,
            api_key: api_key.filter(|k| !k.is_empty()).map(Arc::from),
        }
    }
}

pub fn passkeep_router(state: PasskeepState) -> Router {
    Router::new()
        .route(BASE_PATH, get(passwords::get_all))
        .route(&format!("{BASE_PATH}/"), get(passwords::get_all))
        .route(&format!("{BASE_PATH}/save"), post(passwords::save))
        .route(&format!("{BASE_PATH}/compare"), post(passwords::compare))
        .route(
            &format!("{BASE_PATH}/delete/{{id}}"),
            delete(passwords::delete_by_id),
        )
        .route(
            &format!("{BASE_PATH}/user/{{user}}"),
            get(passwords::get_all_by_user),
        )
        .with_state(state)
}

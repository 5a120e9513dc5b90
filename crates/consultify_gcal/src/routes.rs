// --- File: crates/consultify_gcal/src/routes.rs ---

use crate::handlers::{
    auth_callback_handler, index_handler, login_handler, profile_handler,
    schedule_meeting_handler, GcalState,
};
use axum::{
    routing::{get, post},
    Router,
};
use consultify_common::ConsultifyError;
use consultify_config::AppConfig;
use std::sync::Arc;

/// Creates the router for the login, callback, profile and booking routes.
/// Mount it under `/api`.
pub async fn routes(config: Arc<AppConfig>) -> Result<Router, ConsultifyError> {
    let gcal_state = GcalState::from_config(config).await?;
    Ok(router(Arc::new(gcal_state)))
}

/// Same routes over an already assembled state.
pub fn router(gcal_state: Arc<GcalState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/login", get(login_handler))
        .route("/auth/callback", get(auth_callback_handler))
        .route("/profile", get(profile_handler))
        .route("/meetings", post(schedule_meeting_handler))
        .with_state(gcal_state)
}

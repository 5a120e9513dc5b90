// File: crates/consultify_gcal/src/handlers.rs
use crate::auth::{Credential, TokenInfo};
use crate::logic::{
    schedule_meeting, MeetingRequest, MeetingResponse, MeetingSettings, MeetingStatus,
};
use crate::oauth::{LoginState, OAuthClient, UserInfo};
use crate::service::{CalendarConnector, GoogleCalendarConnector};
use crate::token_store::TokenFileStore;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Json, Redirect},
};
use chrono::{DateTime, Duration, Utc};
use consultify_common::{auth_error, bearer_token, validation_error, ConsultifyError};
use consultify_config::AppConfig;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

// Define shared state needed by GCal handlers
#[derive(Clone)]
pub struct GcalState {
    pub config: Arc<AppConfig>,
    pub oauth: Arc<OAuthClient>,
    pub connector: Arc<dyn CalendarConnector>,
    pub token_store: Arc<TokenFileStore>,
    pub settings: Arc<MeetingSettings>,
}

impl GcalState {
    /// Resolves the OAuth client and meeting settings and wires the Google connector.
    pub async fn from_config(config: Arc<AppConfig>) -> Result<Self, ConsultifyError> {
        let timeout_secs = config.calendar.request_timeout_secs;
        let oauth = OAuthClient::from_config(&config.google, timeout_secs).await?;
        let settings = MeetingSettings::from_config(&config.meeting, &config.calendar)?;
        let token_store = TokenFileStore::new(&config.calendar.token_file);
        let connector = GoogleCalendarConnector::new(std::time::Duration::from_secs(timeout_secs));

        Ok(Self {
            config,
            oauth: Arc::new(oauth),
            connector: Arc::new(connector),
            token_store: Arc::new(token_store),
            settings: Arc::new(settings),
        })
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// RFC 3339 start of the slot to book after consent.
    pub start: Option<DateTime<Utc>>,
    /// RFC 3339 end; defaults to start plus the configured duration.
    pub end: Option<DateTime<Utc>>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[derive(Debug, Default, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by Google when the user denied consent.
    pub error: Option<String>,
}

pub fn http_status_for(status: MeetingStatus) -> StatusCode {
    match status {
        MeetingStatus::CreatedFully | MeetingStatus::CreatedWithoutConferencing => StatusCode::OK,
        MeetingStatus::AbortedByConflict => StatusCode::CONFLICT,
        MeetingStatus::FailedByServiceError | MeetingStatus::FailedByUnknownConflictState => {
            StatusCode::BAD_GATEWAY
        }
        MeetingStatus::RejectedInvalidSlot => StatusCode::BAD_REQUEST,
    }
}

/// Connects to the calendar with `credential` and runs the booking.
async fn book(
    state: &GcalState,
    credential: &Credential,
    request: &MeetingRequest,
) -> Result<(StatusCode, Json<MeetingResponse>), ConsultifyError> {
    let service = state.connector.connect(credential)?;
    let result = schedule_meeting(
        service.as_ref(),
        &state.config.calendar.calendar_id,
        request,
        &state.settings,
    )
    .await;

    let response = MeetingResponse::from(&result);
    info!(
        "Booking for {} finished with {:?}",
        request.start.to_rfc3339(),
        response.status
    );
    Ok((http_status_for(response.status), Json(response)))
}

/// Health/landing route.
pub async fn index_handler() -> &'static str {
    "Consultify: GET /api/login to book a consultancy call"
}

/// Redirects to Google's consent screen.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/login",
    params(LoginQuery),
    responses(
        (status = 307, description = "Redirect to the Google consent screen"),
        (status = 400, description = "Malformed or inverted slot")
    ),
    tag = "Auth"
))]
pub async fn login_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<LoginQuery>,
) -> Result<Redirect, ConsultifyError> {
    let login_state = match (query.start, query.end) {
        (Some(start), end) => Some(LoginState {
            start,
            end: end.unwrap_or_else(|| {
                start + Duration::minutes(state.config.meeting.default_duration_minutes)
            }),
        }),
        (None, Some(_)) => return Err(validation_error("`end` given without `start`")),
        (None, None) => None,
    };
    if let Some(slot) = &login_state {
        if slot.end <= slot.start {
            return Err(validation_error("`end` must be after `start`"));
        }
    }

    let encoded = login_state.map(|s| s.encode()).transpose()?;
    let url = state.oauth.authorization_url(encoded.as_deref())?;
    info!("Redirecting to Google consent screen");
    Ok(Redirect::temporary(&url))
}

/// Completes the consent flow and books the requested slot.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/auth/callback",
    params(AuthCallbackQuery),
    responses(
        (status = 200, description = "Meeting booked", body = MeetingResponse),
        (status = 400, description = "Missing code, malformed state or invalid slot"),
        (status = 401, description = "Consent denied"),
        (status = 409, description = "Slot conflicts with an existing event", body = MeetingResponse),
        (status = 502, description = "Google rejected the exchange or the calendar call failed")
    ),
    tag = "Auth"
))]
pub async fn auth_callback_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<AuthCallbackQuery>,
) -> Result<(StatusCode, Json<MeetingResponse>), ConsultifyError> {
    if let Some(err) = query.error {
        warn!("Consent denied: {}", err);
        return Err(auth_error(format!("Authorization denied: {}", err)));
    }
    let code = query
        .code
        .filter(|code| !code.trim().is_empty())
        .ok_or_else(|| validation_error("Missing authorization code"))?;

    // Resolve the slot before spending the single-use code.
    let request = match query.state.as_deref().filter(|s| !s.is_empty()) {
        Some(encoded) => LoginState::decode(encoded)?.into_request(),
        None => MeetingRequest::from_config(&state.config.meeting)?
            .ok_or_else(|| validation_error("No meeting slot requested or configured"))?,
    };
    request.validate().map_err(validation_error)?;

    let token_info = state.oauth.exchange_code(&code).await?;
    if let Err(e) = state.token_store.save(&token_info).await {
        warn!("Continuing without a persisted token: {}", e);
    }

    let credential = Credential::build(
        token_info,
        state.oauth.client_id(),
        state.oauth.client_secret(),
    )?;
    book(&state, &credential, &request).await
}

/// Profile of the account owning the bearer token.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Google profile", body = UserInfo),
        (status = 401, description = "Missing or rejected bearer token"),
        (status = 502, description = "Userinfo lookup failed")
    ),
    security(("bearer" = [])),
    tag = "Auth"
))]
pub async fn profile_handler(
    State(state): State<Arc<GcalState>>,
    headers: HeaderMap,
) -> Result<Json<UserInfo>, ConsultifyError> {
    let token = bearer_token(&headers)?;
    let profile = state.oauth.fetch_userinfo(&token).await?;
    Ok(Json(profile))
}

/// Books a meeting with an access token obtained elsewhere.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/meetings",
    request_body = MeetingRequest,
    responses(
        (status = 200, description = "Meeting booked", body = MeetingResponse),
        (status = 400, description = "Invalid slot", body = MeetingResponse),
        (status = 401, description = "Missing bearer token"),
        (status = 409, description = "Slot conflicts with an existing event", body = MeetingResponse),
        (status = 502, description = "Calendar call failed", body = MeetingResponse)
    ),
    security(("bearer" = [])),
    tag = "Meetings"
))]
pub async fn schedule_meeting_handler(
    State(state): State<Arc<GcalState>>,
    headers: HeaderMap,
    Json(request): Json<MeetingRequest>,
) -> Result<(StatusCode, Json<MeetingResponse>), ConsultifyError> {
    let token = bearer_token(&headers)?;
    let credential = Credential::build(
        TokenInfo::from_access_token(token),
        state.oauth.client_id(),
        state.oauth.client_secret(),
    )?;
    book(&state, &credential, &request).await
}

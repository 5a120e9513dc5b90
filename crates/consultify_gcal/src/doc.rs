// File: crates/consultify_gcal/src/doc.rs
#![cfg(feature = "openapi")]

use crate::logic::{MeetingRequest, MeetingResponse, MeetingStatus};
use crate::oauth::UserInfo;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::login_handler,
        crate::handlers::auth_callback_handler,
        crate::handlers::profile_handler,
        crate::handlers::schedule_meeting_handler,
    ),
    components(schemas(MeetingRequest, MeetingResponse, MeetingStatus, UserInfo)),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Google OAuth login"),
        (name = "Meetings", description = "Conflict-checked meeting booking")
    )
)]
pub struct GcalApiDoc;

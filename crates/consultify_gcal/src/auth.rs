// File: crates/consultify_gcal/src/auth.rs
use consultify_common::{validation_error, ConsultifyError};
use consultify_config::GOOGLE_TOKEN_URI;
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    CalendarHub,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// Type aliases for clarity
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

/// Scopes every credential is bound to.
pub const CALENDAR_SCOPES: [&str; 3] = [
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/calendar.readonly",
    "https://www.googleapis.com/auth/userinfo.email",
];

/// Token payload as returned by the provider's token endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl TokenInfo {
    /// A payload carrying only an access token, e.g. taken from a bearer header.
    pub fn from_access_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Default::default()
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Invalid credential: access token is missing or empty")]
    MissingAccessToken,
    #[error("Invalid credential: client id is missing or empty")]
    MissingClientId,
}

impl From<CredentialError> for ConsultifyError {
    fn from(err: CredentialError) -> Self {
        validation_error(err)
    }
}

/// Authorization handle handed to calendar and profile calls.
///
/// Immutable once built; cloning shares nothing mutable, so a credential can be
/// read from several tasks at once.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
    refresh_token: Option<String>,
    client_id: String,
    client_secret: String,
}

impl Credential {
    /// Builds a credential from a token payload and the OAuth client identity.
    ///
    /// Pure construction: nothing is sent over the network.
    pub fn build(
        token_info: TokenInfo,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, CredentialError> {
        let access_token = token_info.access_token.trim();
        if access_token.is_empty() {
            return Err(CredentialError::MissingAccessToken);
        }
        let client_id = client_id.trim();
        if client_id.is_empty() {
            return Err(CredentialError::MissingClientId);
        }

        Ok(Self {
            access_token: access_token.to_string(),
            refresh_token: token_info
                .refresh_token
                .filter(|token| !token.trim().is_empty()),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn token_uri(&self) -> &'static str {
        GOOGLE_TOKEN_URI
    }

    pub fn scopes(&self) -> &'static [&'static str] {
        &CALENDAR_SCOPES
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[redacted]")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("client_id", &self.client_id)
            .field("scopes", &CALENDAR_SCOPES)
            .finish()
    }
}

/// Builds a Calendar v3 hub that authorizes every call with the credential's bearer token.
pub fn create_calendar_hub(credential: &Credential) -> Result<HubType, std::io::Error> {
    let https = HttpsConnectorBuilder::new()
        .with_native_roots()?
        .https_or_http()
        .enable_http1()
        .build();

    // Create client without specifying body type
    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https);

    Ok(CalendarHub::new(client, credential.access_token().to_string()))
}

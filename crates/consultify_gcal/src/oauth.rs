// File: crates/consultify_gcal/src/oauth.rs
//! Authorization-code flow against Google's OAuth endpoints.
//!
//! Builds the consent URL, exchanges the returned code for a token payload
//! and proxies the userinfo lookup used by the profile endpoint.

use crate::auth::{TokenInfo, CALENDAR_SCOPES};
use crate::logic::MeetingRequest;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use consultify_common::{
    auth_error, config_error, create_client, external_service_error, validation_error,
    ConsultifyError,
};
use consultify_config::GoogleConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

const SERVICE_NAME: &str = "google-oauth";

/// Identity scopes requested next to the calendar scopes.
pub const IDENTITY_SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// Profile fields returned by the userinfo endpoint.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// Slot carried through the consent round trip in the `state` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginState {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl LoginState {
    pub fn encode(&self) -> Result<String, ConsultifyError> {
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    pub fn decode(state: &str) -> Result<Self, ConsultifyError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(state.trim())
            .map_err(|e| validation_error(format!("Malformed state parameter: {}", e)))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| validation_error(format!("Malformed state parameter: {}", e)))
    }

    pub fn into_request(self) -> MeetingRequest {
        MeetingRequest::new(self.start, self.end)
    }
}

#[derive(Serialize)]
struct CodeExchangeForm<'a> {
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    grant_type: &'a str,
}

/// Google OAuth client resolved from config and, optionally, a client secrets file.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_uri: String,
    token_uri: String,
    userinfo_uri: String,
    http: Client,
}

impl OAuthClient {
    /// Resolves the client identity. Inline config values win over the secrets file.
    pub async fn from_config(
        config: &GoogleConfig,
        timeout_secs: u64,
    ) -> Result<Self, ConsultifyError> {
        let secret = match config.client_secrets_path.as_deref() {
            Some(path) if !path.trim().is_empty() => {
                let secret = yup_oauth2::read_application_secret(path).await.map_err(|e| {
                    config_error(format!("Failed to read client secrets '{}': {}", path, e))
                })?;
                info!("Loaded Google client secrets from {}", path);
                Some(secret)
            }
            _ => None,
        };

        let client_id = non_empty(config.client_id.clone())
            .or_else(|| secret.as_ref().map(|s| s.client_id.clone()))
            .and_then(|v| non_empty(Some(v)))
            .ok_or_else(|| config_error("Google client_id is not configured"))?;
        let client_secret = non_empty(config.client_secret.clone())
            .or_else(|| secret.as_ref().map(|s| s.client_secret.clone()))
            .and_then(|v| non_empty(Some(v)))
            .ok_or_else(|| config_error("Google client_secret is not configured"))?;
        let redirect_uri = non_empty(config.redirect_uri.clone())
            .or_else(|| secret.as_ref().and_then(|s| s.redirect_uris.first().cloned()))
            .ok_or_else(|| config_error("Google redirect_uri is not configured"))?;

        let http = create_client(timeout_secs, false)
            .map_err(|e| config_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
            auth_uri: config.auth_uri.clone(),
            token_uri: config.token_uri.clone(),
            userinfo_uri: config.userinfo_uri.clone(),
            http,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Consent URL asking for offline access so a refresh token is issued.
    pub fn authorization_url(&self, state: Option<&str>) -> Result<String, ConsultifyError> {
        let scope = IDENTITY_SCOPES
            .iter()
            .chain(CALENDAR_SCOPES.iter())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        let mut params = vec![
            ("response_type", "code"),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("include_granted_scopes", "true"),
        ];
        if let Some(state) = state {
            params.push(("state", state));
        }

        let query = serde_urlencoded::to_string(&params)
            .map_err(|e| validation_error(format!("Failed to encode authorization URL: {}", e)))?;
        Ok(format!("{}?{}", self.auth_uri, query))
    }

    /// Exchanges an authorization code for a token payload.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenInfo, ConsultifyError> {
        let form = CodeExchangeForm {
            code,
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            redirect_uri: &self.redirect_uri,
            grant_type: "authorization_code",
        };

        debug!("Exchanging authorization code at {}", self.token_uri);
        let response = self.http.post(&self.token_uri).form(&form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Token exchange failed: HTTP {} - {}", status, body);
            return Err(external_service_error(
                SERVICE_NAME,
                format!("Token exchange failed: HTTP {} - {}", status, body),
            ));
        }

        let token_info = response.json::<TokenInfo>().await.map_err(|e| {
            external_service_error(SERVICE_NAME, format!("Unreadable token response: {}", e))
        })?;
        info!(
            "Authorization code exchanged (refresh token issued: {})",
            token_info.refresh_token.is_some()
        );
        Ok(token_info)
    }

    /// Looks up the profile of the account owning `access_token`.
    pub async fn fetch_userinfo(&self, access_token: &str) -> Result<UserInfo, ConsultifyError> {
        let response = self
            .http
            .get(&self.userinfo_uri)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => response.json::<UserInfo>().await.map_err(|e| {
                external_service_error(SERVICE_NAME, format!("Unreadable userinfo: {}", e))
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(auth_error("Access token was rejected by Google"))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(external_service_error(
                    SERVICE_NAME,
                    format!("Userinfo lookup failed: HTTP {} - {}", status, body),
                ))
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

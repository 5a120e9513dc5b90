use std::fmt;
use thiserror::Error;

/// The base error type for all Consultify errors.
///
/// Crate specific errors (credential, calendar query, scheduling) are mapped
/// into this enum at the HTTP boundary so every handler answers with the same
/// JSON error shape.
#[derive(Error, Debug)]
pub enum ConsultifyError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during authentication or authorization
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// Error occurred due to a timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for ConsultifyError {
    fn status_code(&self) -> u16 {
        match self {
            ConsultifyError::HttpError(_) => 502,
            ConsultifyError::ParseError(_) => 400,
            ConsultifyError::ConfigError(_) => 500,
            ConsultifyError::AuthError(_) => 401,
            ConsultifyError::ValidationError(_) => 400,
            ConsultifyError::ExternalServiceError { .. } => 502,
            ConsultifyError::TimeoutError(_) => 504,
            ConsultifyError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for ConsultifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ConsultifyError::TimeoutError(err.to_string());
        }
        ConsultifyError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for ConsultifyError {
    fn from(err: serde_json::Error) -> Self {
        ConsultifyError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for ConsultifyError {
    fn from(err: std::io::Error) -> Self {
        ConsultifyError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> ConsultifyError {
    ConsultifyError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> ConsultifyError {
    ConsultifyError::ValidationError(message.to_string())
}

pub fn auth_error<T: fmt::Display>(message: T) -> ConsultifyError {
    ConsultifyError::AuthError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> ConsultifyError {
    ConsultifyError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> ConsultifyError {
    ConsultifyError::InternalError(message.to_string())
}

// --- File: crates/consultify_common/src/lib.rs ---

// Declare modules within this crate
pub mod error;     // Error handling
pub mod http;      // HTTP utilities
pub mod services;  // Service abstractions
pub mod logging;   // Logging utilities

// Re-export error types and utilities for easier access
pub use error::{
    ConsultifyError,
    HttpStatusCode,
    config_error,
    validation_error,
    auth_error,
    external_service_error,
    internal_error,
};

// Re-export HTTP utilities for easier access
pub use http::{
    IntoHttpResponse,
    bearer_token,
    client::create_client,
};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level};

// This crate provides functionality shared by the Consultify crates:
// error handling, HTTP utilities, logging and the calendar service seam.

// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the remindr reminder engine.

use thiserror::Error;

/// The primary error type used across all remindr adapter traits and core operations.
#[derive(Debug, Error)]
pub enum RemindrError {
    /// Configuration errors (invalid TOML, missing collaborator credentials or endpoints).
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller input errors (missing or malformed identifiers, bad payloads).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced session or client does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Storage backend errors (database connection, query failure, migrations).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Delivery provider errors. `code` carries the provider-specific error code, if any.
    #[error("delivery error: {message}")]
    Delivery {
        message: String,
        code: Option<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Calendar provider errors (listing or updating events).
    #[error("calendar error: {message}")]
    Calendar {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// A status change that the lifecycle of an entity does not allow.
    #[error("illegal {entity} transition: {from} -> {to}")]
    IllegalTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RemindrError {
    /// HTTP-style status code for externally triggered calls.
    ///
    /// 400 for caller input errors, 404 for unknown ids, 500 for everything else.
    pub fn status_code(&self) -> u16 {
        match self {
            RemindrError::InvalidInput(_) => 400,
            RemindrError::NotFound { .. } => 404,
            _ => 500,
        }
    }

    /// Provider error code carried by a delivery error, if any.
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            RemindrError::Delivery { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Shorthand for a delivery error without a provider code or source.
    pub fn delivery(message: impl Into<String>) -> Self {
        RemindrError::Delivery {
            message: message.into(),
            code: None,
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_response_contract() {
        assert_eq!(RemindrError::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(
            RemindrError::NotFound {
                entity: "session",
                id: "s-1".into()
            }
            .status_code(),
            404
        );
        assert_eq!(RemindrError::Internal("boom".into()).status_code(), 500);
        assert_eq!(RemindrError::Config("missing".into()).status_code(), 500);
    }

    #[test]
    fn provider_code_only_on_delivery_errors() {
        let err = RemindrError::Delivery {
            message: "undeliverable".into(),
            code: Some("131026".into()),
            source: None,
        };
        assert_eq!(err.provider_code(), Some("131026"));
        assert_eq!(RemindrError::delivery("boom").provider_code(), None);
        assert_eq!(RemindrError::Internal("x".into()).provider_code(), None);
    }

    #[test]
    fn not_found_display_names_entity() {
        let err = RemindrError::NotFound {
            entity: "session",
            id: "abc".into(),
        };
        assert_eq!(err.to_string(), "session not found: abc");
    }
}

//! # Engine Error Taxonomy
//!
//! The stable, caller-facing error taxonomy of the posting engine.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Tillpoint                              │
//! │                                                                         │
//! │  Caller (HTTP layer)              Engine                                │
//! │  ───────────────────              ──────                                │
//! │                                                                         │
//! │  post_sale(...)                                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Validation (before any write)                                   │  │
//! │  │    unknown store/register/product ──► InvalidReference (client)  │  │
//! │  │    refunding a refund ─────────────► InvalidState     (client)  │  │
//! │  │    over-refund ────────────────────► QuantityExceeded (client)  │  │
//! │  │    no actionable lines ────────────► EmptyCart/EmptyRefund      │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Atomic unit (writes) ── DbError ──► Persistence      (server)  │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄── { "error": { "kind": "quantity_exceeded", "message": "..." } }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Once the atomic unit's writes start, only `Persistence` can occur, and
//! the rolled-back unit guarantees no partial visible effect. Raw storage
//! error text never crosses this boundary except classified uniqueness
//! violations ("already exists").

use serde::Serialize;
use thiserror::Error;

use tillpoint_core::ValidationError;
use tillpoint_db::DbError;

/// Errors returned by the posting engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Unknown or mismatched store, register, product, or original line.
    #[error("{message}")]
    InvalidReference { message: String },

    /// The referenced transaction cannot be refunded (wrong kind, no lines).
    #[error("{message}")]
    InvalidState { message: String },

    /// Requested refund quantity exceeds what is still refundable on the
    /// original line, counting refunds already committed against it.
    #[error(
        "refund quantity {requested} exceeds refundable {refundable} on line {line_id}"
    )]
    QuantityExceeded {
        line_id: String,
        requested: String,
        refundable: String,
    },

    /// A sale posting with no cart lines.
    #[error("cart has no lines")]
    EmptyCart,

    /// A refund posting with no actionable lines after dropping
    /// zero-quantity entries.
    #[error("refund has no lines")]
    EmptyRefund,

    /// Lookup miss.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Storage or atomic-commit failure. The only server-class error;
    /// safe to retry, no partial effect was committed.
    #[error("storage failure: {0}")]
    Persistence(#[from] DbError),
}

impl EngineError {
    /// Creates an InvalidReference error.
    pub fn invalid_reference(message: impl Into<String>) -> Self {
        EngineError::InvalidReference {
            message: message.into(),
        }
    }

    /// Creates an InvalidState error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        EngineError::InvalidState {
            message: message.into(),
        }
    }

    /// Creates a NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Stable machine-readable kind, serialized to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidReference { .. } => "invalid_reference",
            EngineError::InvalidState { .. } => "invalid_state",
            EngineError::QuantityExceeded { .. } => "quantity_exceeded",
            EngineError::EmptyCart => "empty_cart",
            EngineError::EmptyRefund => "empty_refund",
            EngineError::NotFound { .. } => "not_found",
            EngineError::Persistence(_) => "persistence",
        }
    }

    /// Client errors are the caller's fault (400-class); everything else
    /// is a retryable server failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, EngineError::Persistence(_))
    }

    /// Serializable `{ "error": { "kind", "message" } }` body.
    ///
    /// `Persistence` deliberately serializes a generic message: the wrapped
    /// storage detail is for logs, not callers.
    pub fn to_body(&self) -> ErrorBody {
        let message = match self {
            EngineError::Persistence(e) => {
                tracing::error!(error = %e, "Posting failed with storage error");
                "storage failure, safe to retry".to_string()
            }
            other => other.to_string(),
        };

        ErrorBody {
            error: ErrorDetail {
                kind: self.kind(),
                message,
            },
        }
    }
}

/// Validation failures on request fields are client errors naming the field.
impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::invalid_reference(err.to_string())
    }
}

/// Wire shape of an engine error.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Kind plus human-readable message.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub kind: &'static str,
    pub message: String,
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_stable() {
        assert_eq!(EngineError::EmptyCart.kind(), "empty_cart");
        assert_eq!(
            EngineError::invalid_reference("x").kind(),
            "invalid_reference"
        );
        assert_eq!(
            EngineError::Persistence(DbError::PoolExhausted).kind(),
            "persistence"
        );
    }

    #[test]
    fn test_client_server_split() {
        assert!(EngineError::EmptyCart.is_client_error());
        assert!(EngineError::not_found("Transaction", "t-1").is_client_error());
        assert!(!EngineError::Persistence(DbError::PoolExhausted).is_client_error());
    }

    #[test]
    fn test_body_serialization() {
        let body = EngineError::invalid_reference("product p-1 is not active").to_body();
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["error"]["kind"], "invalid_reference");
        assert_eq!(json["error"]["message"], "product p-1 is not active");
    }

    #[test]
    fn test_persistence_body_hides_storage_detail() {
        let err = EngineError::Persistence(DbError::QueryFailed(
            "near \"SELEC\": syntax error".to_string(),
        ));
        let body = err.to_body();

        assert_eq!(body.error.kind, "persistence");
        assert!(!body.error.message.contains("SELEC"));
    }
}

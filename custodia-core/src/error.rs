//! Error types for Custodia operations

use crate::{EntityKind, EvidenceStatus, ItemId, PrincipalId};
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_kind:?} with id {id}")]
    NotFound { entity_kind: EntityKind, id: Uuid },

    #[error("Insert failed for {entity_kind:?}: {reason}")]
    InsertFailed { entity_kind: EntityKind, reason: String },

    #[error("Update failed for {entity_kind:?} with id {id}: {reason}")]
    UpdateFailed {
        entity_kind: EntityKind,
        id: Uuid,
        reason: String,
    },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Index error on {index_name}: {reason}")]
    IndexError { index_name: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Constraint violation on {constraint}: {reason}")]
    ConstraintViolation { constraint: String, reason: String },
}

/// Lifecycle errors: state-machine and custody-chain violations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Invalid status transition for item {item_id}: {from} -> {to}")]
    InvalidTransition {
        item_id: ItemId,
        from: EvidenceStatus,
        to: EvidenceStatus,
    },

    #[error("Item {item_id} is terminal ({status}), no further mutations permitted")]
    TerminalItem {
        item_id: ItemId,
        status: EvidenceStatus,
    },

    #[error(
        "Custody chain break for item {item_id}: expected holder {expected}, supplied {supplied:?}"
    )]
    ChainBreak {
        item_id: ItemId,
        expected: PrincipalId,
        supplied: Option<PrincipalId>,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Custodia errors.
#[derive(Debug, Clone, Error)]
pub enum CustodiaError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Custodia operations.
pub type CustodiaResult<T> = Result<T, CustodiaError>;

// =============================================================================
// TESTS
// =============================================================================

//! Audit Writer
//!
//! Composes the immutable audit entry for every mutation accepted by the
//! item store or the custody ledger. The composed entry is handed to the
//! storage call that commits the mutation, so both land in one atomic unit;
//! an audit entry that cannot be composed fails the mutation up front.

use custodia_core::{
    AuditAction, AuditEntry, CustodiaError, CustodiaResult, EntityId, EntityKind, PrincipalId,
    Timestamp, ValidationError,
};
use custodia_storage::StorageTrait;
use serde::Serialize;
use std::sync::Arc;

/// Composes audit entries and exposes the read-only audit surface consumed
/// by the external audit-review collaborator.
#[derive(Clone)]
pub struct AuditWriter {
    storage: Arc<dyn StorageTrait>,
}

impl AuditWriter {
    pub fn new(storage: Arc<dyn StorageTrait>) -> Self {
        Self { storage }
    }

    /// Compose an entry with a serialized snapshot of the values written.
    ///
    /// The caller passes the composed entry into the storage method that
    /// commits the mutation itself.
    pub fn compose<T: Serialize>(
        &self,
        acting: PrincipalId,
        action: AuditAction,
        target_kind: EntityKind,
        target_id: EntityId,
        payload: &T,
    ) -> CustodiaResult<AuditEntry> {
        let snapshot = serde_json::to_value(payload).map_err(|e| {
            CustodiaError::Validation(ValidationError::InvalidValue {
                field: "snapshot".to_string(),
                reason: e.to_string(),
            })
        })?;
        Ok(AuditEntry::new(
            acting,
            action,
            target_kind,
            target_id,
            snapshot,
        ))
    }

    /// All entries recorded by one acting principal, oldest first.
    pub fn by_actor(&self, principal: PrincipalId) -> CustodiaResult<Vec<AuditEntry>> {
        self.storage.audit_list_by_principal(principal)
    }

    /// All entries targeting one record, oldest first.
    pub fn for_target(
        &self,
        kind: EntityKind,
        target_id: EntityId,
    ) -> CustodiaResult<Vec<AuditEntry>> {
        self.storage.audit_list_by_target(kind, target_id)
    }

    /// All entries created within `[from, to]` inclusive, oldest first.
    pub fn between(&self, from: Timestamp, to: Timestamp) -> CustodiaResult<Vec<AuditEntry>> {
        self.storage.audit_list_range(from, to)
    }
}

// =============================================================================
// TESTS
// =============================================================================

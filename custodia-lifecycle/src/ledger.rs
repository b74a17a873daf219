//! Custody Ledger
//!
//! Owns the append-only per-item custody chain. Continuity is enforced at
//! write time: every transfer reads the derived current holder and appends
//! under the item's mutex, so two racing transfers against the same prior
//! holder can never both land. Reads expose the chain ascending for
//! integrity work and descending for display.

use crate::audit::AuditWriter;
use crate::items::EvidenceItemStore;
use crate::locks::{self, ItemLockRegistry};
use custodia_core::{
    AuditAction, CustodiaError, CustodiaResult, CustodyRecord, EntityKind, EvidenceItem, ItemId,
    LifecycleError, PrincipalDirectory, PrincipalId, PrincipalInfo, ValidationError,
};
use custodia_storage::StorageTrait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Reason recorded on the synthesized chain-root record at intake.
pub const ROOT_CUSTODY_REASON: &str = "Initial custody at seizure";

/// Current holder of an item: the destination of the latest custody record,
/// or the seizing principal while the chain is empty.
pub(crate) fn derive_holder(
    storage: &dyn StorageTrait,
    item: &EvidenceItem,
) -> CustodiaResult<PrincipalId> {
    let latest = storage.custody_latest(item.item_id)?;
    Ok(latest.map(|r| r.to_principal).unwrap_or(item.seized_by))
}

// ============================================================================
// REQUEST AND VIEW TYPES
// ============================================================================

/// Input for one custody transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub to_principal: PrincipalId,
    /// Expected current holder. When supplied it must match the holder
    /// derived from the chain; a mismatch means the caller acted on stale
    /// state and the transfer is refused. `None` resolves automatically.
    pub from_override: Option<PrincipalId>,
    pub reason: String,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Custody record joined with resolved principal display data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustodyRecordView {
    pub record: CustodyRecord,
    pub from_info: Option<PrincipalInfo>,
    pub to_info: Option<PrincipalInfo>,
}

// ============================================================================
// CUSTODY LEDGER
// ============================================================================

/// Append custody records and read the chain back.
#[derive(Clone)]
pub struct CustodyLedger {
    storage: Arc<dyn StorageTrait>,
    locks: Arc<ItemLockRegistry>,
    items: EvidenceItemStore,
    audit: AuditWriter,
    directory: Option<Arc<dyn PrincipalDirectory>>,
}

impl CustodyLedger {
    /// The lock registry must be the same instance the item store uses, so
    /// transfers and status changes on one item serialize with each other.
    pub fn new(
        storage: Arc<dyn StorageTrait>,
        locks: Arc<ItemLockRegistry>,
        items: EvidenceItemStore,
        audit: AuditWriter,
    ) -> Self {
        Self {
            storage,
            locks,
            items,
            audit,
            directory: None,
        }
    }

    /// Attach a principal directory for display enrichment.
    pub fn with_principal_directory(mut self, directory: Arc<dyn PrincipalDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    // === Mutations ===

    /// Append one transfer to an item's chain.
    ///
    /// Holds the item's mutex across the holder read and the append, so
    /// concurrent transfers on one item serialize and exactly one of two
    /// racers with the same stale `from_override` succeeds.
    pub fn record_transfer(
        &self,
        item_id: ItemId,
        request: TransferRequest,
        acting: PrincipalId,
    ) -> CustodiaResult<CustodyRecord> {
        if request.reason.trim().is_empty() {
            return Err(CustodiaError::Validation(
                ValidationError::RequiredFieldMissing {
                    field: "reason".to_string(),
                },
            ));
        }

        let mutex = self.locks.mutex_for(item_id);
        let _guard = locks::hold(&mutex);

        let item = self.items.get(item_id)?;
        if item.status.is_terminal() {
            return Err(CustodiaError::Lifecycle(LifecycleError::TerminalItem {
                item_id,
                status: item.status,
            }));
        }
        let holder = derive_holder(self.storage.as_ref(), &item)?;
        if let Some(supplied) = request.from_override {
            if supplied != holder {
                return Err(CustodiaError::Lifecycle(LifecycleError::ChainBreak {
                    item_id,
                    expected: holder,
                    supplied: Some(supplied),
                }));
            }
        }

        let record = CustodyRecord::new(
            item_id,
            Some(holder),
            request.to_principal,
            request.reason,
            request.location,
            request.notes,
        );
        let audit = self.audit.compose(
            acting,
            AuditAction::CustodyTransfer,
            EntityKind::CustodyRecord,
            record.record_id,
            &record,
        )?;
        self.storage.custody_append(&record, &audit)?;
        tracing::debug!(
            item_id = %item_id,
            record_id = %record.record_id,
            from = %holder,
            to = %record.to_principal,
            "Recorded custody transfer"
        );
        Ok(record)
    }

    /// Materialize the chain root, assigning initial custody to `custodian`.
    ///
    /// Only legal while the chain is empty; the root is the one record whose
    /// `from_principal` is `None`. Called by intake when an initial custodian
    /// is named.
    pub fn establish_root(
        &self,
        item_id: ItemId,
        custodian: PrincipalId,
        acting: PrincipalId,
    ) -> CustodiaResult<CustodyRecord> {
        let mutex = self.locks.mutex_for(item_id);
        let _guard = locks::hold(&mutex);

        let item = self.items.get(item_id)?;
        if item.status.is_terminal() {
            return Err(CustodiaError::Lifecycle(LifecycleError::TerminalItem {
                item_id,
                status: item.status,
            }));
        }
        if let Some(latest) = self.storage.custody_latest(item_id)? {
            return Err(CustodiaError::Lifecycle(LifecycleError::ChainBreak {
                item_id,
                expected: latest.to_principal,
                supplied: None,
            }));
        }

        let record = CustodyRecord::new(
            item_id,
            None,
            custodian,
            ROOT_CUSTODY_REASON.to_string(),
            None,
            None,
        );
        let audit = self.audit.compose(
            acting,
            AuditAction::CustodyTransfer,
            EntityKind::CustodyRecord,
            record.record_id,
            &record,
        )?;
        self.storage.custody_append(&record, &audit)?;
        tracing::debug!(
            item_id = %item_id,
            record_id = %record.record_id,
            custodian = %custodian,
            "Established custody chain root"
        );
        Ok(record)
    }

    // === Reads ===

    /// The full chain in transfer-time ascending order.
    /// Fails with `NotFound` for an unknown item; an empty chain is `Ok`.
    pub fn chain(&self, item_id: ItemId) -> CustodiaResult<Vec<CustodyRecord>> {
        self.items.get(item_id)?;
        self.storage.custody_list_by_item(item_id)
    }

    /// The chain newest-first with resolved principal display data.
    pub fn chain_display(&self, item_id: ItemId) -> CustodiaResult<Vec<CustodyRecordView>> {
        let records = self.chain(item_id)?;
        Ok(records
            .into_iter()
            .rev()
            .map(|record| {
                let from_info = record.from_principal.and_then(|p| self.lookup_principal(p));
                let to_info = self.lookup_principal(record.to_principal);
                CustodyRecordView {
                    record,
                    from_info,
                    to_info,
                }
            })
            .collect())
    }

    /// The item's derived current holder.
    pub fn current_holder(&self, item_id: ItemId) -> CustodiaResult<PrincipalId> {
        let item = self.items.get(item_id)?;
        derive_holder(self.storage.as_ref(), &item)
    }

    /// Recompute the continuity invariant from scratch.
    ///
    /// The write path already enforces continuity; this is the independent
    /// integrity check for audits and tests. Returns `false` when the root
    /// is anchored to the wrong principal, an adjacent pair does not hand
    /// off cleanly, or timestamps run backwards.
    pub fn verify_chain(&self, item_id: ItemId) -> CustodiaResult<bool> {
        let item = self.items.get(item_id)?;
        let records = self.storage.custody_list_by_item(item_id)?;
        let Some(first) = records.first() else {
            return Ok(true);
        };

        if let Some(root_from) = first.from_principal {
            if root_from != item.seized_by {
                tracing::warn!(
                    item_id = %item_id,
                    record_id = %first.record_id,
                    root_from = %root_from,
                    seized_by = %item.seized_by,
                    "Custody chain root is not anchored to the seizing principal"
                );
                return Ok(false);
            }
        }
        for pair in records.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.from_principal != Some(prev.to_principal) {
                tracing::warn!(
                    item_id = %item_id,
                    prev_record = %prev.record_id,
                    next_record = %next.record_id,
                    "Custody chain adjacency violated"
                );
                return Ok(false);
            }
            if next.transferred_at < prev.transferred_at {
                tracing::warn!(
                    item_id = %item_id,
                    prev_record = %prev.record_id,
                    next_record = %next.record_id,
                    "Custody chain timestamps run backwards"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn lookup_principal(&self, principal: PrincipalId) -> Option<PrincipalInfo> {
        self.directory
            .as_ref()
            .and_then(|d| d.lookup_principal(principal))
    }
}

// =============================================================================
// TESTS
// =============================================================================

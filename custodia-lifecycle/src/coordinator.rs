//! Lifecycle Coordinator
//!
//! The one surface callers interact with. Wires the item store, the custody
//! ledger, and the audit writer over a shared storage backend and a shared
//! per-item lock registry, then sequences the multi-step operations: intake
//! with an optional chain root, transfers, status changes, and amendments.

use crate::audit::AuditWriter;
use crate::items::{EvidenceItemStore, EvidenceItemView};
use crate::ledger::{CustodyLedger, CustodyRecordView, TransferRequest};
use crate::locks::ItemLockRegistry;
use custodia_core::{
    AuditEntry, CategoryCatalog, CustodiaConfig, CustodiaResult, CustodyRecord, EntityId,
    EntityKind, EvidenceItem, EvidenceStatus, ItemDraft, ItemId, PrincipalDirectory, PrincipalId,
    Timestamp,
};
use custodia_storage::{EvidenceItemUpdate, ItemFilter, ItemStatistics, StorageTrait};
use std::sync::Arc;

/// Input for seizure intake.
///
/// When `initial_custodian` is named, intake materializes the chain-root
/// record handing the item to them. When absent the chain stays empty and
/// the seizing principal is the derived holder.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeRequest {
    pub draft: ItemDraft,
    pub initial_custodian: Option<PrincipalId>,
}

/// Orchestrates lifecycle operations against one storage backend.
///
/// # Example
/// ```ignore
/// let storage = Arc::new(InMemoryStorage::new());
/// let coordinator = LifecycleCoordinator::new(storage, CustodiaConfig::default())?;
///
/// let item = coordinator.intake(request, acting)?;
/// coordinator.transfer(item.item_id, transfer_request, acting)?;
/// ```
#[derive(Clone)]
pub struct LifecycleCoordinator {
    items: EvidenceItemStore,
    ledger: CustodyLedger,
    audit: AuditWriter,
}

impl std::fmt::Debug for LifecycleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleCoordinator").finish_non_exhaustive()
    }
}

impl LifecycleCoordinator {
    /// Validate the configuration and wire the components.
    ///
    /// The item store and the ledger share one lock registry, so status
    /// changes and transfers on the same item serialize with each other.
    pub fn new(storage: Arc<dyn StorageTrait>, config: CustodiaConfig) -> CustodiaResult<Self> {
        config.validate()?;
        let locks = Arc::new(ItemLockRegistry::new());
        let audit = AuditWriter::new(storage.clone());
        let items = EvidenceItemStore::new(storage.clone(), locks.clone(), audit.clone(), config);
        let ledger = CustodyLedger::new(storage, locks, items.clone(), audit.clone());
        Ok(Self {
            items,
            ledger,
            audit,
        })
    }

    /// Attach a principal directory for display enrichment.
    pub fn with_principal_directory(mut self, directory: Arc<dyn PrincipalDirectory>) -> Self {
        self.items = self.items.with_principal_directory(directory.clone());
        self.ledger = self.ledger.with_principal_directory(directory);
        self
    }

    /// Attach a category catalog for display enrichment.
    pub fn with_category_catalog(mut self, catalog: Arc<dyn CategoryCatalog>) -> Self {
        self.items = self.items.with_category_catalog(catalog);
        self
    }

    // === Mutations ===

    /// Create an item at seizure and optionally establish the chain root.
    ///
    /// The two writes are separately atomic with their audit entries. If the
    /// root write fails the created item survives; its chain is simply empty
    /// and the derived holder remains the seizing principal.
    pub fn intake(&self, request: IntakeRequest, acting: PrincipalId) -> CustodiaResult<EvidenceItem> {
        let item = self.items.create(request.draft, acting)?;
        if let Some(custodian) = request.initial_custodian {
            self.ledger.establish_root(item.item_id, custodian, acting)?;
        }
        Ok(item)
    }

    /// Transfer custody of an item.
    pub fn transfer(
        &self,
        item_id: ItemId,
        request: TransferRequest,
        acting: PrincipalId,
    ) -> CustodiaResult<CustodyRecord> {
        self.ledger.record_transfer(item_id, request, acting)
    }

    /// Apply a status transition.
    pub fn change_status(
        &self,
        item_id: ItemId,
        new_status: EvidenceStatus,
        acting: PrincipalId,
    ) -> CustodiaResult<EvidenceItem> {
        self.items.update_status(item_id, new_status, acting)
    }

    /// Amend descriptive fields after intake.
    pub fn amend_details(
        &self,
        item_id: ItemId,
        update: EvidenceItemUpdate,
        acting: PrincipalId,
    ) -> CustodiaResult<EvidenceItem> {
        self.items.update_details(item_id, update, acting)
    }

    // === Item reads ===

    pub fn item(&self, item_id: ItemId) -> CustodiaResult<EvidenceItem> {
        self.items.get(item_id)
    }

    pub fn item_by_seizure_number(
        &self,
        seizure_number: &str,
    ) -> CustodiaResult<Option<EvidenceItem>> {
        self.items.get_by_seizure_number(seizure_number)
    }

    pub fn item_detail(&self, item_id: ItemId) -> CustodiaResult<EvidenceItemView> {
        self.items.get_detail(item_id)
    }

    pub fn list_items(&self, filter: &ItemFilter) -> CustodiaResult<Vec<EvidenceItemView>> {
        self.items.list(filter)
    }

    pub fn stats(&self) -> CustodiaResult<ItemStatistics> {
        self.items.stats()
    }

    // === Custody reads ===

    pub fn chain(&self, item_id: ItemId) -> CustodiaResult<Vec<CustodyRecord>> {
        self.ledger.chain(item_id)
    }

    pub fn chain_display(&self, item_id: ItemId) -> CustodiaResult<Vec<CustodyRecordView>> {
        self.ledger.chain_display(item_id)
    }

    pub fn current_holder(&self, item_id: ItemId) -> CustodiaResult<PrincipalId> {
        self.ledger.current_holder(item_id)
    }

    pub fn verify_chain(&self, item_id: ItemId) -> CustodiaResult<bool> {
        self.ledger.verify_chain(item_id)
    }

    // === Audit reads ===

    pub fn audit_by_actor(&self, principal: PrincipalId) -> CustodiaResult<Vec<AuditEntry>> {
        self.audit.by_actor(principal)
    }

    pub fn audit_for_target(
        &self,
        kind: EntityKind,
        target_id: EntityId,
    ) -> CustodiaResult<Vec<AuditEntry>> {
        self.audit.for_target(kind, target_id)
    }

    pub fn audit_between(&self, from: Timestamp, to: Timestamp) -> CustodiaResult<Vec<AuditEntry>> {
        self.audit.between(from, to)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use custodia_core::{new_entity_id, AuditAction, ConfigError, CustodiaError};
    use custodia_storage::InMemoryStorage;
    use custodia_test_utils::fixtures::make_test_draft;

    fn make_coordinator() -> (Arc<InMemoryStorage>, LifecycleCoordinator) {
        let storage = Arc::new(InMemoryStorage::new());
        let coordinator =
            LifecycleCoordinator::new(storage.clone(), CustodiaConfig::default()).unwrap();
        (storage, coordinator)
    }

    fn make_intake(initial_custodian: Option<PrincipalId>) -> IntakeRequest {
        IntakeRequest {
            draft: make_test_draft(),
            initial_custodian,
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let storage = Arc::new(InMemoryStorage::new());
        let config = CustodiaConfig {
            seizure_number_prefix: "c!".to_string(),
        };
        let err = LifecycleCoordinator::new(storage, config).unwrap_err();
        assert!(matches!(
            err,
            CustodiaError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_intake_without_custodian_leaves_chain_empty() {
        let (_, coordinator) = make_coordinator();
        let acting = new_entity_id();
        let item = coordinator.intake(make_intake(None), acting).unwrap();

        assert!(coordinator.chain(item.item_id).unwrap().is_empty());
        assert_eq!(
            coordinator.current_holder(item.item_id).unwrap(),
            item.seized_by
        );
    }

    #[test]
    fn test_intake_with_custodian_establishes_root() {
        let (_, coordinator) = make_coordinator();
        let acting = new_entity_id();
        let custodian = new_entity_id();
        let item = coordinator
            .intake(make_intake(Some(custodian)), acting)
            .unwrap();

        let chain = coordinator.chain(item.item_id).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].from_principal, None);
        assert_eq!(chain[0].to_principal, custodian);
        assert_eq!(coordinator.current_holder(item.item_id).unwrap(), custodian);
        assert!(coordinator.verify_chain(item.item_id).unwrap());
    }

    #[test]
    fn test_operations_flow_through_components() {
        let (_, coordinator) = make_coordinator();
        let acting = new_entity_id();
        let handler = new_entity_id();
        let item = coordinator.intake(make_intake(None), acting).unwrap();

        coordinator
            .change_status(item.item_id, EvidenceStatus::InCustody, acting)
            .unwrap();
        coordinator
            .transfer(
                item.item_id,
                TransferRequest {
                    to_principal: handler,
                    from_override: None,
                    reason: "Assigned for storage".to_string(),
                    location: None,
                    notes: None,
                },
                acting,
            )
            .unwrap();
        coordinator
            .amend_details(
                item.item_id,
                EvidenceItemUpdate {
                    storage_location: Some("Vault 3".to_string()),
                    ..Default::default()
                },
                acting,
            )
            .unwrap();

        let detail = coordinator.item_detail(item.item_id).unwrap();
        assert_eq!(detail.item.status, EvidenceStatus::InCustody);
        assert_eq!(detail.item.storage_location.as_deref(), Some("Vault 3"));
        assert_eq!(detail.current_holder, handler);

        let found = coordinator
            .item_by_seizure_number(&item.seizure_number)
            .unwrap();
        assert_eq!(found.map(|i| i.item_id), Some(item.item_id));
    }

    #[test]
    fn test_audit_reads_cover_every_action_kind() {
        let (_, coordinator) = make_coordinator();
        let acting = new_entity_id();
        let item = coordinator.intake(make_intake(None), acting).unwrap();
        coordinator
            .change_status(item.item_id, EvidenceStatus::InCustody, acting)
            .unwrap();
        coordinator
            .transfer(
                item.item_id,
                TransferRequest {
                    to_principal: new_entity_id(),
                    from_override: None,
                    reason: "Assigned for storage".to_string(),
                    location: None,
                    notes: None,
                },
                acting,
            )
            .unwrap();
        coordinator
            .amend_details(
                item.item_id,
                EvidenceItemUpdate {
                    barcode: Some("8412345678912".to_string()),
                    ..Default::default()
                },
                acting,
            )
            .unwrap();

        let entries = coordinator.audit_by_actor(acting).unwrap();
        let actions: Vec<AuditAction> = entries.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                AuditAction::CreateSeizure,
                AuditAction::StatusChange,
                AuditAction::CustodyTransfer,
                AuditAction::UpdateDetails,
            ]
        );

        let in_range = coordinator
            .audit_between(
                chrono::Utc::now() - chrono::Duration::minutes(1),
                chrono::Utc::now(),
            )
            .unwrap();
        assert_eq!(in_range.len(), 4);
    }
}

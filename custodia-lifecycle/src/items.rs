//! Evidence Item Store
//!
//! Owns the per-item state machine: seizure intake, status transitions,
//! post-intake detail amendments, and the enriched read projections. Every
//! accepted mutation commits atomically with its audit entry; status and
//! detail writes serialize per item through the shared lock registry.

use crate::audit::AuditWriter;
use crate::ledger::derive_holder;
use crate::locks::{self, ItemLockRegistry};
use custodia_core::{
    generate_seizure_number, seizure_number_is_valid, AuditAction, CategoryCatalog, CategoryInfo,
    CustodiaConfig, CustodiaError, CustodiaResult, EntityKind, EvidenceItem, EvidenceStatus,
    ItemDraft, ItemId, LifecycleError, PrincipalDirectory, PrincipalId, PrincipalInfo,
    StorageError, ValidationError,
};
use custodia_storage::{EvidenceItemUpdate, ItemFilter, ItemStatistics, StorageTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Attempts before giving up when an auto-generated seizure number lands on
/// an existing one. The six-digit suffix is the monotonic millisecond counter
/// mod 10^6, so it wraps about every 16.7 minutes and a draw can collide with
/// a row minted a whole number of wrap periods earlier (or with a
/// caller-supplied number). Each redraw advances the counter and therefore
/// targets a different suffix, so create fails only when every attempt lands
/// on an occupied suffix.
const MAX_GENERATION_ATTEMPTS: usize = 3;

// ============================================================================
// READ PROJECTION
// ============================================================================

/// Read projection of an item joined with custody and reference data.
///
/// `current_holder` is derived from the custody chain at read time. The
/// display lookups are best-effort: an unresolved principal or category
/// leaves the corresponding field `None`, never fails the read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItemView {
    pub item: EvidenceItem,
    pub current_holder: PrincipalId,
    pub current_holder_info: Option<PrincipalInfo>,
    pub seized_by_info: Option<PrincipalInfo>,
    pub category: Option<CategoryInfo>,
}

// ============================================================================
// EVIDENCE ITEM STORE
// ============================================================================

/// Create, mutate, and read evidence items.
#[derive(Clone)]
pub struct EvidenceItemStore {
    storage: Arc<dyn StorageTrait>,
    locks: Arc<ItemLockRegistry>,
    audit: AuditWriter,
    config: CustodiaConfig,
    directory: Option<Arc<dyn PrincipalDirectory>>,
    catalog: Option<Arc<dyn CategoryCatalog>>,
}

impl EvidenceItemStore {
    pub fn new(
        storage: Arc<dyn StorageTrait>,
        locks: Arc<ItemLockRegistry>,
        audit: AuditWriter,
        config: CustodiaConfig,
    ) -> Self {
        Self {
            storage,
            locks,
            audit,
            config,
            directory: None,
            catalog: None,
        }
    }

    /// Attach a principal directory for display enrichment.
    pub fn with_principal_directory(mut self, directory: Arc<dyn PrincipalDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Attach a category catalog for display enrichment.
    pub fn with_category_catalog(mut self, catalog: Arc<dyn CategoryCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    // === Mutations ===

    /// Create an item at seizure intake. Status always starts at `Seized`.
    ///
    /// The seizure number is taken from the draft when supplied, otherwise
    /// generated from the configured prefix; a generated number that collides
    /// with an existing item is redrawn up to [`MAX_GENERATION_ATTEMPTS`].
    pub fn create(&self, draft: ItemDraft, acting: PrincipalId) -> CustodiaResult<EvidenceItem> {
        validate_draft(&draft)?;

        let supplied = draft.seizure_number.clone();
        let mut attempt = 0;
        loop {
            let seizure_number = match &supplied {
                Some(number) => number.clone(),
                None => generate_seizure_number(&self.config.seizure_number_prefix),
            };
            let item = EvidenceItem::new(draft.clone(), seizure_number);
            let audit = self.audit.compose(
                acting,
                AuditAction::CreateSeizure,
                EntityKind::EvidenceItem,
                item.item_id,
                &item,
            )?;
            match self.storage.item_insert(&item, &audit) {
                Ok(()) => {
                    tracing::debug!(
                        item_id = %item.item_id,
                        seizure_number = %item.seizure_number,
                        "Created evidence item"
                    );
                    return Ok(item);
                }
                Err(CustodiaError::Validation(ValidationError::ConstraintViolation { .. }))
                    if supplied.is_none() && attempt + 1 < MAX_GENERATION_ATTEMPTS =>
                {
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Apply a status transition permitted by the state machine.
    ///
    /// Terminal items have no outgoing transitions, so any attempt on a
    /// `Destroyed` or `Released` item fails as an invalid transition.
    pub fn update_status(
        &self,
        item_id: ItemId,
        new_status: EvidenceStatus,
        acting: PrincipalId,
    ) -> CustodiaResult<EvidenceItem> {
        let mutex = self.locks.mutex_for(item_id);
        let _guard = locks::hold(&mutex);

        let item = self.get(item_id)?;
        if !item.status.can_transition_to(new_status) {
            return Err(CustodiaError::Lifecycle(LifecycleError::InvalidTransition {
                item_id,
                from: item.status,
                to: new_status,
            }));
        }
        let audit = self.audit.compose(
            acting,
            AuditAction::StatusChange,
            EntityKind::EvidenceItem,
            item_id,
            &serde_json::json!({
                "old_status": item.status,
                "new_status": new_status,
            }),
        )?;
        let update = EvidenceItemUpdate {
            status: Some(new_status),
            ..Default::default()
        };
        self.storage.item_update(item_id, update, &audit)?;
        tracing::debug!(
            item_id = %item_id,
            old_status = %item.status,
            new_status = %new_status,
            "Changed evidence item status"
        );
        self.get(item_id)
    }

    /// Amend descriptive fields after intake.
    ///
    /// The update must carry at least one field and must not carry a status;
    /// status moves go through [`update_status`](Self::update_status) so the
    /// transition table cannot be bypassed.
    pub fn update_details(
        &self,
        item_id: ItemId,
        update: EvidenceItemUpdate,
        acting: PrincipalId,
    ) -> CustodiaResult<EvidenceItem> {
        if update.is_empty() {
            return Err(CustodiaError::Validation(ValidationError::InvalidValue {
                field: "update".to_string(),
                reason: "no fields supplied".to_string(),
            }));
        }
        if update.status.is_some() {
            return Err(CustodiaError::Validation(ValidationError::InvalidValue {
                field: "status".to_string(),
                reason: "status changes go through update_status".to_string(),
            }));
        }

        let mutex = self.locks.mutex_for(item_id);
        let _guard = locks::hold(&mutex);

        let item = self.get(item_id)?;
        if item.status.is_terminal() {
            return Err(CustodiaError::Lifecycle(LifecycleError::TerminalItem {
                item_id,
                status: item.status,
            }));
        }
        let audit = self.audit.compose(
            acting,
            AuditAction::UpdateDetails,
            EntityKind::EvidenceItem,
            item_id,
            &update,
        )?;
        self.storage.item_update(item_id, update, &audit)?;
        tracing::debug!(item_id = %item_id, "Amended evidence item details");
        self.get(item_id)
    }

    // === Reads ===

    /// Fetch an item, failing with `NotFound` when it does not exist.
    pub fn get(&self, item_id: ItemId) -> CustodiaResult<EvidenceItem> {
        self.storage
            .item_get(item_id)?
            .ok_or(CustodiaError::Storage(StorageError::NotFound {
                entity_kind: EntityKind::EvidenceItem,
                id: item_id,
            }))
    }

    /// Fetch an item by its unique seizure number.
    pub fn get_by_seizure_number(
        &self,
        seizure_number: &str,
    ) -> CustodiaResult<Option<EvidenceItem>> {
        self.storage.item_get_by_seizure_number(seizure_number)
    }

    /// Fetch an item with its derived holder and display enrichment.
    pub fn get_detail(&self, item_id: ItemId) -> CustodiaResult<EvidenceItemView> {
        let item = self.get(item_id)?;
        self.enrich(item)
    }

    /// List items matching the filter, newest first, enriched.
    pub fn list(&self, filter: &ItemFilter) -> CustodiaResult<Vec<EvidenceItemView>> {
        let items = self.storage.item_list(filter)?;
        items.into_iter().map(|item| self.enrich(item)).collect()
    }

    /// Aggregate statistics over all items.
    pub fn stats(&self) -> CustodiaResult<ItemStatistics> {
        self.storage.item_stats()
    }

    fn enrich(&self, item: EvidenceItem) -> CustodiaResult<EvidenceItemView> {
        let current_holder = derive_holder(self.storage.as_ref(), &item)?;
        let current_holder_info = self.lookup_principal(current_holder);
        let seized_by_info = self.lookup_principal(item.seized_by);
        let category = item
            .category_id
            .and_then(|id| self.catalog.as_ref().and_then(|c| c.lookup_category(id)));
        Ok(EvidenceItemView {
            item,
            current_holder,
            current_holder_info,
            seized_by_info,
            category,
        })
    }

    fn lookup_principal(&self, principal: PrincipalId) -> Option<PrincipalInfo> {
        self.directory
            .as_ref()
            .and_then(|d| d.lookup_principal(principal))
    }
}

// ============================================================================
// DRAFT VALIDATION
// ============================================================================

fn validate_draft(draft: &ItemDraft) -> CustodiaResult<()> {
    if draft.name.trim().is_empty() {
        return Err(CustodiaError::Validation(
            ValidationError::RequiredFieldMissing {
                field: "name".to_string(),
            },
        ));
    }
    if draft.unit.trim().is_empty() {
        return Err(CustodiaError::Validation(
            ValidationError::RequiredFieldMissing {
                field: "unit".to_string(),
            },
        ));
    }
    if draft.case_number.trim().is_empty() {
        return Err(CustodiaError::Validation(
            ValidationError::RequiredFieldMissing {
                field: "case_number".to_string(),
            },
        ));
    }
    if !draft.quantity.is_finite() || draft.quantity <= 0.0 {
        return Err(CustodiaError::Validation(ValidationError::InvalidValue {
            field: "quantity".to_string(),
            reason: "must be a positive number".to_string(),
        }));
    }
    if let Some(value) = draft.estimated_value {
        if !value.is_finite() || value < 0.0 {
            return Err(CustodiaError::Validation(ValidationError::InvalidValue {
                field: "estimated_value".to_string(),
                reason: "must be a non-negative number".to_string(),
            }));
        }
    }
    if let Some(weight) = draft.weight_kg {
        if !weight.is_finite() || weight < 0.0 {
            return Err(CustodiaError::Validation(ValidationError::InvalidValue {
                field: "weight_kg".to_string(),
                reason: "must be a non-negative number".to_string(),
            }));
        }
    }
    if let Some(gps) = draft.gps {
        if !(-90.0..=90.0).contains(&gps.latitude) || !(-180.0..=180.0).contains(&gps.longitude) {
            return Err(CustodiaError::Validation(ValidationError::InvalidValue {
                field: "gps".to_string(),
                reason: "coordinates out of range".to_string(),
            }));
        }
    }
    if let Some(number) = &draft.seizure_number {
        if !seizure_number_is_valid(number) {
            return Err(CustodiaError::Validation(ValidationError::InvalidValue {
                field: "seizure_number".to_string(),
                reason: "must match <PREFIX>-<year>-<6 digits>".to_string(),
            }));
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

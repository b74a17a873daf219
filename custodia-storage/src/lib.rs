//! Custodia Storage - Storage Trait and In-Memory Backend
//!
//! Defines the storage abstraction for Custodia entities. Every mutating
//! method accepts the audit entry composed for it and commits both under one
//! critical section, so a mutation is never visible without its audit record.

use custodia_core::{
    AuditEntry, CustodiaError, CustodiaResult, CustodyRecord, EntityKind, EvidenceItem,
    EvidenceStatus, StorageError, Timestamp, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

// ============================================================================
// UPDATE TYPES
// ============================================================================

/// Update payload for evidence items.
///
/// The enumerated field set replaces free-form update maps: only these fields
/// are mutable after intake. Status moves are validated by the lifecycle
/// layer before they reach storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItemUpdate {
    /// New lifecycle status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EvidenceStatus>,
    /// Updated free-text description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Updated estimated value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<f64>,
    /// Updated weight in kilograms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    /// Updated storage location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<String>,
    /// Court case number assigned after intake
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court_case_number: Option<String>,
    /// Updated barcode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    /// Updated RFID tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rfid_tag: Option<String>,
}

impl EvidenceItemUpdate {
    /// Whether the update carries no fields at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ============================================================================
// FILTERS AND AGGREGATES
// ============================================================================

/// Filter for item listings. All fields are conjunctive; `None` matches
/// everything.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub status: Option<EvidenceStatus>,
    pub category_id: Option<Uuid>,
    pub case_number: Option<String>,
    pub seized_by: Option<Uuid>,
}

impl ItemFilter {
    /// Whether `item` satisfies every supplied criterion.
    pub fn matches(&self, item: &EvidenceItem) -> bool {
        if self.status.is_some_and(|s| s != item.status) {
            return false;
        }
        if self.category_id.is_some() && self.category_id != item.category_id {
            return false;
        }
        if self
            .case_number
            .as_ref()
            .is_some_and(|c| c != &item.case_number)
        {
            return false;
        }
        if self.seized_by.is_some_and(|p| p != item.seized_by) {
            return false;
        }
        true
    }
}

/// Aggregate counts over the item table, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemStatistics {
    pub total_items: usize,
    pub by_status: HashMap<EvidenceStatus, usize>,
    /// Sum of `estimated_value` over items that carry one.
    pub total_estimated_value: f64,
}

// ============================================================================
// STORAGE TRAIT
// ============================================================================

/// Storage trait for Custodia entities.
///
/// Implementations provide persistence for evidence items, custody records,
/// and audit entries. Mutating methods take the composed [`AuditEntry`] and
/// must commit it atomically with the mutation.
pub trait StorageTrait: Send + Sync {
    // === Evidence Item Operations ===

    /// Insert a new item together with its audit entry.
    fn item_insert(&self, item: &EvidenceItem, audit: &AuditEntry) -> CustodiaResult<()>;

    /// Get an item by ID.
    fn item_get(&self, id: Uuid) -> CustodiaResult<Option<EvidenceItem>>;

    /// Get an item by its unique seizure number.
    fn item_get_by_seizure_number(
        &self,
        seizure_number: &str,
    ) -> CustodiaResult<Option<EvidenceItem>>;

    /// Apply an update together with its audit entry.
    fn item_update(
        &self,
        id: Uuid,
        update: EvidenceItemUpdate,
        audit: &AuditEntry,
    ) -> CustodiaResult<()>;

    /// List items matching a filter, newest first.
    fn item_list(&self, filter: &ItemFilter) -> CustodiaResult<Vec<EvidenceItem>>;

    /// Aggregate statistics over all items.
    fn item_stats(&self) -> CustodiaResult<ItemStatistics>;

    // === Custody Operations ===

    /// Append a custody record together with its audit entry.
    /// Fails with `NotFound` when the referenced item does not exist.
    fn custody_append(&self, record: &CustodyRecord, audit: &AuditEntry) -> CustodiaResult<()>;

    /// All custody records for an item in append order, which is
    /// transfer-time order.
    fn custody_list_by_item(&self, item_id: Uuid) -> CustodiaResult<Vec<CustodyRecord>>;

    /// The most recent custody record for an item, if any.
    fn custody_latest(&self, item_id: Uuid) -> CustodiaResult<Option<CustodyRecord>>;

    // === Audit Operations ===

    /// Append a standalone audit entry. Composite mutations share this
    /// commit path internally.
    fn audit_append(&self, entry: &AuditEntry) -> CustodiaResult<()>;

    /// All entries recorded by one acting principal, oldest first.
    fn audit_list_by_principal(&self, principal: Uuid) -> CustodiaResult<Vec<AuditEntry>>;

    /// All entries targeting one record, oldest first.
    fn audit_list_by_target(
        &self,
        kind: EntityKind,
        target_id: Uuid,
    ) -> CustodiaResult<Vec<AuditEntry>>;

    /// All entries created within `[from, to]` inclusive, oldest first.
    fn audit_list_range(&self, from: Timestamp, to: Timestamp) -> CustodiaResult<Vec<AuditEntry>>;
}

// ============================================================================
// IN-MEMORY STORAGE
// ============================================================================

/// Item table plus its unique seizure-number index, guarded together so the
/// index can never drift from the rows.
#[derive(Debug, Default)]
struct ItemTable {
    by_id: HashMap<Uuid, EvidenceItem>,
    by_seizure_number: HashMap<String, Uuid>,
}

/// In-memory storage backend.
///
/// The single authoritative store per deployment. Lock order is
/// items -> custody -> audit; every composite operation acquires in that
/// order and finishes all validation before its first write, so a mutation
/// and its audit entry always land together.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    items: Arc<RwLock<ItemTable>>,
    custody: Arc<RwLock<HashMap<Uuid, Vec<CustodyRecord>>>>,
    audit: Arc<RwLock<Vec<AuditEntry>>>,
}

fn read_guard<T>(lock: &RwLock<T>) -> CustodiaResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| CustodiaError::Storage(StorageError::LockPoisoned))
}

fn write_guard<T>(lock: &RwLock<T>) -> CustodiaResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| CustodiaError::Storage(StorageError::LockPoisoned))
}

impl InMemoryStorage {
    /// Create a new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of stored items.
    pub fn item_count(&self) -> CustodiaResult<usize> {
        Ok(read_guard(&self.items)?.by_id.len())
    }

    /// Count of stored custody records across all items.
    pub fn custody_count(&self) -> CustodiaResult<usize> {
        Ok(read_guard(&self.custody)?.values().map(Vec::len).sum())
    }

    /// Count of stored audit entries.
    pub fn audit_count(&self) -> CustodiaResult<usize> {
        Ok(read_guard(&self.audit)?.len())
    }
}

impl StorageTrait for InMemoryStorage {
    // === Evidence Item Operations ===

    fn item_insert(&self, item: &EvidenceItem, audit: &AuditEntry) -> CustodiaResult<()> {
        let mut items = write_guard(&self.items)?;
        if items.by_id.contains_key(&item.item_id) {
            return Err(CustodiaError::Storage(StorageError::InsertFailed {
                entity_kind: EntityKind::EvidenceItem,
                reason: "already exists".to_string(),
            }));
        }
        if items.by_seizure_number.contains_key(&item.seizure_number) {
            return Err(CustodiaError::Validation(ValidationError::ConstraintViolation {
                constraint: "seizure_number_unique".to_string(),
                reason: format!("{} already exists", item.seizure_number),
            }));
        }

        let mut audit_log = write_guard(&self.audit)?;
        audit_log.push(audit.clone());
        items
            .by_seizure_number
            .insert(item.seizure_number.clone(), item.item_id);
        items.by_id.insert(item.item_id, item.clone());
        Ok(())
    }

    fn item_get(&self, id: Uuid) -> CustodiaResult<Option<EvidenceItem>> {
        let items = read_guard(&self.items)?;
        Ok(items.by_id.get(&id).cloned())
    }

    fn item_get_by_seizure_number(
        &self,
        seizure_number: &str,
    ) -> CustodiaResult<Option<EvidenceItem>> {
        let items = read_guard(&self.items)?;
        match items.by_seizure_number.get(seizure_number) {
            None => Ok(None),
            Some(id) => match items.by_id.get(id) {
                Some(item) => Ok(Some(item.clone())),
                None => Err(CustodiaError::Storage(StorageError::IndexError {
                    index_name: "items_by_seizure_number".to_string(),
                    reason: format!("{} points at missing item {}", seizure_number, id),
                })),
            },
        }
    }

    fn item_update(
        &self,
        id: Uuid,
        update: EvidenceItemUpdate,
        audit: &AuditEntry,
    ) -> CustodiaResult<()> {
        let mut items = write_guard(&self.items)?;
        let item = items.by_id.get_mut(&id).ok_or(CustodiaError::Storage(
            StorageError::NotFound {
                entity_kind: EntityKind::EvidenceItem,
                id,
            },
        ))?;

        let mut audit_log = write_guard(&self.audit)?;
        audit_log.push(audit.clone());

        if let Some(status) = update.status {
            item.status = status;
        }
        if let Some(description) = update.description {
            item.description = Some(description);
        }
        if let Some(estimated_value) = update.estimated_value {
            item.estimated_value = Some(estimated_value);
        }
        if let Some(weight_kg) = update.weight_kg {
            item.weight_kg = Some(weight_kg);
        }
        if let Some(storage_location) = update.storage_location {
            item.storage_location = Some(storage_location);
        }
        if let Some(court_case_number) = update.court_case_number {
            item.court_case_number = Some(court_case_number);
        }
        if let Some(barcode) = update.barcode {
            item.barcode = Some(barcode);
        }
        if let Some(rfid_tag) = update.rfid_tag {
            item.rfid_tag = Some(rfid_tag);
        }
        item.updated_at = chrono::Utc::now();

        Ok(())
    }

    fn item_list(&self, filter: &ItemFilter) -> CustodiaResult<Vec<EvidenceItem>> {
        let items = read_guard(&self.items)?;
        let mut matched: Vec<EvidenceItem> = items
            .by_id
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    fn item_stats(&self) -> CustodiaResult<ItemStatistics> {
        let items = read_guard(&self.items)?;
        let mut stats = ItemStatistics {
            total_items: items.by_id.len(),
            ..Default::default()
        };
        for item in items.by_id.values() {
            *stats.by_status.entry(item.status).or_insert(0) += 1;
            if let Some(value) = item.estimated_value {
                stats.total_estimated_value += value;
            }
        }
        Ok(stats)
    }

    // === Custody Operations ===

    fn custody_append(&self, record: &CustodyRecord, audit: &AuditEntry) -> CustodiaResult<()> {
        // Items are never deleted, so the existence check does not need to
        // span the append.
        {
            let items = read_guard(&self.items)?;
            if !items.by_id.contains_key(&record.item_id) {
                return Err(CustodiaError::Storage(StorageError::NotFound {
                    entity_kind: EntityKind::EvidenceItem,
                    id: record.item_id,
                }));
            }
        }

        let mut custody = write_guard(&self.custody)?;
        let chain = custody.entry(record.item_id).or_default();
        if chain.iter().any(|r| r.record_id == record.record_id) {
            return Err(CustodiaError::Storage(StorageError::InsertFailed {
                entity_kind: EntityKind::CustodyRecord,
                reason: "already exists".to_string(),
            }));
        }

        let mut audit_log = write_guard(&self.audit)?;
        audit_log.push(audit.clone());
        chain.push(record.clone());
        Ok(())
    }

    fn custody_list_by_item(&self, item_id: Uuid) -> CustodiaResult<Vec<CustodyRecord>> {
        let custody = read_guard(&self.custody)?;
        Ok(custody.get(&item_id).cloned().unwrap_or_default())
    }

    fn custody_latest(&self, item_id: Uuid) -> CustodiaResult<Option<CustodyRecord>> {
        let custody = read_guard(&self.custody)?;
        Ok(custody.get(&item_id).and_then(|chain| chain.last().cloned()))
    }

    // === Audit Operations ===

    fn audit_append(&self, entry: &AuditEntry) -> CustodiaResult<()> {
        let mut audit_log = write_guard(&self.audit)?;
        audit_log.push(entry.clone());
        Ok(())
    }

    fn audit_list_by_principal(&self, principal: Uuid) -> CustodiaResult<Vec<AuditEntry>> {
        let audit_log = read_guard(&self.audit)?;
        Ok(audit_log
            .iter()
            .filter(|e| e.principal == principal)
            .cloned()
            .collect())
    }

    fn audit_list_by_target(
        &self,
        kind: EntityKind,
        target_id: Uuid,
    ) -> CustodiaResult<Vec<AuditEntry>> {
        let audit_log = read_guard(&self.audit)?;
        Ok(audit_log
            .iter()
            .filter(|e| e.target_kind == kind && e.target_id == target_id)
            .cloned()
            .collect())
    }

    fn audit_list_range(&self, from: Timestamp, to: Timestamp) -> CustodiaResult<Vec<AuditEntry>> {
        let audit_log = read_guard(&self.audit)?;
        Ok(audit_log
            .iter()
            .filter(|e| e.created_at >= from && e.created_at <= to)
            .cloned()
            .collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! Custodia Test Utilities
//!
//! Centralized test infrastructure for the Custodia workspace:
//! - Proptest generators for entity types
//! - In-memory fakes for the external collaborator traits
//! - Test fixtures for common scenarios
//! - Custom assertions for custody-specific validation

// Re-export the in-memory backend from its source crate
pub use custodia_storage::InMemoryStorage;

// Re-export core and storage types for convenience
pub use custodia_core::{
    generate_seizure_number, new_entity_id, now, seizure_number_is_valid, AuditAction, AuditEntry,
    CategoryCatalog, CategoryId, CategoryInfo, CustodiaConfig, CustodiaError, CustodiaResult,
    CustodyRecord, EntityId, EntityKind, EvidenceItem, EvidenceStatus, GeoPoint, ItemDraft,
    ItemId, LifecycleError, PrincipalDirectory, PrincipalId, PrincipalInfo, RiskLevel,
    StorageError, Timestamp, ValidationError,
};
pub use custodia_storage::{EvidenceItemUpdate, ItemFilter, StorageTrait};

use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// COLLABORATOR FAKES
// ============================================================================

/// In-memory principal directory for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPrincipalDirectory {
    entries: HashMap<PrincipalId, PrincipalInfo>,
}

impl InMemoryPrincipalDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, principal: PrincipalId, full_name: &str, badge_number: Option<&str>) {
        self.entries.insert(
            principal,
            PrincipalInfo {
                full_name: full_name.to_string(),
                badge_number: badge_number.map(str::to_string),
            },
        );
    }
}

impl PrincipalDirectory for InMemoryPrincipalDirectory {
    fn lookup_principal(&self, principal: PrincipalId) -> Option<PrincipalInfo> {
        self.entries.get(&principal).cloned()
    }
}

/// In-memory category catalog for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCategoryCatalog {
    entries: HashMap<CategoryId, CategoryInfo>,
}

impl InMemoryCategoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: CategoryId, name: &str, risk_level: RiskLevel) {
        self.entries.insert(
            category,
            CategoryInfo {
                name: name.to_string(),
                risk_level,
            },
        );
    }
}

impl CategoryCatalog for InMemoryCategoryCatalog {
    fn lookup_category(&self, category: CategoryId) -> Option<CategoryInfo> {
        self.entries.get(&category).cloned()
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating Custodia entity types.

    use super::*;
    use proptest::prelude::*;

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    /// Generate a valid UUIDv7 (timestamp-sortable).
    pub fn arb_uuid_v7() -> impl Strategy<Value = Uuid> {
        Just(()).prop_map(|_| Uuid::now_v7())
    }

    /// Generate a Timestamp within a reasonable range (2020-2030).
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64)
            .prop_map(|secs| chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now))
    }

    /// Generate an EvidenceStatus variant.
    pub fn arb_status() -> impl Strategy<Value = EvidenceStatus> {
        prop_oneof![
            Just(EvidenceStatus::Seized),
            Just(EvidenceStatus::InCustody),
            Just(EvidenceStatus::UnderInvestigation),
            Just(EvidenceStatus::PendingDestruction),
            Just(EvidenceStatus::Destroyed),
            Just(EvidenceStatus::Released),
        ]
    }

    /// Generate a non-terminal EvidenceStatus.
    pub fn arb_nonterminal_status() -> impl Strategy<Value = EvidenceStatus> {
        arb_status().prop_filter("status must be non-terminal", |s| !s.is_terminal())
    }

    /// Generate an AuditAction variant.
    pub fn arb_audit_action() -> impl Strategy<Value = AuditAction> {
        prop_oneof![
            Just(AuditAction::CreateSeizure),
            Just(AuditAction::StatusChange),
            Just(AuditAction::CustodyTransfer),
            Just(AuditAction::UpdateDetails),
        ]
    }

    /// Generate a RiskLevel variant.
    pub fn arb_risk_level() -> impl Strategy<Value = RiskLevel> {
        prop_oneof![
            Just(RiskLevel::Low),
            Just(RiskLevel::Medium),
            Just(RiskLevel::High),
            Just(RiskLevel::Critical),
        ]
    }

    /// Generate in-range GPS coordinates.
    pub fn arb_geo_point() -> impl Strategy<Value = GeoPoint> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(latitude, longitude)| GeoPoint {
            latitude,
            longitude,
        })
    }

    /// Generate a valid intake draft with an auto-assigned seizure number.
    pub fn arb_item_draft() -> impl Strategy<Value = ItemDraft> {
        (
            "[a-zA-Z0-9 ]{1,60}",
            prop::option::of("[a-zA-Z0-9 .,]{1,200}"),
            0.1f64..100000.0,
            "[a-z]{1,12}",
            prop::option::of(0.0f64..1_000_000.0),
            prop::option::of(0.0f64..10_000.0),
            prop::option::of(arb_uuid()),
            prop::option::of(arb_geo_point()),
            arb_uuid(),
            "[A-Z]{2,6}-[0-9]{3,6}",
        )
            .prop_map(
                |(
                    name,
                    description,
                    quantity,
                    unit,
                    estimated_value,
                    weight_kg,
                    category_id,
                    gps,
                    seized_by,
                    case_number,
                )| {
                    ItemDraft {
                        seizure_number: None,
                        name,
                        description,
                        quantity,
                        unit,
                        estimated_value,
                        weight_kg,
                        category_id,
                        barcode: None,
                        rfid_tag: None,
                        seized_at: None,
                        seizure_location: None,
                        gps,
                        seized_by,
                        case_number,
                        court_case_number: None,
                        storage_location: None,
                        attachment_refs: vec![],
                    }
                },
            )
    }

    /// Generate a persisted-shape evidence item.
    pub fn arb_evidence_item() -> impl Strategy<Value = EvidenceItem> {
        arb_item_draft()
            .prop_map(|draft| EvidenceItem::new(draft, generate_seizure_number("CMS")))
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    /// A complete, valid intake draft.
    pub fn make_test_draft() -> ItemDraft {
        ItemDraft {
            seizure_number: None,
            name: "Counterfeit watches".to_string(),
            description: Some("Crate of counterfeit wristwatches".to_string()),
            quantity: 40.0,
            unit: "pieces".to_string(),
            estimated_value: Some(12000.0),
            weight_kg: Some(18.5),
            category_id: Some(new_entity_id()),
            barcode: Some("8412345678905".to_string()),
            rfid_tag: None,
            seized_at: None,
            seizure_location: Some("Pier 4 warehouse".to_string()),
            gps: Some(GeoPoint {
                latitude: 40.7128,
                longitude: -74.006,
            }),
            seized_by: new_entity_id(),
            case_number: "CASE-7781".to_string(),
            court_case_number: None,
            storage_location: Some("Evidence room B, shelf 12".to_string()),
            attachment_refs: vec!["files://seizures/7781/photo-01.jpg".to_string()],
        }
    }

    /// A persisted-shape item built from the test draft with a fresh
    /// generated seizure number, safe to insert repeatedly.
    pub fn make_test_item() -> EvidenceItem {
        EvidenceItem::new(make_test_draft(), generate_seizure_number("CMS"))
    }

    /// A custody record handing `item` from its seizing principal to `to`.
    pub fn make_test_transfer(item: &EvidenceItem, to: PrincipalId) -> CustodyRecord {
        CustodyRecord::new(
            item.item_id,
            Some(item.seized_by),
            to,
            "Handover for analysis".to_string(),
            Some("Lab intake desk".to_string()),
            None,
        )
    }

    /// An audit entry recording `action` against `target_id`.
    pub fn make_test_audit_entry(
        action: AuditAction,
        target_kind: EntityKind,
        target_id: EntityId,
    ) -> AuditEntry {
        AuditEntry::new(
            new_entity_id(),
            action,
            target_kind,
            target_id,
            serde_json::json!({"fixture": true}),
        )
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion helpers for custody-specific validation.

    use super::*;

    /// Assert that a result is a `NotFound` storage error for `entity_kind`.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(
        result: &CustodiaResult<T>,
        entity_kind: EntityKind,
    ) {
        match result {
            Err(CustodiaError::Storage(StorageError::NotFound { entity_kind: k, .. })) => {
                assert_eq!(*k, entity_kind, "Wrong entity kind in NotFound error");
            }
            other => panic!("Expected NotFound for {:?}, got: {:?}", entity_kind, other),
        }
    }

    /// Assert that a result is a Validation error.
    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &CustodiaResult<T>) {
        match result {
            Err(CustodiaError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    /// Assert that a result is an InvalidTransition from `from` to `to`.
    #[track_caller]
    pub fn assert_invalid_transition<T: std::fmt::Debug>(
        result: &CustodiaResult<T>,
        from: EvidenceStatus,
        to: EvidenceStatus,
    ) {
        match result {
            Err(CustodiaError::Lifecycle(LifecycleError::InvalidTransition {
                from: f,
                to: t,
                ..
            })) => {
                assert_eq!(*f, from, "Wrong from status");
                assert_eq!(*t, to, "Wrong to status");
            }
            other => panic!(
                "Expected InvalidTransition {} -> {}, got: {:?}",
                from, to, other
            ),
        }
    }

    /// Assert that a result is a ChainBreak expecting `expected` as holder.
    #[track_caller]
    pub fn assert_chain_break<T: std::fmt::Debug>(
        result: &CustodiaResult<T>,
        expected: PrincipalId,
    ) {
        match result {
            Err(CustodiaError::Lifecycle(LifecycleError::ChainBreak { expected: e, .. })) => {
                assert_eq!(*e, expected, "Wrong expected holder in ChainBreak");
            }
            other => panic!("Expected ChainBreak, got: {:?}", other),
        }
    }

    /// Assert that a result is a TerminalItem error.
    #[track_caller]
    pub fn assert_terminal_item<T: std::fmt::Debug>(result: &CustodiaResult<T>) {
        match result {
            Err(CustodiaError::Lifecycle(LifecycleError::TerminalItem { .. })) => {}
            other => panic!("Expected TerminalItem error, got: {:?}", other),
        }
    }

    /// Assert that `records` forms a continuous chain rooted at `seized_by`.
    #[track_caller]
    pub fn assert_chain_continuous(records: &[CustodyRecord], seized_by: PrincipalId) {
        if let Some(first) = records.first() {
            if let Some(root_from) = first.from_principal {
                assert_eq!(
                    root_from, seized_by,
                    "Chain root not anchored to the seizing principal"
                );
            }
        }
        for pair in records.windows(2) {
            assert_eq!(
                pair[1].from_principal,
                Some(pair[0].to_principal),
                "Chain adjacency violated between {} and {}",
                pair[0].record_id,
                pair[1].record_id
            );
            assert!(
                pair[0].transferred_at <= pair[1].transferred_at,
                "Chain timestamps run backwards"
            );
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

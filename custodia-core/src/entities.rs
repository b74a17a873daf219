//! Entity types for the evidence lifecycle and custody ledger

use crate::{
    AuditAction, AuditEntryId, CategoryId, CustodyRecordId, EntityId, EntityKind, EvidenceStatus,
    ItemId, PrincipalId, Timestamp, new_entity_id, now,
};
use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

// ============================================================================
// EVIDENCE ITEM
// ============================================================================

/// GPS coordinates captured at seizure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A physical seized item tracked through its legal lifecycle.
///
/// The current holder is never stored here; it is derived from the item's
/// custody chain, falling back to `seized_by` while the chain is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub item_id: ItemId,
    /// Human-readable seizure number, globally unique,
    /// format `<PREFIX>-<year>-<6 digits>`.
    pub seizure_number: String,
    pub name: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub estimated_value: Option<f64>,
    pub weight_kg: Option<f64>,
    pub category_id: Option<CategoryId>,
    pub barcode: Option<String>,
    pub rfid_tag: Option<String>,
    pub status: EvidenceStatus,
    pub seized_at: Timestamp,
    pub seizure_location: Option<String>,
    pub gps: Option<GeoPoint>,
    /// Principal who performed the seizure; anchors the custody chain root.
    pub seized_by: PrincipalId,
    pub case_number: String,
    pub court_case_number: Option<String>,
    pub storage_location: Option<String>,
    /// Opaque attachment references supplied by the external file store.
    pub attachment_refs: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input fields for creating an evidence item at seizure intake.
///
/// `seizure_number` and `seized_at` default when absent; everything else is
/// carried onto the item verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub seizure_number: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub estimated_value: Option<f64>,
    pub weight_kg: Option<f64>,
    pub category_id: Option<CategoryId>,
    pub barcode: Option<String>,
    pub rfid_tag: Option<String>,
    pub seized_at: Option<Timestamp>,
    pub seizure_location: Option<String>,
    pub gps: Option<GeoPoint>,
    pub seized_by: PrincipalId,
    pub case_number: String,
    pub court_case_number: Option<String>,
    pub storage_location: Option<String>,
    pub attachment_refs: Vec<String>,
}

impl EvidenceItem {
    /// Build a new item from a draft with the resolved seizure number.
    /// Status always starts at `Seized`.
    pub fn new(draft: ItemDraft, seizure_number: String) -> Self {
        let created_at = now();
        Self {
            item_id: new_entity_id(),
            seizure_number,
            name: draft.name,
            description: draft.description,
            quantity: draft.quantity,
            unit: draft.unit,
            estimated_value: draft.estimated_value,
            weight_kg: draft.weight_kg,
            category_id: draft.category_id,
            barcode: draft.barcode,
            rfid_tag: draft.rfid_tag,
            status: EvidenceStatus::Seized,
            seized_at: draft.seized_at.unwrap_or(created_at),
            seizure_location: draft.seizure_location,
            gps: draft.gps,
            seized_by: draft.seized_by,
            case_number: draft.case_number,
            court_case_number: draft.court_case_number,
            storage_location: draft.storage_location,
            attachment_refs: draft.attachment_refs,
            created_at,
            updated_at: created_at,
        }
    }
}

// ============================================================================
// CUSTODY RECORD
// ============================================================================

/// One link in an item's append-only custody chain.
///
/// `from_principal` is `None` only on a chain-root record; every later
/// record's `from_principal` equals the previous record's `to_principal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyRecord {
    pub record_id: CustodyRecordId,
    pub item_id: ItemId,
    pub from_principal: Option<PrincipalId>,
    pub to_principal: PrincipalId,
    pub reason: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub transferred_at: Timestamp,
}

impl CustodyRecord {
    /// Build a new transfer record with a fresh id and the current timestamp.
    pub fn new(
        item_id: ItemId,
        from_principal: Option<PrincipalId>,
        to_principal: PrincipalId,
        reason: String,
        location: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            record_id: new_entity_id(),
            item_id,
            from_principal,
            to_principal,
            reason,
            location,
            notes,
            transferred_at: now(),
        }
    }
}

// ============================================================================
// AUDIT ENTRY
// ============================================================================

/// Immutable record pairing a mutation with its actor, target, and the
/// snapshot of the values written. Created once per accepted mutation,
/// never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entry_id: AuditEntryId,
    pub principal: PrincipalId,
    pub action: AuditAction,
    /// Weak reference to the target: table discriminator plus record id.
    pub target_kind: EntityKind,
    pub target_id: EntityId,
    pub snapshot: serde_json::Value,
    pub created_at: Timestamp,
}

impl AuditEntry {
    /// Build a new entry with a fresh id and the current timestamp.
    pub fn new(
        principal: PrincipalId,
        action: AuditAction,
        target_kind: EntityKind,
        target_id: EntityId,
        snapshot: serde_json::Value,
    ) -> Self {
        Self {
            entry_id: new_entity_id(),
            principal,
            action,
            target_kind,
            target_id,
            snapshot,
            created_at: now(),
        }
    }
}

// ============================================================================
// SEIZURE NUMBERS
// ============================================================================

/// Pattern every seizure number must match: an uppercase prefix, a four-digit
/// year, and a six-digit suffix.
static SEIZURE_NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // [0-9] rather than \d: no Unicode digits in seizure numbers
    Regex::new(r"^[A-Z][A-Z0-9]{1,11}-[0-9]{4}-[0-9]{6}$").expect("Invalid seizure number regex")
});

/// Source for generated seizure-number suffixes. Seeded from wall-clock
/// millis and ratcheted so concurrent generations never repeat a value.
static SUFFIX_SOURCE: AtomicI64 = AtomicI64::new(0);

fn next_suffix_source() -> i64 {
    let now_millis = now().timestamp_millis();
    let mut prev = SUFFIX_SOURCE.load(Ordering::Relaxed);
    loop {
        let next = now_millis.max(prev + 1);
        match SUFFIX_SOURCE.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return next,
            Err(actual) => prev = actual,
        }
    }
}

/// Whether `s` is a well-formed seizure number.
pub fn seizure_number_is_valid(s: &str) -> bool {
    SEIZURE_NUMBER_PATTERN.is_match(s)
}

/// Generate a seizure number `<prefix>-<current year>-<6 digits>`.
///
/// The six-digit suffix comes from a monotonically distinct millisecond
/// counter, so two generations in the same process never collide. The suffix
/// space recycles over longer spans; callers enforce uniqueness at insert.
pub fn generate_seizure_number(prefix: &str) -> String {
    let year = now().year();
    let suffix = next_suffix_source() % 1_000_000;
    format!("{}-{}-{:06}", prefix, year, suffix)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_test_draft() -> ItemDraft {
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

    #[test]
    fn test_item_new_starts_seized_with_draft_fields() {
        let draft = make_test_draft();
        let seized_by = draft.seized_by;
        let item = EvidenceItem::new(draft, "CMS-2025-104233".to_string());

        assert_eq!(item.status, EvidenceStatus::Seized);
        assert_eq!(item.seizure_number, "CMS-2025-104233");
        assert_eq!(item.name, "Counterfeit watches");
        assert_eq!(item.seized_by, seized_by);
        assert_eq!(item.created_at, item.updated_at);
        assert_eq!(item.seized_at, item.created_at);
        assert_eq!(item.attachment_refs.len(), 1);
    }

    #[test]
    fn test_item_new_keeps_explicit_seizure_timestamp() {
        let seized_at = now() - chrono::Duration::hours(6);
        let draft = ItemDraft {
            seized_at: Some(seized_at),
            ..make_test_draft()
        };
        let item = EvidenceItem::new(draft, "CMS-2025-104234".to_string());
        assert_eq!(item.seized_at, seized_at);
        assert!(item.created_at > item.seized_at);
    }

    #[test]
    fn test_custody_record_new_assigns_id_and_timestamp() {
        let item_id = new_entity_id();
        let to = new_entity_id();
        let record = CustodyRecord::new(
            item_id,
            None,
            to,
            "Initial seizure custody".to_string(),
            None,
            None,
        );
        assert_eq!(record.item_id, item_id);
        assert_eq!(record.from_principal, None);
        assert_eq!(record.to_principal, to);
        assert!(!record.record_id.is_nil());
    }

    #[test]
    fn test_audit_entry_new_carries_target_reference() {
        let target = new_entity_id();
        let entry = AuditEntry::new(
            new_entity_id(),
            AuditAction::StatusChange,
            EntityKind::EvidenceItem,
            target,
            serde_json::json!({"old_status": "seized", "new_status": "in_custody"}),
        );
        assert_eq!(entry.action, AuditAction::StatusChange);
        assert_eq!(entry.target_kind, EntityKind::EvidenceItem);
        assert_eq!(entry.target_id, target);
        assert_eq!(entry.snapshot["new_status"], "in_custody");
    }

    #[test]
    fn test_seizure_number_validation() {
        assert!(seizure_number_is_valid("CMS-2025-000001"));
        assert!(seizure_number_is_valid("EV2-2024-999999"));
        assert!(!seizure_number_is_valid("cms-2025-000001"));
        assert!(!seizure_number_is_valid("CMS-25-000001"));
        assert!(!seizure_number_is_valid("CMS-2025-1"));
        assert!(!seizure_number_is_valid("CMS-2025-0000012"));
        assert!(!seizure_number_is_valid("2025-000001"));
    }

    #[test]
    fn test_generated_seizure_numbers_are_valid_and_distinct() {
        let a = generate_seizure_number("CMS");
        let b = generate_seizure_number("CMS");
        assert!(seizure_number_is_valid(&a));
        assert!(seizure_number_is_valid(&b));
        assert_ne!(a, b);
    }

    mod prop_tests {
        use super::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            #[test]
            fn prop_generated_numbers_match_pattern(prefix in "[A-Z][A-Z0-9]{1,11}") {
                let number = generate_seizure_number(&prefix);
                prop_assert!(seizure_number_is_valid(&number));
                let has_prefix = number.starts_with(&format!("{}-", prefix));
                prop_assert!(has_prefix);
            }

            #[test]
            fn prop_generation_burst_never_repeats(n in 2usize..40) {
                let numbers: Vec<String> =
                    (0..n).map(|_| generate_seizure_number("CMS")).collect();
                let mut deduped = numbers.clone();
                deduped.sort();
                deduped.dedup();
                prop_assert_eq!(deduped.len(), numbers.len());
            }
        }
    }
}

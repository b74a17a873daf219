//! Basic Custody Example
//!
//! Demonstrates the fundamental Custodia workflow:
//! 1. Intake a seized item (with an initial custodian)
//! 2. Move it along the status lifecycle
//! 3. Transfer custody between handlers
//! 4. Read the chain back and verify continuity
//! 5. Review the audit trail
//!
//! This example uses the in-memory storage, the single authoritative
//! backend per deployment.

use custodia_core::{
    new_entity_id, CustodiaConfig, CustodiaResult, EvidenceStatus, GeoPoint, ItemDraft,
};
use custodia_lifecycle::{IntakeRequest, LifecycleCoordinator, TransferRequest};
use custodia_storage::InMemoryStorage;
use std::sync::Arc;

fn main() -> CustodiaResult<()> {
    println!("=== Custodia Basic Custody Example ===\n");

    // Step 1: Wire the coordinator over an in-memory store
    let storage = Arc::new(InMemoryStorage::new());
    let coordinator = LifecycleCoordinator::new(storage, CustodiaConfig::default())?;
    println!("✓ Coordinator initialized (in-memory storage)");

    // Step 2: Intake a seizure, handing initial custody to the evidence clerk
    let officer = new_entity_id();
    let clerk = new_entity_id();
    let analyst = new_entity_id();

    let item = coordinator.intake(
        IntakeRequest {
            draft: make_draft(officer),
            initial_custodian: Some(clerk),
        },
        officer,
    )?;
    println!("\n✓ Item created");
    println!("  ID: {}", item.item_id);
    println!("  Seizure number: {}", item.seizure_number);
    println!("  Status: {}", item.status);
    println!("  Current holder: {}", coordinator.current_holder(item.item_id)?);

    // Step 3: Check the item into controlled custody
    let item_id = item.item_id;
    coordinator.change_status(item_id, EvidenceStatus::InCustody, clerk)?;
    println!("\n✓ Status moved to {}", EvidenceStatus::InCustody);

    // Step 4: Hand the item to an analyst for examination
    coordinator.transfer(
        item_id,
        TransferRequest {
            to_principal: analyst,
            from_override: None,
            reason: "Forensic examination".to_string(),
            location: Some("Lab intake desk".to_string()),
            notes: Some("Sealed bag, tamper tape intact".to_string()),
        },
        clerk,
    )?;
    coordinator.change_status(item_id, EvidenceStatus::UnderInvestigation, analyst)?;
    println!("\n✓ Custody transferred to analyst, item under investigation");

    // Step 5: Read the chain back, newest first
    let display = coordinator.chain_display(item_id)?;
    println!("\n✓ Custody chain ({} records, newest first):", display.len());
    for view in &display {
        let record = &view.record;
        match record.from_principal {
            Some(from) => println!("  {} -> {} ({})", from, record.to_principal, record.reason),
            None => println!("  root -> {} ({})", record.to_principal, record.reason),
        }
    }
    println!("  Continuity verified: {}", coordinator.verify_chain(item_id)?);

    // Step 6: Review the audit trail for the item
    let entries = coordinator.audit_for_target(
        custodia_core::EntityKind::EvidenceItem,
        item_id,
    )?;
    println!("\n✓ Audit entries targeting the item: {}", entries.len());
    for entry in &entries {
        println!("  {} by {}", entry.action, entry.principal);
    }

    let stats = coordinator.stats()?;
    println!("\n✓ Statistics");
    println!("  Total items: {}", stats.total_items);
    println!("  Total estimated value: {}", stats.total_estimated_value);

    println!("\n=== Example complete ===");
    Ok(())
}

fn make_draft(officer: custodia_core::PrincipalId) -> ItemDraft {
    ItemDraft {
        seizure_number: None,
        name: "Counterfeit watches".to_string(),
        description: Some("Crate of counterfeit wristwatches".to_string()),
        quantity: 40.0,
        unit: "pieces".to_string(),
        estimated_value: Some(12000.0),
        weight_kg: Some(18.5),
        category_id: None,
        barcode: Some("8412345678905".to_string()),
        rfid_tag: None,
        seized_at: None,
        seizure_location: Some("Pier 4 warehouse".to_string()),
        gps: Some(GeoPoint {
            latitude: 40.7128,
            longitude: -74.006,
        }),
        seized_by: officer,
        case_number: "CASE-7781".to_string(),
        court_case_number: None,
        storage_location: Some("Evidence room B, shelf 12".to_string()),
        attachment_refs: vec!["files://seizures/7781/photo-01.jpg".to_string()],
    }
}

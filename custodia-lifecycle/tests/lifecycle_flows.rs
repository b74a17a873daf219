//! End-to-end lifecycle flows through the coordinator

use custodia_lifecycle::{
    IntakeRequest, LifecycleCoordinator, TransferRequest, ROOT_CUSTODY_REASON,
};
use custodia_test_utils::assertions::{
    assert_chain_continuous, assert_invalid_transition, assert_not_found, assert_terminal_item,
};
use custodia_test_utils::fixtures::make_test_draft;
use custodia_test_utils::*;
use std::sync::{Arc, Barrier};
use std::thread;

fn make_coordinator() -> (Arc<InMemoryStorage>, LifecycleCoordinator) {
    let storage = Arc::new(InMemoryStorage::new());
    let coordinator = LifecycleCoordinator::new(storage.clone(), CustodiaConfig::default())
        .expect("default config is valid");
    (storage, coordinator)
}

fn make_transfer(to: PrincipalId) -> TransferRequest {
    TransferRequest {
        to_principal: to,
        from_override: None,
        reason: "Handover for analysis".to_string(),
        location: Some("Lab intake desk".to_string()),
        notes: None,
    }
}

fn intake_seized_by(
    coordinator: &LifecycleCoordinator,
    seized_by: PrincipalId,
    acting: PrincipalId,
) -> EvidenceItem {
    let draft = ItemDraft {
        seized_by,
        ..make_test_draft()
    };
    coordinator
        .intake(
            IntakeRequest {
                draft,
                initial_custodian: None,
            },
            acting,
        )
        .expect("intake succeeds")
}

#[test]
fn custody_chain_stays_continuous_across_transfers() {
    let (_, coordinator) = make_coordinator();
    let officer1 = new_entity_id();
    let officer2 = new_entity_id();
    let officer3 = new_entity_id();
    let item = intake_seized_by(&coordinator, officer1, officer1);

    coordinator
        .transfer(item.item_id, make_transfer(officer2), officer1)
        .unwrap();
    coordinator
        .transfer(item.item_id, make_transfer(officer3), officer2)
        .unwrap();

    let chain = coordinator.chain(item.item_id).unwrap();
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].from_principal, Some(officer1));
    assert_eq!(chain[0].to_principal, officer2);
    assert_eq!(chain[1].from_principal, Some(officer2));
    assert_eq!(chain[1].to_principal, officer3);
    assert_chain_continuous(&chain, officer1);

    assert_eq!(coordinator.current_holder(item.item_id).unwrap(), officer3);
    assert!(coordinator.verify_chain(item.item_id).unwrap());

    // Display variant is the same sequence, newest first
    let display = coordinator.chain_display(item.item_id).unwrap();
    assert_eq!(display.len(), 2);
    assert_eq!(display[0].record.to_principal, officer3);
    assert_eq!(display[1].record.to_principal, officer2);
}

#[test]
fn intake_with_initial_custodian_materializes_root() {
    let (_, coordinator) = make_coordinator();
    let officer1 = new_entity_id();
    let custodian = new_entity_id();
    let draft = ItemDraft {
        seized_by: officer1,
        ..make_test_draft()
    };
    let item = coordinator
        .intake(
            IntakeRequest {
                draft,
                initial_custodian: Some(custodian),
            },
            officer1,
        )
        .unwrap();

    let chain = coordinator.chain(item.item_id).unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].from_principal, None);
    assert_eq!(chain[0].to_principal, custodian);
    assert_eq!(chain[0].reason, ROOT_CUSTODY_REASON);
    assert_eq!(coordinator.current_holder(item.item_id).unwrap(), custodian);
    assert!(coordinator.verify_chain(item.item_id).unwrap());

    // The next transfer links to the root custodian, not the seizing officer
    let handler = new_entity_id();
    let record = coordinator
        .transfer(item.item_id, make_transfer(handler), custodian)
        .unwrap();
    assert_eq!(record.from_principal, Some(custodian));
    assert_chain_continuous(&coordinator.chain(item.item_id).unwrap(), officer1);
}

#[test]
fn status_walk_reaches_destruction_then_locks_out() {
    let (_, coordinator) = make_coordinator();
    let acting = new_entity_id();
    let item = intake_seized_by(&coordinator, acting, acting);

    for status in [
        EvidenceStatus::InCustody,
        EvidenceStatus::UnderInvestigation,
        EvidenceStatus::PendingDestruction,
        EvidenceStatus::Destroyed,
    ] {
        coordinator
            .change_status(item.item_id, status, acting)
            .unwrap();
    }
    assert_eq!(
        coordinator.item(item.item_id).unwrap().status,
        EvidenceStatus::Destroyed
    );

    // Terminal: no status moves, no transfers, no amendments
    let status_result = coordinator.change_status(item.item_id, EvidenceStatus::InCustody, acting);
    assert_invalid_transition(
        &status_result,
        EvidenceStatus::Destroyed,
        EvidenceStatus::InCustody,
    );

    let transfer_result = coordinator.transfer(item.item_id, make_transfer(new_entity_id()), acting);
    assert_terminal_item(&transfer_result);

    let amend_result = coordinator.amend_details(
        item.item_id,
        EvidenceItemUpdate {
            storage_location: Some("Incinerator bay".to_string()),
            ..Default::default()
        },
        acting,
    );
    assert_terminal_item(&amend_result);
}

#[test]
fn seized_item_cannot_jump_to_pending_destruction() {
    let (_, coordinator) = make_coordinator();
    let acting = new_entity_id();
    let item = intake_seized_by(&coordinator, acting, acting);

    let result = coordinator.change_status(item.item_id, EvidenceStatus::PendingDestruction, acting);
    assert_invalid_transition(
        &result,
        EvidenceStatus::Seized,
        EvidenceStatus::PendingDestruction,
    );
}

#[test]
fn item_under_investigation_cannot_be_destroyed_directly() {
    let (_, coordinator) = make_coordinator();
    let acting = new_entity_id();
    let item = intake_seized_by(&coordinator, acting, acting);
    coordinator
        .change_status(item.item_id, EvidenceStatus::InCustody, acting)
        .unwrap();
    coordinator
        .change_status(item.item_id, EvidenceStatus::UnderInvestigation, acting)
        .unwrap();

    let result = coordinator.change_status(item.item_id, EvidenceStatus::Destroyed, acting);
    assert_invalid_transition(
        &result,
        EvidenceStatus::UnderInvestigation,
        EvidenceStatus::Destroyed,
    );
}

#[test]
fn transfer_against_unknown_item_is_not_found() {
    let (_, coordinator) = make_coordinator();
    let result = coordinator.transfer(new_entity_id(), make_transfer(new_entity_id()), new_entity_id());
    assert_not_found(&result, EntityKind::EvidenceItem);
}

#[test]
fn stale_transfer_leaves_ledger_untouched() {
    let (storage, coordinator) = make_coordinator();
    let officer1 = new_entity_id();
    let officer2 = new_entity_id();
    let item = intake_seized_by(&coordinator, officer1, officer1);
    coordinator
        .transfer(item.item_id, make_transfer(officer2), officer1)
        .unwrap();
    let audits_before = storage.audit_count().unwrap();

    let stale = TransferRequest {
        from_override: Some(officer1),
        ..make_transfer(new_entity_id())
    };
    let result = coordinator.transfer(item.item_id, stale, officer1);
    assert!(matches!(
        result,
        Err(CustodiaError::Lifecycle(LifecycleError::ChainBreak {
            supplied: Some(supplied),
            expected,
            ..
        })) if supplied == officer1 && expected == officer2
    ));

    assert_eq!(coordinator.chain(item.item_id).unwrap().len(), 1);
    assert_eq!(coordinator.current_holder(item.item_id).unwrap(), officer2);
    assert_eq!(storage.audit_count().unwrap(), audits_before);
}

#[test]
fn concurrent_stale_transfers_elect_exactly_one_winner() {
    let (_, coordinator) = make_coordinator();
    let officer1 = new_entity_id();
    let acting = new_entity_id();
    let item = intake_seized_by(&coordinator, officer1, acting);
    let item_id = item.item_id;

    // Both threads claim custody from officer1; whichever lands second is
    // acting on stale state and must break.
    let barrier = Barrier::new(2);
    let results: Vec<CustodiaResult<CustodyRecord>> = thread::scope(|s| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let coordinator = coordinator.clone();
                let barrier = &barrier;
                s.spawn(move || {
                    let request = TransferRequest {
                        to_principal: new_entity_id(),
                        from_override: Some(officer1),
                        reason: "Racing handover".to_string(),
                        location: None,
                        notes: None,
                    };
                    barrier.wait();
                    coordinator.transfer(item_id, request, acting)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("transfer thread panicked"))
            .collect()
    });

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one racer may win: {:?}", results);
    let loser = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        loser,
        Err(CustodiaError::Lifecycle(LifecycleError::ChainBreak { .. }))
    ));

    assert_eq!(coordinator.chain(item_id).unwrap().len(), 1);
    assert!(coordinator.verify_chain(item_id).unwrap());
}

#[test]
fn every_mutation_commits_exactly_one_audit_entry() {
    let (storage, coordinator) = make_coordinator();
    let acting = new_entity_id();
    let custodian = new_entity_id();
    let draft = make_test_draft();
    let item = coordinator
        .intake(
            IntakeRequest {
                draft,
                initial_custodian: Some(custodian),
            },
            acting,
        )
        .unwrap();
    coordinator
        .change_status(item.item_id, EvidenceStatus::InCustody, acting)
        .unwrap();
    let record = coordinator
        .transfer(item.item_id, make_transfer(new_entity_id()), acting)
        .unwrap();
    coordinator
        .amend_details(
            item.item_id,
            EvidenceItemUpdate {
                court_case_number: Some("CR-2025-0141".to_string()),
                ..Default::default()
            },
            acting,
        )
        .unwrap();

    // Intake with a custodian is two mutations (create + root record)
    assert_eq!(storage.audit_count().unwrap(), 5);
    let entries = coordinator.audit_by_actor(acting).unwrap();
    let actions: Vec<AuditAction> = entries.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            AuditAction::CreateSeizure,
            AuditAction::CustodyTransfer,
            AuditAction::StatusChange,
            AuditAction::CustodyTransfer,
            AuditAction::UpdateDetails,
        ]
    );

    let item_entries = coordinator
        .audit_for_target(EntityKind::EvidenceItem, item.item_id)
        .unwrap();
    assert_eq!(item_entries.len(), 3);
    let record_entries = coordinator
        .audit_for_target(EntityKind::CustodyRecord, record.record_id)
        .unwrap();
    assert_eq!(record_entries.len(), 1);
}

#[test]
fn read_projections_resolve_display_data() {
    let (_, coordinator) = make_coordinator();
    let officer = new_entity_id();
    let handler = new_entity_id();
    let category_id = new_entity_id();

    let mut directory = InMemoryPrincipalDirectory::new();
    directory.insert(officer, "Dana Reyes", Some("B-4410"));
    directory.insert(handler, "Sam Okafor", None);
    let mut catalog = InMemoryCategoryCatalog::new();
    catalog.insert(category_id, "Counterfeit goods", RiskLevel::Medium);
    let coordinator = coordinator
        .with_principal_directory(Arc::new(directory))
        .with_category_catalog(Arc::new(catalog));

    let draft = ItemDraft {
        seized_by: officer,
        category_id: Some(category_id),
        ..make_test_draft()
    };
    let item = coordinator
        .intake(
            IntakeRequest {
                draft,
                initial_custodian: None,
            },
            officer,
        )
        .unwrap();
    coordinator
        .transfer(item.item_id, make_transfer(handler), officer)
        .unwrap();

    let detail = coordinator.item_detail(item.item_id).unwrap();
    assert_eq!(detail.current_holder, handler);
    assert_eq!(
        detail.current_holder_info.as_ref().map(|p| p.full_name.as_str()),
        Some("Sam Okafor")
    );
    assert_eq!(
        detail.seized_by_info.as_ref().map(|p| p.full_name.as_str()),
        Some("Dana Reyes")
    );
    assert_eq!(
        detail.category.as_ref().map(|c| c.risk_level),
        Some(RiskLevel::Medium)
    );

    let display = coordinator.chain_display(item.item_id).unwrap();
    assert_eq!(
        display[0].to_info.as_ref().map(|p| p.full_name.as_str()),
        Some("Sam Okafor")
    );
    assert_eq!(
        display[0].from_info.as_ref().map(|p| p.full_name.as_str()),
        Some("Dana Reyes")
    );

    let views = coordinator.list_items(&ItemFilter::default()).unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].current_holder, handler);

    let stats = coordinator.stats().unwrap();
    assert_eq!(stats.total_items, 1);
    assert_eq!(stats.by_status.get(&EvidenceStatus::Seized), Some(&1));
}

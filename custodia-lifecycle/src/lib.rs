//! Custodia Lifecycle - Evidence Lifecycle & Custody Ledger
//!
//! The service layer over [`custodia_storage`]:
//! - [`AuditWriter`] - composes one immutable audit entry per mutation and
//!   exposes the audit read surface
//! - [`EvidenceItemStore`] - owns the per-item state machine and item reads
//! - [`CustodyLedger`] - owns the append-only per-item custody chain
//! - [`LifecycleCoordinator`] - the caller-facing surface sequencing intake,
//!   transfers, and status changes, each atomic with its audit entry
//!
//! Data flows one way: coordinator -> item store / ledger -> audit writer ->
//! storage. Mutations on one item are serialized through [`ItemLockRegistry`];
//! operations on different items never contend.

mod audit;
mod coordinator;
mod items;
mod ledger;
mod locks;

pub use audit::AuditWriter;
pub use coordinator::{IntakeRequest, LifecycleCoordinator};
pub use items::{EvidenceItemStore, EvidenceItemView};
pub use ledger::{CustodyLedger, CustodyRecordView, TransferRequest, ROOT_CUSTODY_REASON};
pub use locks::ItemLockRegistry;

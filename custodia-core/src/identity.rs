//! Identity types for Custodia entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Evidence item identifier.
pub type ItemId = EntityId;

/// Custody record identifier.
pub type CustodyRecordId = EntityId;

/// Audit entry identifier.
pub type AuditEntryId = EntityId;

/// Category identifier, resolved by the external category catalog.
pub type CategoryId = EntityId;

/// Opaque identifier of an acting principal (handler, supervisor, auditor).
/// Issued and authenticated by the external identity collaborator.
pub type PrincipalId = EntityId;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

/// Current wall-clock time in UTC.
pub fn now() -> Timestamp {
    Utc::now()
}

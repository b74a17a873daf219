//! Enum types for Custodia entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// EVIDENCE STATUS
// ============================================================================

/// Lifecycle status of an evidence item.
///
/// Transitions follow a forward-only graph enforced by
/// [`EvidenceStatus::can_transition_to`]; `Destroyed` and `Released` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStatus {
    /// Just seized, not yet checked into an evidence room
    #[default]
    Seized,
    /// Held in controlled custody
    InCustody,
    /// Pulled for active investigation
    UnderInvestigation,
    /// Queued for destruction, awaiting disposition
    PendingDestruction,
    /// Physically destroyed (terminal)
    Destroyed,
    /// Released back to owner or another agency (terminal)
    Released,
}

impl EvidenceStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            EvidenceStatus::Seized => "seized",
            EvidenceStatus::InCustody => "in_custody",
            EvidenceStatus::UnderInvestigation => "under_investigation",
            EvidenceStatus::PendingDestruction => "pending_destruction",
            EvidenceStatus::Destroyed => "destroyed",
            EvidenceStatus::Released => "released",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, EvidenceStatusParseError> {
        match s.to_lowercase().as_str() {
            "seized" => Ok(EvidenceStatus::Seized),
            "in_custody" => Ok(EvidenceStatus::InCustody),
            "under_investigation" => Ok(EvidenceStatus::UnderInvestigation),
            "pending_destruction" => Ok(EvidenceStatus::PendingDestruction),
            "destroyed" => Ok(EvidenceStatus::Destroyed),
            "released" => Ok(EvidenceStatus::Released),
            _ => Err(EvidenceStatusParseError(s.to_string())),
        }
    }

    /// Terminal statuses accept no further transitions or custody transfers.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EvidenceStatus::Destroyed | EvidenceStatus::Released)
    }

    /// Whether the state machine permits moving from `self` to `next`.
    ///
    /// Adjacency only; `Released` is reachable from every non-terminal
    /// status, `Destroyed` only from `PendingDestruction`, and
    /// `InCustody`/`UnderInvestigation` may be revisited from each other.
    /// Self-transitions are not permitted.
    pub fn can_transition_to(&self, next: EvidenceStatus) -> bool {
        use EvidenceStatus::*;
        match self {
            Seized => matches!(next, InCustody | Released),
            InCustody => matches!(next, UnderInvestigation | Released),
            UnderInvestigation => matches!(next, InCustody | PendingDestruction | Released),
            PendingDestruction => matches!(next, Destroyed | Released),
            Destroyed | Released => false,
        }
    }
}

impl fmt::Display for EvidenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for EvidenceStatus {
    type Err = EvidenceStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid evidence status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceStatusParseError(pub String);

impl fmt::Display for EvidenceStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid evidence status: {}", self.0)
    }
}

impl std::error::Error for EvidenceStatusParseError {}

// ============================================================================
// AUDIT ACTION
// ============================================================================

/// Action kind recorded on an audit entry, one per mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Evidence item created at seizure intake
    CreateSeizure,
    /// Item status moved along the lifecycle graph
    StatusChange,
    /// Custody record appended to an item's chain
    CustodyTransfer,
    /// Post-intake amendment of an item's mutable detail fields
    UpdateDetails,
}

impl AuditAction {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            AuditAction::CreateSeizure => "CREATE_SEIZURE",
            AuditAction::StatusChange => "STATUS_CHANGE",
            AuditAction::CustodyTransfer => "CUSTODY_TRANSFER",
            AuditAction::UpdateDetails => "UPDATE_DETAILS",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, AuditActionParseError> {
        match s.to_uppercase().as_str() {
            "CREATE_SEIZURE" => Ok(AuditAction::CreateSeizure),
            "STATUS_CHANGE" => Ok(AuditAction::StatusChange),
            "CUSTODY_TRANSFER" => Ok(AuditAction::CustodyTransfer),
            "UPDATE_DETAILS" => Ok(AuditAction::UpdateDetails),
            _ => Err(AuditActionParseError(s.to_string())),
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for AuditAction {
    type Err = AuditActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid audit action string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditActionParseError(pub String);

impl fmt::Display for AuditActionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid audit action: {}", self.0)
    }
}

impl std::error::Error for AuditActionParseError {}

// ============================================================================
// ENTITY KIND
// ============================================================================

/// Entity discriminator for polymorphic references (audit targets, storage
/// errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    EvidenceItem,
    CustodyRecord,
    AuditEntry,
}

impl EntityKind {
    /// Logical table name for this entity kind.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::EvidenceItem => "evidence_items",
            EntityKind::CustodyRecord => "custody_records",
            EntityKind::AuditEntry => "audit_entries",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_name())
    }
}

// ============================================================================
// RISK LEVEL
// ============================================================================

/// Risk level attached to a contraband category by the external catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, RiskLevelParseError> {
        match s.to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            _ => Err(RiskLevelParseError(s.to_string())),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for RiskLevel {
    type Err = RiskLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid risk level string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskLevelParseError(pub String);

impl fmt::Display for RiskLevelParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid risk level: {}", self.0)
    }
}

impl std::error::Error for RiskLevelParseError {}

// =============================================================================
// TESTS
// =============================================================================

//! Collaborator traits for external reference data
//!
//! Identity and category taxonomy live outside this subsystem. Read views
//! resolve display data through these traits; a miss is an omission in the
//! enriched output, never an error.

use crate::{CategoryId, PrincipalId, RiskLevel};
use serde::{Deserialize, Serialize};

// ============================================================================
// PRINCIPAL DIRECTORY
// ============================================================================

/// Display data for a principal, resolved from the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalInfo {
    pub full_name: String,
    pub badge_number: Option<String>,
}

/// Trait for resolving principal ids to display data.
/// Implementations must be thread-safe (Send + Sync).
///
/// # Example
/// ```ignore
/// struct LdapDirectory { /* ... */ }
///
/// impl PrincipalDirectory for LdapDirectory {
///     fn lookup_principal(&self, principal: PrincipalId) -> Option<PrincipalInfo> {
///         // Query the directory server
///     }
/// }
/// ```
pub trait PrincipalDirectory: Send + Sync {
    /// Resolve a principal id to display data.
    ///
    /// # Returns
    /// * `Some(PrincipalInfo)` - Name and badge number for enriched views
    /// * `None` - Unknown principal; callers render the bare id
    fn lookup_principal(&self, principal: PrincipalId) -> Option<PrincipalInfo>;
}

// ============================================================================
// CATEGORY CATALOG
// ============================================================================

/// Display data for a contraband category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    pub risk_level: RiskLevel,
}

/// Trait for resolving category ids to display data.
/// Implementations must be thread-safe (Send + Sync).
pub trait CategoryCatalog: Send + Sync {
    /// Resolve a category id, or `None` when the catalog has no match.
    fn lookup_category(&self, category: CategoryId) -> Option<CategoryInfo>;
}

//! Custodia Core - Entity Types
//!
//! Pure data structures for the evidence lifecycle and custody ledger:
//! identifiers, status enums, entities, the error taxonomy, configuration,
//! and the collaborator traits consumed from external services. No storage,
//! no IO - all other crates depend on this one.

mod config;
mod directory;
mod entities;
mod enums;
mod error;
mod identity;

pub use config::*;
pub use directory::*;
pub use entities::*;
pub use enums::*;
pub use error::*;
pub use identity::*;

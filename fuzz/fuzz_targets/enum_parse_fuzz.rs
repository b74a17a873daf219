//! Fuzz test for the enum string parsers
//!
//! This fuzz target tests the db-string parsers with arbitrary byte
//! sequences to find:
//! - Panics or crashes
//! - Values that parse but do not round-trip
//!
//! Run with: cargo +nightly fuzz run enum_parse_fuzz -- -max_total_time=60

#![no_main]

use custodia_core::{AuditAction, EvidenceStatus, RiskLevel};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The parsers should handle any valid UTF-8 string without panicking,
    // returning Ok or a parse error
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(status) = EvidenceStatus::from_db_str(input) {
            assert_eq!(
                EvidenceStatus::from_db_str(status.as_db_str()),
                Ok(status),
                "Status should round-trip through its db string"
            );
            assert_eq!(status.as_db_str(), input.to_lowercase());
        }

        if let Ok(action) = AuditAction::from_db_str(input) {
            assert_eq!(AuditAction::from_db_str(action.as_db_str()), Ok(action));
        }

        if let Ok(level) = RiskLevel::from_db_str(input) {
            assert_eq!(RiskLevel::from_db_str(level.as_db_str()), Ok(level));
        }
    }
});

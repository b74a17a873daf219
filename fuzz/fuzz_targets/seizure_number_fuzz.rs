//! Fuzz test for seizure-number validation
//!
//! This fuzz target tests the validator with arbitrary byte sequences to find:
//! - Panics or crashes
//! - Inputs accepted despite violating the documented format
//!
//! Run with: cargo +nightly fuzz run seizure_number_fuzz -- -max_total_time=60

#![no_main]

use custodia_core::seizure_number_is_valid;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The validator should handle any valid UTF-8 string without panicking
    if let Ok(input) = std::str::from_utf8(data) {
        if seizure_number_is_valid(input) {
            // Anything accepted must have the <PREFIX>-<year>-<6 digits> shape
            let parts: Vec<&str> = input.split('-').collect();
            assert_eq!(parts.len(), 3, "Accepted number should have three segments");
            assert!(
                parts[0].len() >= 2 && parts[0].len() <= 12,
                "Prefix length out of range"
            );
            assert_eq!(parts[1].len(), 4, "Year segment should be four digits");
            assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
            assert_eq!(parts[2].len(), 6, "Suffix segment should be six digits");
            assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
        }
    }
});

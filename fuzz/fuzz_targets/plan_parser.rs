//! Fuzz target for plan loading and variant resolution.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_plan_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use typer_schema::validate_plan_json;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Invalid plans return errors, never panic
        let _ = validate_plan_json(input);
    }
});

//! Shared proptest strategies for schema tests.

use proptest::prelude::*;

/// Strategy for generating arbitrary identifier-like names.
pub fn arb_name() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,11}"
}

/// Strategy for generating scalar type names as they appear in `.proto`
/// files.
pub fn arb_scalar() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("int32".to_string()),
        Just("int64".to_string()),
        Just("string".to_string()),
        Just("bytes".to_string()),
        Just("bool".to_string()),
        Just("double".to_string()),
    ]
}

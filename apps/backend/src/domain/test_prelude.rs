use std::env;

use proptest::prelude::ProptestConfig;

/// Case count comes from `PROPTEST_CASES`, low by default to keep CI fast.
pub fn proptest_config() -> ProptestConfig {
    let cases = env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(64);

    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

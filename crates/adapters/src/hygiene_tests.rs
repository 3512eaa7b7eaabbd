// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn an_invalid_glob_pattern_is_dropped_rather_than_rejected() {
    let hygiene = ProcessHygiene::new(&["[unterminated".to_string()], Duration::from_secs(1));
    assert!(hygiene.patterns.is_empty());
}

#[test]
fn matches_checks_every_configured_pattern() {
    let hygiene = ProcessHygiene::new(
        &["LegacyApp*.exe".to_string(), "helper".to_string()],
        Duration::from_secs(1),
    );
    assert!(hygiene.matches("LegacyApp64.exe"));
    assert!(hygiene.matches("helper"));
    assert!(!hygiene.matches("unrelated.exe"));
}

#[tokio::test]
async fn terminate_family_is_a_no_op_when_nothing_matches() {
    let hygiene = ProcessHygiene::new(
        &["definitely-not-a-real-process-name".to_string()],
        Duration::from_millis(10),
    );
    // No panics, no hang: completes quickly because the match set is empty.
    hygiene.terminate_family("test").await;
}

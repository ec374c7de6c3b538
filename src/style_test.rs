use super::*;

#[test]
fn spinner_sheet_appends_custom_css() {
    let plain = spinner_style_sheet("  ");
    assert!(plain.contains(".vjs-custom-spinner"));
    assert!(!plain.contains("/* custom */"));

    let custom = spinner_style_sheet(".vjs-custom-spinner { width: 60px; }");
    assert!(custom.starts_with(&plain));
    assert!(custom.ends_with(".vjs-custom-spinner { width: 60px; }\n"));
}

#[test]
fn same_text_is_installed_once() {
    assert!(ensure_style_sheet("test-once", "a {}"));
    assert!(!ensure_style_sheet("test-once", "a {}"));
    assert!(!ensure_style_sheet("test-once", "a {}"));
}

#[test]
fn changed_text_is_reinstalled() {
    assert!(ensure_style_sheet("test-changed", "a {}"));
    assert!(ensure_style_sheet("test-changed", "b {}"));
    assert!(!ensure_style_sheet("test-changed", "b {}"));
}

#[test]
fn identities_are_independent() {
    assert!(ensure_style_sheet("test-left", "a {}"));
    assert!(ensure_style_sheet("test-right", "a {}"));
}

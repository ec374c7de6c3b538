use super::*;

fn active(bitrates: &[f64]) -> Vec<ActiveLayer> {
    bitrates
        .iter()
        .enumerate()
        .map(|(i, bitrate)| ActiveLayer::new(&i.to_string(), *bitrate))
        .collect()
}

// =============================================================================
// format_bitrate
// =============================================================================

#[test]
fn format_bitrate_below_one_kilobit_stays_in_bps() {
    assert_eq!(format_bitrate(999.0), "999 bps");
}

#[test]
fn format_bitrate_zero() {
    assert_eq!(format_bitrate(0.0), "0 bps");
}

#[test]
fn format_bitrate_exact_kilobit() {
    assert_eq!(format_bitrate(1000.0), "1 kbps");
}

#[test]
fn format_bitrate_megabits_rounded_to_two_decimals() {
    assert_eq!(format_bitrate(2_500_000.0), "2.5 mbps");
    assert_eq!(format_bitrate(1_234_567.0), "1.23 mbps");
}

#[test]
fn format_bitrate_kilobits_keep_two_decimals() {
    assert_eq!(format_bitrate(1_250.0), "1.25 kbps");
}

#[test]
fn format_bitrate_caps_at_gigabits() {
    assert_eq!(format_bitrate(3_000_000_000_000.0), "3000 gbps");
}

// =============================================================================
// quality_labels
// =============================================================================

#[test]
fn labels_empty_for_single_layer() {
    assert!(quality_labels(&active(&[500_000.0])).is_empty());
}

#[test]
fn labels_two_layers_high_low() {
    assert_eq!(quality_labels(&active(&[2e6, 5e5])), vec!["High", "Low"]);
}

#[test]
fn labels_three_layers_high_medium_low() {
    assert_eq!(quality_labels(&active(&[2e6, 1e6, 5e5])), vec!["High", "Medium", "Low"]);
}

#[test]
fn labels_four_layers_use_bitrates() {
    let labels = quality_labels(&active(&[4e6, 2e6, 800_000.0, 120_000.0]));
    assert_eq!(labels, vec!["4 mbps", "2 mbps", "800 kbps", "120 kbps"]);
}

// =============================================================================
// quality_menu
// =============================================================================

#[test]
fn menu_disabled_with_one_active_layer() {
    let menu = quality_menu(&active(&[1e6]));
    assert!(!menu.enabled);
    assert_eq!(menu.options, vec![QualityOption::auto()]);
    assert_eq!(menu.title(), "Quality disabled");
}

#[test]
fn menu_disabled_with_no_active_layers() {
    let menu = quality_menu(&[]);
    assert!(!menu.enabled);
}

#[test]
fn menu_prepends_auto_and_maps_ids() {
    let layers = vec![ActiveLayer::new("h", 2e6), ActiveLayer::new("l", 3e5)];
    let menu = quality_menu(&layers);
    assert!(menu.enabled);
    assert_eq!(menu.title(), "Quality");
    assert_eq!(menu.options.len(), 3);
    assert_eq!(menu.options[0].res, "auto");
    assert_eq!(menu.options[0].label, "Auto");
    assert_eq!(menu.options[1], QualityOption { label: "High".into(), res: "h".into() });
    assert_eq!(menu.options[2], QualityOption { label: "Low".into(), res: "l".into() });
}

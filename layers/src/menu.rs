//! Quality menu policy derived from the active layer set.

#[cfg(test)]
#[path = "menu_test.rs"]
mod menu_test;

use serde::{Deserialize, Serialize};

use crate::{AUTO_LAYER_ID, ActiveLayer};

const BIT_UNITS: [&str; 4] = ["bps", "kbps", "mbps", "gbps"];

/// One selectable entry in the host's quality menu.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityOption {
    /// Human-readable label.
    pub label: String,
    /// Encoding id handed back to `select_layer` (`"auto"` for the server pick).
    pub res: String,
}

impl QualityOption {
    /// The leading "let the server choose" entry.
    #[must_use]
    pub fn auto() -> Self {
        Self { label: "Auto".to_owned(), res: AUTO_LAYER_ID.to_owned() }
    }
}

/// Quality menu state for the host UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityMenu {
    /// Whether switching is possible (more than one active layer).
    pub enabled: bool,
    /// Options, always starting with [`QualityOption::auto`].
    pub options: Vec<QualityOption>,
}

impl QualityMenu {
    /// Tooltip for the quality button.
    #[must_use]
    pub fn title(&self) -> &'static str {
        if self.enabled { "Quality" } else { "Quality disabled" }
    }
}

/// Build the quality menu for `active`.
///
/// With one or zero active layers switching is disabled and only the auto
/// entry is offered.
#[must_use]
pub fn quality_menu(active: &[ActiveLayer]) -> QualityMenu {
    let mut options = vec![QualityOption::auto()];
    if active.len() <= 1 {
        return QualityMenu { enabled: false, options };
    }
    options.extend(
        active
            .iter()
            .zip(quality_labels(active))
            .map(|(layer, label)| QualityOption { label, res: layer.id.clone() }),
    );
    QualityMenu { enabled: true, options }
}

/// Labels for `active`, in order.
///
/// Two layers are High/Low, three are High/Medium/Low, and four or more are
/// labelled by their formatted bitrate. Fewer than two yields no labels.
#[must_use]
pub fn quality_labels(active: &[ActiveLayer]) -> Vec<String> {
    let fixed: &[&str] = match active.len() {
        0 | 1 => &[],
        2 => &["High", "Low"],
        3 => &["High", "Medium", "Low"],
        _ => return active.iter().map(|layer| format_bitrate(layer.bitrate)).collect(),
    };
    fixed.iter().map(|label| (*label).to_owned()).collect()
}

/// Format a bitrate in bits per second with the largest fitting unit.
///
/// Divides by 1000 while the quotient stays at or above 1 and a larger unit
/// exists, then rounds to two decimals: `2_500_000.0` → `"2.5 mbps"`.
#[must_use]
pub fn format_bitrate(bits_per_second: f64) -> String {
    let mut value = bits_per_second;
    let mut unit = 0;
    while unit + 1 < BIT_UNITS.len() && value / 1000.0 >= 1.0 {
        value /= 1000.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", BIT_UNITS[unit])
}

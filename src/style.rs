//! Stylesheet registry.
//!
//! Hosts install stylesheets by identity (the `id` of a `<style>` element).
//! The registry remembers the text last handed out per identity so a sheet is
//! only (re)written when its text actually changes, no matter how many viewer
//! instances ask for it.

#[cfg(test)]
#[path = "style_test.rs"]
mod style_test;

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::debug;

/// Identity of the loading spinner stylesheet.
pub const SPINNER_STYLE_ID: &str = "vjs-custom-spinner-css";

const SPINNER_CSS: &str = r".video-js .vjs-loading-spinner {
  display: none !important;
}

.video-js .vjs-custom-spinner {
  position: absolute;
  top: 50%;
  left: 50%;
  transform: translate(-50%, -50%);
  width: 40px;
  height: 40px;
  z-index: 1000;
  display: none;
}

.video-js .vjs-custom-spinner::after {
  content: '';
  display: block;
  width: 100%;
  height: 100%;
  border: 4px solid rgba(255, 255, 255, 0.3);
  border-top: 4px solid #ffffff;
  border-radius: 50%;
  animation: vjs-spin 0.7s linear infinite;
}

@keyframes vjs-spin {
  0% { transform: rotate(0deg); }
  100% { transform: rotate(360deg); }
}

.video-js.vjs-waiting .vjs-custom-spinner,
.video-js.vjs-seeking .vjs-custom-spinner {
  display: block;
}
";

fn registry() -> &'static Mutex<HashMap<String, String>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Spinner stylesheet text with `custom_css` appended.
#[must_use]
pub fn spinner_style_sheet(custom_css: &str) -> String {
    let custom = custom_css.trim();
    if custom.is_empty() {
        return SPINNER_CSS.to_owned();
    }
    format!("{SPINNER_CSS}\n/* custom */\n{custom}\n")
}

/// Record `text` as the content of stylesheet `id`.
///
/// Returns `true` when the host must write the sheet: the identity is new or
/// its text changed since the last call. Repeated calls with the same text
/// return `false`.
pub fn ensure_style_sheet(id: &str, text: &str) -> bool {
    let mut sheets = registry().lock().unwrap_or_else(PoisonError::into_inner);
    if sheets.get(id).is_some_and(|current| current == text) {
        return false;
    }
    sheets.insert(id.to_owned(), text.to_owned());
    debug!(id, bytes = text.len(), "stylesheet updated");
    true
}

/// Spinner sheet text to install, or `None` when it is already current.
#[must_use]
pub fn ensure_spinner_style(custom_css: &str) -> Option<String> {
    let text = spinner_style_sheet(custom_css);
    ensure_style_sheet(SPINNER_STYLE_ID, &text).then_some(text)
}

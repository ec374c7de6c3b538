//! Zoom and pan for a single video surface.
//!
//! The crate maps wheel, mouse and touch input onto a scale-and-translate
//! transform applied to the content element. All geometry and gesture logic is
//! plain Rust and testable natively; [`web::Viewport`] is the thin WASM binding
//! that reads the DOM and writes the resulting styles.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`transform`] | Transform, coordinate mapping, pan boundary and clamping |
//! | [`animation`] | Ease-out cubic zoom animation |
//! | [`gesture`] | Gesture state machine returning [`gesture::Action`]s |
//! | [`config`] | Host-facing zoom/pan options |
//! | [`web`] | Browser binding over [`gesture::GestureRouter`] |
//! | [`consts`] | Zoom limits, double-click and animation timings |

pub mod animation;
pub mod config;
pub mod consts;
pub mod gesture;
pub mod transform;
pub mod web;

pub use config::ZoomConfig;
pub use gesture::{Action, Cursor, GestureRouter};
pub use transform::{PanBoundary, Point, Size, Transform};

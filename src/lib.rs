//! Zone assignment and tab ordering for a zone-based window manager.
//!
//! [`assigned::AssignedWindows`] is the core: it records which zones each
//! window is snapped into and keeps the windows sharing a zone combination in
//! a stable tab order. Everything it needs from the outside world goes through
//! the traits in [`host`].

pub mod assigned;
pub mod host;
pub mod keybindings;
pub mod layout;
pub mod settings;
pub mod tracing_sub;
pub mod ui;

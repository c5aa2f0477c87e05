//! Window manager and snap engine for a simulated desktop, with a terminal
//! shell that drives it.
//!
//! [`window::WindowManager`] is the only writer of window state. Hosts
//! subscribe to its notifications and feed it pointer gestures; the
//! [`shell`] module is one such host built on ratatui.

pub mod apps;
pub mod constants;
pub mod drivers;
pub mod error;
pub mod events;
pub mod gesture;
pub mod keybindings;
pub mod layout;
pub mod lifecycle;
pub mod runner;
pub mod shell;
pub mod snapshot;
pub mod tracing_sub;
pub mod window;

//! Application lifecycle and platform integration.
//!
//! - `context`: process-wide state handed to Tauri
//! - `lifecycle`: window lifecycle state machine
//! - `handshake`: one-time auto-login gate
//! - `events`: routing of window and run-loop events
//! - `menu`: application menu

pub mod context;
pub mod events;
pub mod handshake;
pub mod lifecycle;
pub mod paths;
pub mod signals;

#[cfg(desktop)]
pub mod menu;

pub use context::AppContext;
pub use paths::AppPaths;

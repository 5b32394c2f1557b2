//! Auto-login gate for one window instance.

/// Tracks whether the one-time `auto-login` signal is still owed to the
/// current window's content.
///
/// The `content-ready` listener stays registered for the life of the app;
/// this flag is what keeps reloads from logging in again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeState {
    auto_login_requested: bool,
    awaiting_first_ready: bool,
}

impl HandshakeState {
    pub fn new(auto_login_requested: bool) -> Self {
        Self {
            auto_login_requested,
            awaiting_first_ready: true,
        }
    }

    /// Record a `content-ready` signal. Returns true exactly once per
    /// instance, on the first signal, when auto-login was requested.
    pub fn on_content_ready(&mut self) -> bool {
        let first = std::mem::replace(&mut self.awaiting_first_ready, false);
        first && self.auto_login_requested
    }

    pub fn awaiting_first_ready(&self) -> bool {
        self.awaiting_first_ready
    }
}

//! Main-window lifecycle state machine.
//!
//! OS and IPC events are fed in as [`LifecycleEvent`]s; the machine updates
//! its [`Phase`] and returns the [`Action`]s the caller must perform, in
//! order. Nothing here touches Tauri, so every transition is unit-testable.

use serde::Serialize;

use super::handshake::HandshakeState;

/// Identity of one window instance. A window recreated after the previous
/// one was destroyed gets a new id even though it reuses the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WindowId(pub u64);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Other
        }
    }
}

/// Per-window bookkeeping, discarded with the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSlot {
    pub id: WindowId,
    pub handshake: HandshakeState,
    pub shown: bool,
    /// Close was requested; shortcuts are already detached.
    pub closing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    NoWindow,
    WindowOpen(WindowSlot),
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// App finished launching and the window state is loaded.
    Ready,
    /// Content process signalled `content-ready`.
    ContentReady,
    /// Webview finished its first page load.
    ReadyToShow,
    /// User asked to close the window; it is destroyed right after.
    CloseRequested(WindowId),
    WindowDestroyed(WindowId),
    AllWindowsClosed,
    BeforeQuit,
    Activate { has_visible_windows: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateWindow { id: WindowId, auto_login: bool },
    ShowWindow(WindowId),
    SendAutoLogin(WindowId),
    AttachShortcuts(WindowId),
    DetachShortcuts(WindowId),
    StartUpdateCheck,
    Quit,
}

#[derive(Debug)]
pub struct Lifecycle {
    platform: Platform,
    phase: Phase,
    next_id: u64,
}

impl Lifecycle {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            phase: Phase::NoWindow,
            next_id: 1,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Id of the live window, if any.
    pub fn window(&self) -> Option<WindowId> {
        match &self.phase {
            Phase::WindowOpen(slot) => Some(slot.id),
            _ => None,
        }
    }

    pub fn is_quitting(&self) -> bool {
        self.phase == Phase::Quitting
    }

    /// Apply `event` and return the actions to run.
    pub fn handle(&mut self, event: LifecycleEvent) -> Vec<Action> {
        let actions = match event {
            _ if self.is_quitting() => Vec::new(),

            LifecycleEvent::Ready => self.open_if_idle(),

            LifecycleEvent::Activate { has_visible_windows } => {
                if has_visible_windows {
                    Vec::new()
                } else {
                    self.open_if_idle()
                }
            },

            LifecycleEvent::ContentReady => match &mut self.phase {
                Phase::WindowOpen(slot) => {
                    if slot.handshake.on_content_ready() {
                        vec![Action::SendAutoLogin(slot.id)]
                    } else {
                        Vec::new()
                    }
                },
                _ => Vec::new(),
            },

            LifecycleEvent::ReadyToShow => match &mut self.phase {
                Phase::WindowOpen(slot) if !slot.shown && !slot.closing => {
                    slot.shown = true;
                    vec![
                        Action::ShowWindow(slot.id),
                        Action::AttachShortcuts(slot.id),
                        Action::StartUpdateCheck,
                    ]
                },
                _ => Vec::new(),
            },

            LifecycleEvent::CloseRequested(id) => match &mut self.phase {
                Phase::WindowOpen(slot) if slot.id == id && !slot.closing => {
                    slot.closing = true;
                    vec![Action::DetachShortcuts(id)]
                },
                _ => Vec::new(),
            },

            LifecycleEvent::WindowDestroyed(id) => {
                let closing = match &self.phase {
                    Phase::WindowOpen(slot) if slot.id == id => Some(slot.closing),
                    _ => None,
                };
                match closing {
                    Some(closing) => {
                        self.phase = Phase::NoWindow;
                        if closing {
                            Vec::new()
                        } else {
                            vec![Action::DetachShortcuts(id)]
                        }
                    },
                    None => Vec::new(),
                }
            },

            LifecycleEvent::BeforeQuit => {
                let live = self.attached_window();
                self.phase = Phase::Quitting;
                live.map(Action::DetachShortcuts).into_iter().collect()
            },

            LifecycleEvent::AllWindowsClosed => match self.platform {
                Platform::MacOs => Vec::new(),
                Platform::Other => {
                    let mut actions: Vec<Action> = self
                        .attached_window()
                        .map(Action::DetachShortcuts)
                        .into_iter()
                        .collect();
                    self.phase = Phase::Quitting;
                    actions.push(Action::Quit);
                    actions
                },
            },
        };

        if !actions.is_empty() {
            log::debug!("[LIFECYCLE] {:?} -> {:?}", event, actions);
        }
        actions
    }

    /// Live window whose shortcuts have not been detached yet.
    fn attached_window(&self) -> Option<WindowId> {
        match &self.phase {
            Phase::WindowOpen(slot) if !slot.closing => Some(slot.id),
            _ => None,
        }
    }

    fn open_if_idle(&mut self) -> Vec<Action> {
        if self.phase == Phase::NoWindow {
            vec![self.open_window(true)]
        } else {
            Vec::new()
        }
    }

    fn open_window(&mut self, auto_login: bool) -> Action {
        let id = WindowId(self.next_id);
        self.next_id += 1;
        self.phase = Phase::WindowOpen(WindowSlot {
            id,
            handshake: HandshakeState::new(auto_login),
            shown: false,
            closing: false,
        });
        Action::CreateWindow { id, auto_login }
    }
}

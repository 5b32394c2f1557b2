//! Key bindings scoped to the main window.
//!
//! OS-level shortcuts are global, so scoping is done here: bindings belong
//! to one window and are only registered with the OS while that window has
//! focus. Everything is unregistered together when the window goes away or
//! the app quits.

#[cfg(desktop)]
pub mod backend;

use std::collections::HashMap;

use crate::app::lifecycle::WindowId;
use crate::config::ConfigStore;
use crate::error::LeptonResult;

/// Config keys for the scoped bindings and the event each one emits.
pub const SCOPED_BINDINGS: &[(&str, &str)] = &[
    ("shortcuts:keyUp", "key-up"),
    ("shortcuts:keyDown", "key-down"),
    ("shortcuts:keyEnter", "key-enter"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutBinding {
    pub accelerator: String,
    pub event: &'static str,
}

impl ShortcutBinding {
    pub fn new(accelerator: impl Into<String>, event: &'static str) -> Self {
        Self {
            accelerator: accelerator.into(),
            event,
        }
    }
}

/// Scoped bindings as configured. Empty accelerators disable a binding.
pub fn bindings_from_config(config: &ConfigStore) -> Vec<ShortcutBinding> {
    SCOPED_BINDINGS
        .iter()
        .filter_map(|(key, event)| {
            let accelerator = config.get_str_or_default(key)?.trim();
            if accelerator.is_empty() {
                return None;
            }
            Some(ShortcutBinding::new(accelerator, event))
        })
        .collect()
}

/// OS registration seam.
pub trait ShortcutBackend: Send {
    /// Register `accelerator`, returning the id reported when it fires.
    fn register(&mut self, accelerator: &str) -> LeptonResult<u32>;
    fn unregister(&mut self, accelerator: &str) -> LeptonResult<()>;
}

/// Backend for platforms without global shortcuts.
pub struct NoopBackend;

impl ShortcutBackend for NoopBackend {
    fn register(&mut self, accelerator: &str) -> LeptonResult<u32> {
        Err(crate::error::LeptonError::ShortcutRegistration {
            accelerator: accelerator.to_string(),
            reason: "global shortcuts are not supported on this platform".to_string(),
        })
    }

    fn unregister(&mut self, _accelerator: &str) -> LeptonResult<()> {
        Ok(())
    }
}

pub struct ShortcutScope {
    backend: Box<dyn ShortcutBackend>,
    window: Option<WindowId>,
    bindings: Vec<ShortcutBinding>,
    focused: bool,
    /// OS id -> index into `bindings`, for the currently registered ones.
    registered: HashMap<u32, usize>,
}

impl ShortcutScope {
    pub fn new(backend: Box<dyn ShortcutBackend>) -> Self {
        Self {
            backend,
            window: None,
            bindings: Vec::new(),
            focused: false,
            registered: HashMap::new(),
        }
    }

    /// Bind `bindings` to `window`, replacing whatever was attached before.
    pub fn attach(&mut self, window: WindowId, bindings: Vec<ShortcutBinding>, focused: bool) {
        if self.window.is_some() {
            self.detach_all(self.window);
        }

        log::info!(
            "[SHORTCUTS] Attaching {} binding(s) to {}",
            bindings.len(),
            window
        );
        self.window = Some(window);
        self.bindings = bindings;
        self.focused = false;
        self.set_focus(window, focused);
    }

    /// Follow focus changes of `window`: register on focus, unregister on blur.
    pub fn set_focus(&mut self, window: WindowId, focused: bool) {
        if self.window != Some(window) || self.focused == focused {
            return;
        }
        self.focused = focused;
        if focused {
            self.register_all();
        } else {
            self.unregister_all();
        }
    }

    /// Remove every binding of `window`. Safe to call repeatedly, with no
    /// window, or with a window that never had bindings.
    pub fn detach_all(&mut self, window: Option<WindowId>) {
        let Some(window) = window else {
            return;
        };
        if self.window != Some(window) {
            return;
        }

        self.unregister_all();
        log::info!(
            "[SHORTCUTS] Detached {} binding(s) from {}",
            self.bindings.len(),
            window
        );
        self.bindings.clear();
        self.window = None;
        self.focused = false;
    }

    /// Event to emit for a fired OS shortcut, if it is one of ours and the
    /// window currently has focus.
    pub fn event_for(&self, shortcut_id: u32) -> Option<(WindowId, &'static str)> {
        if !self.focused {
            return None;
        }
        let window = self.window?;
        let index = self.registered.get(&shortcut_id)?;
        self.bindings.get(*index).map(|b| (window, b.event))
    }

    pub fn window(&self) -> Option<WindowId> {
        self.window
    }

    /// Bindings attached to `window`, registered or not.
    pub fn binding_count(&self, window: WindowId) -> usize {
        if self.window == Some(window) {
            self.bindings.len()
        } else {
            0
        }
    }

    /// Bindings currently registered with the OS.
    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    fn register_all(&mut self) {
        for (index, binding) in self.bindings.iter().enumerate() {
            match self.backend.register(&binding.accelerator) {
                Ok(id) => {
                    self.registered.insert(id, index);
                },
                Err(err) => {
                    log::warn!(
                        "[SHORTCUTS] Could not register {} for {}: {}",
                        binding.accelerator,
                        binding.event,
                        err
                    );
                },
            }
        }
    }

    fn unregister_all(&mut self) {
        for (_, index) in self.registered.drain() {
            let Some(binding) = self.bindings.get(index) else {
                continue;
            };
            if let Err(err) = self.backend.unregister(&binding.accelerator) {
                log::warn!(
                    "[SHORTCUTS] Could not unregister {}: {}",
                    binding.accelerator,
                    err
                );
            }
        }
    }
}

//! OS registration through `tauri-plugin-global-shortcut`.

use tauri::{AppHandle, Emitter, Manager, Runtime};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutEvent, ShortcutState};

use super::ShortcutBackend;
use crate::app::context::AppContext;
use crate::error::{LeptonError, LeptonResult};
use crate::window::MAIN_WINDOW_LABEL;

pub struct GlobalShortcutBackend<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> GlobalShortcutBackend<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

fn parse(accelerator: &str) -> LeptonResult<Shortcut> {
    accelerator
        .parse::<Shortcut>()
        .map_err(|e| LeptonError::ShortcutRegistration {
            accelerator: accelerator.to_string(),
            reason: e.to_string(),
        })
}

impl<R: Runtime> ShortcutBackend for GlobalShortcutBackend<R> {
    fn register(&mut self, accelerator: &str) -> LeptonResult<u32> {
        let shortcut = parse(accelerator)?;
        let id = shortcut.id();
        self.app
            .global_shortcut()
            .register(shortcut)
            .map_err(|e| LeptonError::ShortcutRegistration {
                accelerator: accelerator.to_string(),
                reason: e.to_string(),
            })?;
        Ok(id)
    }

    fn unregister(&mut self, accelerator: &str) -> LeptonResult<()> {
        let shortcut = parse(accelerator)?;
        self.app
            .global_shortcut()
            .unregister(shortcut)
            .map_err(|e| LeptonError::ShortcutRegistration {
                accelerator: accelerator.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Handler installed on the global-shortcut plugin.
///
/// Forwards a pressed binding to the main window, but only while that
/// window is the focused one.
pub fn handle_shortcut<R: Runtime>(app: &AppHandle<R>, shortcut: &Shortcut, event: ShortcutEvent) {
    if event.state != ShortcutState::Pressed {
        return;
    }

    let Some(ctx) = app.try_state::<AppContext>() else {
        return;
    };
    let Some((window_id, signal)) = ctx.shortcuts.lock().event_for(shortcut.id()) else {
        return;
    };
    let Some(window) = crate::window::main_window(app) else {
        return;
    };
    if !window.is_focused().unwrap_or(false) {
        return;
    }

    log::debug!("[SHORTCUTS] {} -> {} on {}", shortcut.id(), signal, window_id);
    if let Err(e) = app.emit_to(MAIN_WINDOW_LABEL, signal, ()) {
        log::warn!("[SHORTCUTS] Failed to emit {}: {}", signal, e);
    }
}

//! Process-wide application state.
//!
//! One `AppContext` is created during setup and handed to Tauri's state
//! manager. Every event handler and command reaches the config store, the
//! window state and the state machines through it.

use std::sync::Arc;

use parking_lot::Mutex;

use super::lifecycle::{Lifecycle, Platform};
use super::paths::AppPaths;
use crate::config::ConfigStore;
use crate::shortcuts::{ShortcutBackend, ShortcutScope};
use crate::updater::{UpdateChecker, UpdatePolicy};
use crate::window::geometry::WindowGeometry;
use crate::window::navigation::NavigationPolicy;
use crate::window::state::PersistentWindowState;
use crate::window::window_options;

pub struct AppContext {
    pub config: Arc<ConfigStore>,
    pub paths: AppPaths,
    pub navigation: NavigationPolicy,
    pub lifecycle: Mutex<Lifecycle>,
    pub window_state: Mutex<PersistentWindowState>,
    pub shortcuts: Mutex<ShortcutScope>,
    pub updater: Mutex<UpdateChecker>,
    /// Handle for the update found by the last check, consumed by download.
    pub pending_update: Mutex<Option<tauri_plugin_updater::Update>>,
}

impl AppContext {
    pub fn new(
        config: Arc<ConfigStore>,
        paths: AppPaths,
        version: &str,
        navigation: NavigationPolicy,
        shortcut_backend: Box<dyn ShortcutBackend>,
    ) -> Self {
        let options = window_options(&config);
        let auto_update = config.get_bool_or_default("autoUpdate").unwrap_or(true);

        Self {
            window_state: Mutex::new(PersistentWindowState::new(
                paths.window_state_file.clone(),
                options,
                None,
            )),
            lifecycle: Mutex::new(Lifecycle::new(Platform::current())),
            shortcuts: Mutex::new(ShortcutScope::new(shortcut_backend)),
            updater: Mutex::new(UpdateChecker::new(UpdatePolicy::detect(version, auto_update))),
            pending_update: Mutex::new(None),
            navigation,
            config,
            paths,
        }
    }

    /// Replace the window state with one built from the persisted geometry.
    pub fn install_window_state(&self, persisted: Option<WindowGeometry>) {
        let options = window_options(&self.config);
        *self.window_state.lock() = PersistentWindowState::new(
            self.paths.window_state_file.clone(),
            options,
            persisted,
        );
    }
}

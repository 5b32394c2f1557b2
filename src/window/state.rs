//! Persisted window geometry.
//!
//! Geometry is kept in memory while the window lives, updated from window
//! events, and written to `window-state.json` when the window closes. On the
//! next launch the stored geometry is restored unless it would put the window
//! somewhere no connected display can show it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::app::lifecycle::WindowId;
use crate::error::{LeptonError, LeptonResult};

use super::geometry::{center_on, is_on_screen, DisplayBounds, WindowGeometry};

/// File name of the persisted state inside the app data directory.
pub const STATE_FILE_NAME: &str = "window-state.json";

/// Size constraints applied when restoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStateOptions {
    pub default_width: u32,
    pub default_height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

impl WindowStateOptions {
    fn defaults(&self) -> WindowGeometry {
        WindowGeometry::sized(self.default_width, self.default_height)
            .clamp_size(self.min_width, self.min_height)
    }
}

/// Geometry changes reported by the live window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryEvent {
    Moved { x: i32, y: i32 },
    Resized { width: u32, height: u32 },
    Maximized,
    Unmaximized,
    EnterFullScreen,
    LeaveFullScreen,
    Closed,
}

pub struct PersistentWindowState {
    path: PathBuf,
    options: WindowStateOptions,
    geometry: WindowGeometry,
    /// Whether `geometry` came from a previous session.
    restored: bool,
    managed: Option<WindowId>,
    dirty: bool,
}

impl PersistentWindowState {
    /// Read the persisted geometry, if any.
    ///
    /// A missing file is `Ok(None)`; an unreadable or malformed one is a
    /// `StateIo` error the caller logs before falling back to defaults.
    pub fn read(path: &Path) -> LeptonResult<Option<WindowGeometry>> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(LeptonError::StateIo {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            },
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| LeptonError::StateIo {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    /// Build the state from an already-read persisted geometry.
    pub fn new(
        path: impl Into<PathBuf>,
        options: WindowStateOptions,
        persisted: Option<WindowGeometry>,
    ) -> Self {
        let (geometry, restored) = match persisted {
            Some(geometry) => (geometry.clamp_size(options.min_width, options.min_height), true),
            None => (options.defaults(), false),
        };
        Self {
            path: path.into(),
            options,
            geometry,
            restored,
            managed: None,
            dirty: false,
        }
    }

    /// Read `path` and build the state; read failures fall back to defaults.
    pub fn load(
        path: impl Into<PathBuf>,
        options: WindowStateOptions,
        displays: &[DisplayBounds],
    ) -> (Self, WindowGeometry) {
        let path = path.into();
        let persisted = match Self::read(&path) {
            Ok(persisted) => persisted,
            Err(err) => {
                log::warn!("[WINDOW_STATE] {}; using defaults", err);
                None
            },
        };
        let mut state = Self::new(path, options, persisted);
        let geometry = state.restore(displays);
        (state, geometry)
    }

    /// Geometry to open the next window with.
    ///
    /// First run gets the defaults centered on the preferred display. Later
    /// runs get the stored geometry, unless no display in `displays` can
    /// show it, in which case the defaults are used again.
    pub fn restore(&mut self, displays: &[DisplayBounds]) -> WindowGeometry {
        if !self.restored {
            self.geometry = center_on(self.options.defaults(), displays);
            return self.geometry;
        }

        if !is_on_screen(&self.geometry, displays) {
            log::info!(
                "[WINDOW_STATE] Stored position {:?},{:?} is off-screen; using defaults",
                self.geometry.x,
                self.geometry.y
            );
            self.geometry = center_on(self.options.defaults(), displays);
            self.restored = false;
            self.dirty = true;
        }

        self.geometry
    }

    pub fn geometry(&self) -> WindowGeometry {
        self.geometry
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Start tracking `window`. Returns false if it is already tracked, so
    /// listeners are never attached twice for one window instance.
    pub fn manage(&mut self, window: WindowId) -> bool {
        if self.managed == Some(window) {
            return false;
        }
        self.managed = Some(window);
        true
    }

    /// Stop tracking `window` once it is destroyed.
    pub fn release(&mut self, window: WindowId) {
        if self.managed == Some(window) {
            self.managed = None;
        }
    }

    pub fn managed(&self) -> Option<WindowId> {
        self.managed
    }

    /// Apply a window event. Returns true when the caller should flush.
    ///
    /// Events from windows this state does not manage are ignored. Normal
    /// bounds are left alone while maximized or full-screen so un-maximizing
    /// goes back to the previous size.
    pub fn handle_event(&mut self, window: WindowId, event: GeometryEvent) -> bool {
        if self.managed != Some(window) {
            return false;
        }

        let normal = !self.geometry.is_maximized && !self.geometry.is_full_screen;
        match event {
            GeometryEvent::Moved { x, y } if normal => {
                self.geometry.x = Some(x);
                self.geometry.y = Some(y);
            },
            GeometryEvent::Resized { width, height } if normal => {
                self.geometry.width = width.max(self.options.min_width);
                self.geometry.height = height.max(self.options.min_height);
            },
            GeometryEvent::Moved { .. } | GeometryEvent::Resized { .. } => return false,
            GeometryEvent::Maximized => self.geometry.is_maximized = true,
            GeometryEvent::Unmaximized => self.geometry.is_maximized = false,
            GeometryEvent::EnterFullScreen => self.geometry.is_full_screen = true,
            GeometryEvent::LeaveFullScreen => self.geometry.is_full_screen = false,
            GeometryEvent::Closed => {
                self.dirty = true;
                return true;
            },
        }

        self.restored = true;
        self.dirty = true;
        false
    }

    /// Write the current geometry to disk.
    pub fn save(&mut self) -> LeptonResult<()> {
        write_geometry(&self.path, &self.geometry)?;
        self.dirty = false;
        Ok(())
    }

    /// Write only if something changed since the last successful save.
    ///
    /// `dirty` stays set until the write lands, so a save that has not run
    /// yet is still picked up by the next caller. Returns true if it wrote.
    pub fn save_if_dirty(&mut self) -> LeptonResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }
}

/// Write `geometry` to `path` via a temp file and rename.
pub fn write_geometry(path: &Path, geometry: &WindowGeometry) -> LeptonResult<()> {
    let to_state_err = |e: &dyn std::fmt::Display| LeptonError::StateIo {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| to_state_err(&e))?;
    }

    let json = serde_json::to_string_pretty(geometry).map_err(|e| to_state_err(&e))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| to_state_err(&e))?;
    fs::rename(&tmp, path).map_err(|e| to_state_err(&e))?;
    Ok(())
}

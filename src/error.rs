//! Central error types for Lepton.
//!
//! Every error in the lifecycle core is caught where it happens, logged, and
//! replaced by a fallback. The variants below name where a failure came from
//! so the log line tells the reader which fallback kicked in.
//! All errors implement `Serialize` for Tauri IPC compatibility.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Main error type for Lepton operations.
#[derive(Error, Debug)]
pub enum LeptonError {
    /// A configuration source (user file) could not be read or parsed.
    #[error("Config source {} is invalid: {reason}", path.display())]
    ConfigSource { path: PathBuf, reason: String },

    /// Persisted window geometry could not be read or written.
    #[error("Window state I/O failed for {}: {reason}", path.display())]
    StateIo { path: PathBuf, reason: String },

    /// Remote update check or download failed.
    #[error("Update check failed: {0}")]
    UpdateCheck(String),

    /// OS refused a key binding (usually already taken by another app).
    #[error("Failed to register shortcut {accelerator}: {reason}")]
    ShortcutRegistration { accelerator: String, reason: String },

    /// Window management error
    #[error("Window error: {0}")]
    WindowError(String),

    /// Logger could not be set up
    #[error("Logging error: {0}")]
    Logging(String),
}

/// Tauri requires errors to be serializable to send to the frontend.
impl Serialize for LeptonError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<tauri::Error> for LeptonError {
    fn from(err: tauri::Error) -> Self {
        LeptonError::WindowError(err.to_string())
    }
}

/// Type alias for Results using LeptonError.
pub type LeptonResult<T> = Result<T, LeptonError>;

//! Built-in configuration defaults.
//!
//! This is the lowest-priority layer. Every key path reachable here resolves
//! to a value no matter what the other layers contain.

use serde_json::{json, Value};

/// Default window width in logical pixels (first launch).
pub const DEFAULT_WINDOW_WIDTH: u32 = 1100;

/// Default window height in logical pixels (first launch).
pub const DEFAULT_WINDOW_HEIGHT: u32 = 800;

/// Minimum window width in logical pixels.
pub const MIN_WINDOW_WIDTH: u32 = 1000;

/// Minimum window height in logical pixels.
pub const MIN_WINDOW_HEIGHT: u32 = 700;

/// Build the defaults tree.
pub fn default_config() -> Value {
    json!({
        "theme": "light",
        "autoUpdate": true,
        "logger": {
            "level": "info"
        },
        "window": {
            "defaultWidth": DEFAULT_WINDOW_WIDTH,
            "defaultHeight": DEFAULT_WINDOW_HEIGHT,
            "minWidth": MIN_WINDOW_WIDTH,
            "minHeight": MIN_WINDOW_HEIGHT,
            "backgroundColor": "#808080"
        },
        "shortcuts": {
            "newGist": "CommandOrControl+N",
            "editGist": "CommandOrControl+E",
            "searchGist": "Shift+Space",
            "immersiveMode": "CommandOrControl+I",
            "backToNormalMode": "Escape",
            "aboutPage": "CommandOrControl+,",
            "keyUp": "Shift+Up",
            "keyDown": "Shift+Down",
            "keyEnter": "Shift+Enter"
        },
        "snippet": {
            "expanded": true,
            "newSnippetPrivate": false,
            "sorting": "updated_at",
            "sortingReverse": true
        },
        "editor": {
            "lineNumbers": true,
            "tabSize": 2
        },
        "proxy": {
            "enable": false,
            "address": "socks://localhost:1080"
        },
        "enterprise": {
            "enable": false,
            "host": "",
            "token": ""
        }
    })
}

//! Read access to the resolved configuration for the webview.

use serde_json::Value;
use tauri::{command, State};

use crate::app::AppContext;

/// Value at a `:`-separated key path, `null` when no source knows the key.
#[command]
pub fn config_get(ctx: State<'_, AppContext>, key: String) -> Option<Value> {
    ctx.config.get(&key).cloned()
}

/// The whole merged configuration tree.
#[command]
pub fn config_snapshot(ctx: State<'_, AppContext>) -> Value {
    ctx.config.snapshot().clone()
}

//! Update commands. Downloads only happen through these, on user request.

use tauri::{command, AppHandle, State};

use crate::app::AppContext;
use crate::error::LeptonError;
use crate::updater::{remote, UpdateInfo, UpdateState};

/// Info of the available update, if the last check found one.
#[command]
pub fn update_info(ctx: State<'_, AppContext>) -> Option<UpdateInfo> {
    ctx.updater.lock().available().cloned()
}

#[command]
pub fn update_status(ctx: State<'_, AppContext>) -> UpdateState {
    ctx.updater.lock().state().clone()
}

#[command]
pub async fn download_update(app: AppHandle) -> Result<UpdateInfo, LeptonError> {
    remote::download(&app).await
}

/// Relaunch into the downloaded update.
#[command]
pub fn restart_to_update(app: AppHandle, ctx: State<'_, AppContext>) -> Result<(), LeptonError> {
    if !ctx.updater.lock().is_downloaded() {
        return Err(LeptonError::UpdateCheck(
            "no downloaded update to install".to_string(),
        ));
    }
    log::info!("[UPDATER] Restarting to apply update");
    app.restart()
}

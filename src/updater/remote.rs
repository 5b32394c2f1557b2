//! `tauri-plugin-updater` glue for [`UpdateChecker`](super::UpdateChecker).

use tauri::{AppHandle, Emitter, Manager, Runtime};
use tauri_plugin_updater::{Update, UpdaterExt};

use super::{signing_key, CheckSkip, UpdateInfo, UpdateState};
use crate::app::context::AppContext;
use crate::app::signals;
use crate::error::{LeptonError, LeptonResult};
use crate::window::MAIN_WINDOW_LABEL;

fn info_from(update: &Update) -> UpdateInfo {
    UpdateInfo {
        version: update.version.clone(),
        current_version: update.current_version.clone(),
        notes: update.body.clone(),
        date: update.date.map(|date| date.to_string()),
    }
}

async fn fetch<R: Runtime>(app: &AppHandle<R>) -> LeptonResult<Option<Update>> {
    let updater = app
        .updater()
        .map_err(|e| LeptonError::UpdateCheck(e.to_string()))?;
    updater
        .check()
        .await
        .map_err(|e| LeptonError::UpdateCheck(e.to_string()))
}

/// Start a background check unless the policy or current state forbids it.
///
/// Returns immediately; the outcome arrives later as a state change and,
/// when an update exists, an `update-available` event to the main window.
pub fn start_check<R: Runtime>(app: &AppHandle<R>) {
    let ctx = app.state::<AppContext>();
    if let Err(skip) = ctx.updater.lock().begin_check() {
        match skip {
            CheckSkip::AlreadyInProgress | CheckSkip::Downloading => {
                log::debug!("[UPDATER] Not checking: {}", skip)
            },
            _ => log::info!("[UPDATER] Skipping update check: {}", skip),
        }
        return;
    }

    log::info!("[UPDATER] Checking for updates");
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        let fetched = fetch(&app).await;
        let ctx = app.state::<AppContext>();

        let result = match fetched {
            Ok(Some(update)) => {
                let info = info_from(&update);
                *ctx.pending_update.lock() = Some(update);
                Ok(Some(info))
            },
            Ok(None) => {
                *ctx.pending_update.lock() = None;
                Ok(None)
            },
            Err(err) => Err(err),
        };

        let available = matches!(
            ctx.updater.lock().finish_check(result),
            Some(UpdateState::Available(_))
        );
        if available {
            if let Err(e) = app.emit_to(MAIN_WINDOW_LABEL, signals::UPDATE_AVAILABLE, ()) {
                log::warn!("[UPDATER] Failed to notify window: {}", e);
            }
        }
    });
}

/// Download and install the available update. Only ever called on an
/// explicit user request.
pub async fn download<R: Runtime>(app: &AppHandle<R>) -> LeptonResult<UpdateInfo> {
    if signing_key(app.config().plugins.0.get("updater")).is_none() {
        log::warn!("[UPDATER] No updater public key configured; refusing to install");
        return Err(LeptonError::UpdateCheck(
            "this build has no update signing key (plugins.updater.pubkey)".to_string(),
        ));
    }

    let ctx = app.state::<AppContext>();
    let info = ctx.updater.lock().begin_download()?;

    let Some(update) = ctx.pending_update.lock().take() else {
        let reason = "update handle is no longer available".to_string();
        ctx.updater
            .lock()
            .finish_download(Err(LeptonError::UpdateCheck(reason.clone())));
        return Err(LeptonError::UpdateCheck(reason));
    };

    log::info!("[UPDATER] Downloading {}", info.version);
    let mut downloaded: u64 = 0;
    let result = update
        .download_and_install(
            |chunk_length, content_length| {
                downloaded = downloaded.saturating_add(chunk_length as u64);
                log::trace!("[UPDATER] {} / {:?} bytes", downloaded, content_length);
            },
            || log::info!("[UPDATER] Download finished"),
        )
        .await
        .map_err(|e| LeptonError::UpdateCheck(e.to_string()));

    let failure = result.as_ref().err().map(|e| e.to_string());
    ctx.updater.lock().finish_download(result);

    if let Some(reason) = failure {
        return Err(LeptonError::UpdateCheck(reason));
    }

    if let Err(e) = app.emit_to(MAIN_WINDOW_LABEL, signals::UPDATE_DOWNLOADED, &info) {
        log::warn!("[UPDATER] Failed to notify window: {}", e);
    }
    Ok(info)
}

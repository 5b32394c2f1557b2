//! Routing of Tauri window and run-loop events.
//!
//! Raw events are translated into [`LifecycleEvent`]s for the state machine
//! or into geometry updates for the window state. The actions the state
//! machine returns are executed here.

use tauri::{AppHandle, Emitter, Listener, Manager, RunEvent, Runtime, Window, WindowEvent};

use super::context::AppContext;
use super::lifecycle::{Action, LifecycleEvent};
use super::signals;
use crate::shortcuts::bindings_from_config;
use crate::window::state::PersistentWindowState;
use crate::window::{self, MAIN_WINDOW_LABEL};

/// Kick off startup once the context is managed.
///
/// The state file is read on a blocking worker; `Ready` is dispatched on
/// the main thread afterwards so the first window always opens with the
/// restored geometry.
pub fn begin_startup<R: Runtime>(app: &AppHandle<R>) {
    let listener_app = app.clone();
    log::debug!("[LIFECYCLE] Registering {} listener", signals::CONTENT_READY);
    app.listen_any(signals::CONTENT_READY, move |_| {
        dispatch(&listener_app, LifecycleEvent::ContentReady);
    });

    let path = app.state::<AppContext>().paths.window_state_file.clone();
    let handle = app.clone();
    tauri::async_runtime::spawn_blocking(move || {
        let persisted = match PersistentWindowState::read(&path) {
            Ok(persisted) => persisted,
            Err(err) => {
                log::warn!("[WINDOW_STATE] {}; using defaults", err);
                None
            },
        };

        let main = handle.clone();
        let scheduled = handle.run_on_main_thread(move || {
            if let Some(ctx) = main.try_state::<AppContext>() {
                ctx.install_window_state(persisted);
            }
            dispatch(&main, LifecycleEvent::Ready);
        });
        if let Err(e) = scheduled {
            log::error!("[LIFECYCLE] Could not schedule startup: {}", e);
        }
    });
}

/// Feed `event` to the state machine and run the resulting actions.
pub fn dispatch<R: Runtime>(app: &AppHandle<R>, event: LifecycleEvent) {
    let Some(ctx) = app.try_state::<AppContext>() else {
        return;
    };
    let actions = ctx.lifecycle.lock().handle(event);
    for action in actions {
        execute(app, &ctx, action);
    }
}

fn execute<R: Runtime>(app: &AppHandle<R>, ctx: &AppContext, action: Action) {
    match action {
        Action::CreateWindow { id, auto_login } => {
            log::info!("[LIFECYCLE] Creating {} (auto-login: {})", id, auto_login);
            if let Err(err) = window::create_main_window(app, id) {
                log::error!("[LIFECYCLE] Failed to create main window: {}", err);
                ctx.window_state.lock().release(id);
                dispatch(app, LifecycleEvent::WindowDestroyed(id));
            }
        },
        Action::ShowWindow(id) => {
            let Some(main) = window::main_window(app) else {
                return;
            };
            log::info!("[LIFECYCLE] Showing {}", id);
            if let Err(e) = main.show() {
                log::warn!("[LIFECYCLE] Failed to show window: {}", e);
            }
            let _ = main.set_focus();
        },
        Action::SendAutoLogin(id) => {
            log::info!("[LIFECYCLE] Sending {} signal to {}", signals::AUTO_LOGIN, id);
            if let Err(e) = app.emit_to(MAIN_WINDOW_LABEL, signals::AUTO_LOGIN, ()) {
                log::warn!("[LIFECYCLE] Failed to send {}: {}", signals::AUTO_LOGIN, e);
            }
        },
        Action::AttachShortcuts(id) => {
            let focused = window::main_window(app)
                .and_then(|w| w.is_focused().ok())
                .unwrap_or(false);
            let bindings = bindings_from_config(&ctx.config);
            ctx.shortcuts.lock().attach(id, bindings, focused);
        },
        Action::DetachShortcuts(id) => ctx.shortcuts.lock().detach_all(Some(id)),
        Action::StartUpdateCheck => crate::updater::remote::start_check(app),
        Action::Quit => app.exit(0),
    }
}

/// Write pending geometry on a blocking worker.
///
/// The worker holds the state lock while writing, so the exit-time save in
/// [`handle_run_event`] either waits for it or does the write itself.
fn flush_in_background<R: Runtime>(app: &AppHandle<R>) {
    let handle = app.clone();
    tauri::async_runtime::spawn_blocking(move || {
        let Some(ctx) = handle.try_state::<AppContext>() else {
            return;
        };
        save_pending(&ctx);
    });
}

fn save_pending(ctx: &AppContext) {
    let mut state = ctx.window_state.lock();
    match state.save_if_dirty() {
        Ok(true) => log::debug!("[WINDOW_STATE] Saved {:?}", state.geometry()),
        Ok(false) => {},
        Err(err) => log::warn!("[WINDOW_STATE] {}", err),
    }
}

/// `on_window_event` hook for the builder.
pub fn handle_window_event<R: Runtime>(window: &Window<R>, event: &WindowEvent) {
    if window.label() != MAIN_WINDOW_LABEL {
        return;
    }
    let Some(ctx) = window.try_state::<AppContext>() else {
        return;
    };
    let Some(id) = ctx.lifecycle.lock().window() else {
        return;
    };

    match event {
        WindowEvent::Focused(focused) => ctx.shortcuts.lock().set_focus(id, *focused),

        WindowEvent::Destroyed => {
            ctx.window_state.lock().release(id);
            dispatch(window.app_handle(), LifecycleEvent::WindowDestroyed(id));
        },

        _ => {
            if matches!(event, WindowEvent::CloseRequested { .. }) {
                dispatch(window.app_handle(), LifecycleEvent::CloseRequested(id));
            }
            let updates = window::track_geometry(window, id, event);
            let mut flush = false;
            {
                let mut state = ctx.window_state.lock();
                for update in updates {
                    flush |= state.handle_event(id, update);
                }
            }
            if flush {
                flush_in_background(window.app_handle());
            }
        },
    }
}

/// Run-loop callback.
pub fn handle_run_event<R: Runtime>(app: &AppHandle<R>, event: RunEvent) {
    match event {
        // Last window closed.
        RunEvent::ExitRequested { code: None, api, .. } => {
            log::info!("[LIFECYCLE] The app window is closed");
            let Some(ctx) = app.try_state::<AppContext>() else {
                return;
            };
            let actions = ctx.lifecycle.lock().handle(LifecycleEvent::AllWindowsClosed);
            if !actions.contains(&Action::Quit) {
                api.prevent_exit();
            }
            for action in actions.into_iter().filter(|a| *a != Action::Quit) {
                execute(app, &ctx, action);
            }
        },

        // Explicit quit.
        RunEvent::ExitRequested { .. } => dispatch(app, LifecycleEvent::BeforeQuit),

        RunEvent::Exit => {
            let Some(ctx) = app.try_state::<AppContext>() else {
                return;
            };
            {
                let mut scope = ctx.shortcuts.lock();
                let live = scope.window();
                scope.detach_all(live);
            }
            save_pending(&ctx);
            log::info!("[LIFECYCLE] Exiting");
        },

        #[cfg(target_os = "macos")]
        RunEvent::Reopen {
            has_visible_windows,
            ..
        } => dispatch(
            app,
            LifecycleEvent::Activate {
                has_visible_windows,
            },
        ),

        _ => {},
    }
}

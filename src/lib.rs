use std::sync::Arc;

use tauri::Manager;

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod shortcuts;
pub mod updater;
pub mod window;

use app::{AppContext, AppPaths};
use config::ConfigResolver;
use shortcuts::ShortcutBackend;
use window::navigation::NavigationPolicy;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let paths = AppPaths::resolve();
    let config = Arc::new(ConfigResolver::from_process(&paths.config_file).resolve());

    if let Err(err) = commands::logging::init_logging(&paths.log_dir, config.log_level()) {
        eprintln!("Lepton: file logging unavailable: {}", err);
    }
    log::info!(
        "----- {} v{} -----",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    config.report();

    let mut builder = tauri::Builder::default().plugin(tauri_plugin_opener::init());

    #[cfg(desktop)]
    {
        builder = builder.plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(shortcuts::backend::handle_shortcut)
                .build(),
        );
        builder = builder.on_menu_event(app::menu::handle_menu_event);
    }

    builder
        .on_window_event(app::events::handle_window_event)
        .invoke_handler(tauri::generate_handler![
            // Logging commands
            commands::logging::write_log,
            commands::logging::get_log_dir,
            // Config commands
            commands::config::config_get,
            commands::config::config_snapshot,
            // Update commands
            commands::update::update_info,
            commands::update::update_status,
            commands::update::download_update,
            commands::update::restart_to_update,
        ])
        .setup(move |app| {
            #[cfg(desktop)]
            {
                if let Err(err) = app
                    .handle()
                    .plugin(tauri_plugin_updater::Builder::new().build())
                {
                    log::error!("[UPDATER] Failed to initialize updater: {}", err);
                }
            }

            let handle = app.handle().clone();

            #[cfg(desktop)]
            let backend: Box<dyn ShortcutBackend> =
                Box::new(shortcuts::backend::GlobalShortcutBackend::new(handle.clone()));
            #[cfg(not(desktop))]
            let backend: Box<dyn ShortcutBackend> = Box::new(shortcuts::NoopBackend);

            let navigation = NavigationPolicy::new(app.config().build.dev_url.as_ref());
            let version = app.package_info().version.to_string();
            app.manage(AppContext::new(
                config,
                paths,
                &version,
                navigation,
                backend,
            ));

            #[cfg(desktop)]
            {
                if let Err(err) = app::menu::install(&handle) {
                    log::warn!("[LIFECYCLE] Failed to install application menu: {}", err);
                }
            }

            app::events::begin_startup(&handle);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(app::events::handle_run_event);
}

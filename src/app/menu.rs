//! Application menu.
//!
//! The platform default menu plus a "Gist" submenu. Each Gist item forwards
//! a named event to the main window; the item id is the event name.

use tauri::{
    menu::{Menu, MenuEvent, MenuItem, Submenu},
    AppHandle, Emitter, Manager, Runtime,
};

use super::context::AppContext;
use super::signals;
use crate::window::MAIN_WINDOW_LABEL;

/// One entry of the Gist submenu.
pub struct MenuCommand {
    pub label: &'static str,
    /// Config key holding the accelerator.
    pub shortcut_key: &'static str,
    pub signal: &'static str,
}

pub const GIST_MENU: &[MenuCommand] = &[
    MenuCommand {
        label: "New Gist",
        shortcut_key: "shortcuts:newGist",
        signal: signals::NEW_GIST,
    },
    MenuCommand {
        label: "Edit Gist",
        shortcut_key: "shortcuts:editGist",
        signal: signals::EDIT_GIST,
    },
    MenuCommand {
        label: "Search Gist",
        shortcut_key: "shortcuts:searchGist",
        signal: signals::SEARCH_GIST,
    },
    MenuCommand {
        label: "Immersive Mode",
        shortcut_key: "shortcuts:immersiveMode",
        signal: signals::IMMERSIVE_MODE,
    },
    MenuCommand {
        label: "Back to Normal Mode",
        shortcut_key: "shortcuts:backToNormalMode",
        signal: signals::BACK_TO_NORMAL_MODE,
    },
    MenuCommand {
        label: "About",
        shortcut_key: "shortcuts:aboutPage",
        signal: signals::ABOUT_PAGE,
    },
];

/// Signal for a clicked menu id, if it is one of ours.
pub fn signal_for(menu_id: &str) -> Option<&'static str> {
    GIST_MENU
        .iter()
        .find(|command| command.signal == menu_id)
        .map(|command| command.signal)
}

fn gist_item<R: Runtime>(
    app: &AppHandle<R>,
    command: &MenuCommand,
    accelerator: Option<&str>,
) -> tauri::Result<MenuItem<R>> {
    match MenuItem::with_id(app, command.signal, command.label, true, accelerator) {
        Ok(item) => Ok(item),
        Err(e) if accelerator.is_some() => {
            log::warn!(
                "[LIFECYCLE] Invalid accelerator {:?} for {}: {}",
                accelerator,
                command.label,
                e
            );
            MenuItem::with_id(app, command.signal, command.label, true, None::<&str>)
        },
        Err(e) => Err(e),
    }
}

/// Build and install the application menu.
pub fn install<R: Runtime>(app: &AppHandle<R>) -> tauri::Result<()> {
    let ctx = app.state::<AppContext>();
    let menu = Menu::default(app)?;
    let gist = Submenu::new(app, "Gist", true)?;

    for command in GIST_MENU {
        let accelerator = ctx
            .config
            .get_str_or_default(command.shortcut_key)
            .map(str::trim)
            .filter(|a| !a.is_empty());
        gist.append(&gist_item(app, command, accelerator)?)?;
    }

    menu.append(&gist)?;
    app.set_menu(menu)?;
    Ok(())
}

/// Menu click handler: forward Gist items to the main window.
pub fn handle_menu_event<R: Runtime>(app: &AppHandle<R>, event: MenuEvent) {
    let Some(signal) = signal_for(event.id().as_ref()) else {
        return;
    };
    if crate::window::main_window(app).is_none() {
        return;
    }
    log::debug!("[LIFECYCLE] Menu -> {}", signal);
    if let Err(e) = app.emit_to(MAIN_WINDOW_LABEL, signal, ()) {
        log::warn!("[LIFECYCLE] Failed to emit {}: {}", signal, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigResolver;

    #[test]
    fn test_signal_lookup() {
        assert_eq!(signal_for("new-gist"), Some("new-gist"));
        assert_eq!(signal_for("about-page"), Some("about-page"));
        assert_eq!(signal_for("quit"), None);
    }

    #[test]
    fn test_every_item_has_a_default_accelerator() {
        let store = ConfigResolver::new().resolve();
        for command in GIST_MENU {
            let accelerator = store.get_str(command.shortcut_key);
            assert!(
                accelerator.is_some_and(|a| !a.is_empty()),
                "{} has no accelerator",
                command.label
            );
        }
        assert_eq!(store.get_str("shortcuts:backToNormalMode"), Some("Escape"));
    }
}

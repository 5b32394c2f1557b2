//! Main window construction and geometry tracking.

pub mod geometry;
pub mod navigation;
pub mod state;

use tauri::webview::PageLoadEvent;
use tauri::window::Color;
use tauri::{
    AppHandle, Manager, Monitor, Runtime, Url, WebviewUrl, WebviewWindow, WebviewWindowBuilder,
    Window,
};
use tauri_plugin_opener::OpenerExt;

use crate::app::context::AppContext;
use crate::app::lifecycle::{LifecycleEvent, WindowId};
use crate::config::defaults::{
    DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH,
};
use crate::config::ConfigStore;
use crate::error::LeptonResult;

use geometry::{DisplayBounds, WindowGeometry};
use navigation::NavigationDecision;
use state::{GeometryEvent, WindowStateOptions};

/// Label of the single top-level window.
pub const MAIN_WINDOW_LABEL: &str = "main";

const WINDOW_TITLE: &str = "Lepton";

pub fn main_window<R: Runtime>(app: &AppHandle<R>) -> Option<WebviewWindow<R>> {
    app.get_webview_window(MAIN_WINDOW_LABEL)
}

/// Size limits from `window:*`.
pub fn window_options(config: &ConfigStore) -> WindowStateOptions {
    WindowStateOptions {
        default_width: config
            .get_u32_or_default("window:defaultWidth")
            .unwrap_or(DEFAULT_WINDOW_WIDTH),
        default_height: config
            .get_u32_or_default("window:defaultHeight")
            .unwrap_or(DEFAULT_WINDOW_HEIGHT),
        min_width: config
            .get_u32_or_default("window:minWidth")
            .unwrap_or(MIN_WINDOW_WIDTH),
        min_height: config
            .get_u32_or_default("window:minHeight")
            .unwrap_or(MIN_WINDOW_HEIGHT),
    }
}

/// Parse `#rrggbb` or `#rrggbbaa`.
pub fn parse_color(hex: &str) -> Option<Color> {
    let digits = hex.trim().strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    match digits.len() {
        6 => Some(Color(channel(0)?, channel(2)?, channel(4)?, 255)),
        8 => Some(Color(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
        _ => None,
    }
}

fn to_display_bounds(monitor: &Monitor, primary: Option<&Monitor>) -> DisplayBounds {
    let scale = monitor.scale_factor();
    let position = monitor.position().to_logical::<i32>(scale);
    let size = monitor.size().to_logical::<u32>(scale);
    let is_primary = primary.is_some_and(|p| {
        p.position() == monitor.position() && p.size() == monitor.size()
    });
    DisplayBounds {
        x: position.x,
        y: position.y,
        width: size.width,
        height: size.height,
        is_primary,
    }
}

/// Connected displays in logical pixels. Empty when the OS will not say.
pub fn display_bounds<R: Runtime>(app: &AppHandle<R>) -> Vec<DisplayBounds> {
    let monitors = match app.available_monitors() {
        Ok(monitors) => monitors,
        Err(e) => {
            log::warn!("[WINDOW_STATE] Could not list monitors: {}", e);
            return Vec::new();
        },
    };
    let primary = app.primary_monitor().ok().flatten();
    monitors
        .iter()
        .map(|m| to_display_bounds(m, primary.as_ref()))
        .collect()
}

/// Create the hidden main window for instance `id`.
///
/// Geometry is restored before the window exists; the window is shown
/// later, once its page has loaded.
pub fn create_main_window<R: Runtime>(
    app: &AppHandle<R>,
    id: WindowId,
) -> LeptonResult<WebviewWindow<R>> {
    let ctx = app.state::<AppContext>();
    let displays = display_bounds(app);
    let options = window_options(&ctx.config);

    let geometry = {
        let mut state = ctx.window_state.lock();
        let geometry = state.restore(&displays);
        state.manage(id);
        geometry
    };
    log::info!("[WINDOW_STATE] Opening {} with {:?}", id, geometry);

    let mut builder =
        WebviewWindowBuilder::new(app, MAIN_WINDOW_LABEL, WebviewUrl::App("index.html".into()))
            .title(WINDOW_TITLE)
            .inner_size(geometry.width as f64, geometry.height as f64)
            .min_inner_size(options.min_width as f64, options.min_height as f64)
            .maximized(geometry.is_maximized)
            .fullscreen(geometry.is_full_screen)
            .visible(false);

    builder = match (geometry.x, geometry.y) {
        (Some(x), Some(y)) => builder.position(x as f64, y as f64),
        _ => builder.center(),
    };

    if let Some(color) = ctx
        .config
        .get_str_or_default("window:backgroundColor")
        .and_then(parse_color)
    {
        builder = builder.background_color(color);
    }

    let nav_app = app.clone();
    builder = builder.on_navigation(move |url: &Url| {
        let Some(ctx) = nav_app.try_state::<AppContext>() else {
            return false;
        };
        match ctx.navigation.decide(url) {
            NavigationDecision::Allow => true,
            NavigationDecision::OpenExternal(target) => {
                log::info!("[LIFECYCLE] Opening {} externally", target);
                if let Err(e) = nav_app.opener().open_url(target, None::<&str>) {
                    log::warn!("[LIFECYCLE] Failed to open external link: {}", e);
                }
                false
            },
            NavigationDecision::Block => {
                log::warn!("[LIFECYCLE] Blocked navigation to {}", url);
                false
            },
        }
    });

    let load_app = app.clone();
    builder = builder.on_page_load(move |_window, payload| {
        if matches!(payload.event(), PageLoadEvent::Finished) {
            crate::app::events::dispatch(&load_app, LifecycleEvent::ReadyToShow);
        }
    });

    Ok(builder.build()?)
}

/// Translate a raw window event into geometry updates.
///
/// Sizes and positions arrive in physical pixels and are stored logical.
/// Maximize and full-screen changes have no event of their own. They are
/// sampled on every move and resize and reported ahead of the bounds, since
/// a maximize usually moves the window to the display origin first.
pub fn track_geometry<R: Runtime>(
    window: &Window<R>,
    id: WindowId,
    event: &tauri::WindowEvent,
) -> Vec<GeometryEvent> {
    let scale = window.scale_factor().unwrap_or(1.0);
    let minimized = window.is_minimized().unwrap_or(false);

    let bounds = match event {
        tauri::WindowEvent::Moved(position) if !minimized => {
            let logical = position.to_logical::<i32>(scale);
            GeometryEvent::Moved {
                x: logical.x,
                y: logical.y,
            }
        },
        tauri::WindowEvent::Resized(size) if !minimized => {
            let logical = size.to_logical::<u32>(scale);
            GeometryEvent::Resized {
                width: logical.width,
                height: logical.height,
            }
        },
        tauri::WindowEvent::CloseRequested { .. } => return vec![GeometryEvent::Closed],
        _ => return Vec::new(),
    };

    let mut events = mode_changes(
        &window_geometry(window),
        window.is_maximized().unwrap_or(false),
        window.is_fullscreen().unwrap_or(false),
    );
    events.push(bounds);
    log::trace!("[WINDOW_STATE] {} {:?}", id, events);
    events
}

/// Maximize and full-screen transitions from `current` to the sampled flags.
fn mode_changes(
    current: &WindowGeometry,
    maximized: bool,
    full_screen: bool,
) -> Vec<GeometryEvent> {
    let mut events = Vec::new();
    if maximized != current.is_maximized {
        events.push(if maximized {
            GeometryEvent::Maximized
        } else {
            GeometryEvent::Unmaximized
        });
    }
    if full_screen != current.is_full_screen {
        events.push(if full_screen {
            GeometryEvent::EnterFullScreen
        } else {
            GeometryEvent::LeaveFullScreen
        });
    }
    events
}

fn window_geometry<R: Runtime>(window: &Window<R>) -> WindowGeometry {
    window.state::<AppContext>().window_state.lock().geometry()
}

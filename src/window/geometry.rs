//! Window geometry and display bounds.
//!
//! All values are logical pixels. Physical values coming from the OS are
//! converted with the window's scale factor before they get here.

use serde::{Deserialize, Serialize};

/// Minimum overlap (both axes) between a window and some display for the
/// window to count as reachable.
pub const MIN_VISIBLE_PX: i64 = 32;

/// Size, position and display state of the main window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowGeometry {
    pub width: u32,
    pub height: u32,
    /// `None` lets the window builder center the window.
    pub x: Option<i32>,
    pub y: Option<i32>,
    #[serde(default)]
    pub is_maximized: bool,
    #[serde(default)]
    pub is_full_screen: bool,
}

impl WindowGeometry {
    /// Unpositioned geometry of the given size.
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            x: None,
            y: None,
            is_maximized: false,
            is_full_screen: false,
        }
    }

    pub fn has_position(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    /// Raise width/height to the configured minimums.
    pub fn clamp_size(mut self, min_width: u32, min_height: u32) -> Self {
        self.width = self.width.max(min_width);
        self.height = self.height.max(min_height);
        self
    }
}

/// Bounds of one connected display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub is_primary: bool,
}

impl DisplayBounds {
    fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Top-left position that centers a `width` x `height` window here.
    pub fn centered(&self, width: u32, height: u32) -> (i32, i32) {
        let x = self.x as i64 + (self.width as i64 - width as i64) / 2;
        let y = self.y as i64 + (self.height as i64 - height as i64) / 2;
        (
            x.max(self.x as i64) as i32,
            y.max(self.y as i64) as i32,
        )
    }

    /// Whether a window at (x, y) overlaps this display enough to be grabbed.
    pub fn shows(&self, x: i32, y: i32, width: u32, height: u32) -> bool {
        let left = (x as i64).max(self.x as i64);
        let right = (x as i64 + width as i64).min(self.right());
        let top = (y as i64).max(self.y as i64);
        let bottom = (y as i64 + height as i64).min(self.bottom());

        let min_x = MIN_VISIBLE_PX.min(width as i64);
        let min_y = MIN_VISIBLE_PX.min(height as i64);
        right - left >= min_x && bottom - top >= min_y
    }
}

/// Display new windows open on: the primary one, else the first one.
pub fn preferred_display(displays: &[DisplayBounds]) -> Option<&DisplayBounds> {
    displays
        .iter()
        .find(|d| d.is_primary)
        .or_else(|| displays.first())
}

/// Whether `geometry` is reachable on any of `displays`.
///
/// Unpositioned geometry is always reachable (the builder centers it). With
/// no display information the position is trusted.
pub fn is_on_screen(geometry: &WindowGeometry, displays: &[DisplayBounds]) -> bool {
    let (Some(x), Some(y)) = (geometry.x, geometry.y) else {
        return true;
    };
    if displays.is_empty() {
        return true;
    }
    displays
        .iter()
        .any(|d| d.shows(x, y, geometry.width, geometry.height))
}

/// Position `geometry` in the middle of the preferred display.
pub fn center_on(mut geometry: WindowGeometry, displays: &[DisplayBounds]) -> WindowGeometry {
    match preferred_display(displays) {
        Some(display) => {
            let (x, y) = display.centered(geometry.width, geometry.height);
            geometry.x = Some(x);
            geometry.y = Some(y);
        },
        None => {
            geometry.x = None;
            geometry.y = None;
        },
    }
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary() -> DisplayBounds {
        DisplayBounds { x: 0, y: 0, width: 1920, height: 1080, is_primary: true }
    }

    fn secondary() -> DisplayBounds {
        DisplayBounds { x: 1920, y: 0, width: 1280, height: 1024, is_primary: false }
    }

    #[test]
    fn test_centered_on_primary() {
        let g = center_on(WindowGeometry::sized(1100, 800), &[secondary(), primary()]);
        assert_eq!(g.x, Some(410));
        assert_eq!(g.y, Some(140));
    }

    #[test]
    fn test_centered_without_displays_is_unpositioned() {
        let g = center_on(WindowGeometry::sized(1100, 800), &[]);
        assert!(!g.has_position());
    }

    #[test]
    fn test_centered_larger_than_display_pins_to_origin() {
        let small = DisplayBounds { x: 100, y: 50, width: 800, height: 600, is_primary: true };
        assert_eq!(small.centered(1100, 800), (100, 50));
    }

    #[test]
    fn test_preferred_display_falls_back_to_first() {
        let displays = [secondary()];
        assert_eq!(preferred_display(&displays), Some(&secondary()));
        assert_eq!(preferred_display(&[]), None);
    }

    #[test]
    fn test_fully_visible_window() {
        let g = WindowGeometry { x: Some(100), y: Some(100), ..WindowGeometry::sized(1100, 800) };
        assert!(is_on_screen(&g, &[primary()]));
    }

    #[test]
    fn test_partially_visible_window() {
        // Mostly hanging off the right edge, 100px still on the display.
        let g = WindowGeometry { x: Some(1820), y: Some(100), ..WindowGeometry::sized(1100, 800) };
        assert!(is_on_screen(&g, &[primary()]));
    }

    #[test]
    fn test_sliver_is_not_visible() {
        let g = WindowGeometry { x: Some(1910), y: Some(100), ..WindowGeometry::sized(1100, 800) };
        assert!(!is_on_screen(&g, &[primary()]));
    }

    #[test]
    fn test_window_on_disconnected_display() {
        let g = WindowGeometry { x: Some(2200), y: Some(100), ..WindowGeometry::sized(1100, 800) };
        assert!(is_on_screen(&g, &[primary(), secondary()]));
        assert!(!is_on_screen(&g, &[primary()]));
    }

    #[test]
    fn test_negative_coordinates_left_display() {
        let left = DisplayBounds { x: -1920, y: 0, width: 1920, height: 1080, is_primary: false };
        let g = WindowGeometry { x: Some(-1500), y: Some(200), ..WindowGeometry::sized(1100, 800) };
        assert!(is_on_screen(&g, &[primary(), left]));
        assert!(!is_on_screen(&g, &[primary()]));
    }

    #[test]
    fn test_unpositioned_and_unknown_displays_are_trusted() {
        assert!(is_on_screen(&WindowGeometry::sized(1100, 800), &[primary()]));
        let far = WindowGeometry { x: Some(99_999), y: Some(99_999), ..WindowGeometry::sized(1100, 800) };
        assert!(is_on_screen(&far, &[]));
    }

    #[test]
    fn test_clamp_size() {
        let g = WindowGeometry::sized(640, 480).clamp_size(1000, 700);
        assert_eq!((g.width, g.height), (1000, 700));
        let g = WindowGeometry::sized(1400, 900).clamp_size(1000, 700);
        assert_eq!((g.width, g.height), (1400, 900));
    }

    #[test]
    fn test_geometry_json_is_camel_case() {
        let g = WindowGeometry {
            x: Some(10),
            y: Some(20),
            is_maximized: true,
            ..WindowGeometry::sized(1100, 800)
        };
        let json = serde_json::to_value(g).unwrap();
        assert_eq!(json["isMaximized"], true);
        assert_eq!(json["isFullScreen"], false);
        let back: WindowGeometry = serde_json::from_value(json).unwrap();
        assert_eq!(back, g);
    }
}

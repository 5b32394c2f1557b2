//! Event names exchanged with the webview.

/// content -> main: the page is ready for the login handshake.
pub const CONTENT_READY: &str = "content-ready";
/// main -> content: log in with stored credentials. Sent at most once per
/// window instance.
pub const AUTO_LOGIN: &str = "auto-login";

pub const UPDATE_AVAILABLE: &str = "update-available";
pub const UPDATE_DOWNLOADED: &str = "update-downloaded";

pub const NEW_GIST: &str = "new-gist";
pub const EDIT_GIST: &str = "edit-gist";
pub const SEARCH_GIST: &str = "search-gist";
pub const IMMERSIVE_MODE: &str = "immersive-mode";
pub const BACK_TO_NORMAL_MODE: &str = "back-to-normal-mode";
pub const ABOUT_PAGE: &str = "about-page";

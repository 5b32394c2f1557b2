//! Top-level navigation policy for the main webview.
//!
//! The window never leaves the bundled app. Links to the web open in the
//! user's browser (or mail client) instead.

use tauri::Url;

/// Origins the bundled frontend is served from, per platform.
const APP_ORIGINS: &[&str] = &[
    "tauri://localhost",
    "http://tauri.localhost",
    "https://tauri.localhost",
];

/// Schemes handed to the system handler.
const EXTERNAL_SCHEMES: &[&str] = &["http", "https", "mailto"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Load inside the window.
    Allow,
    /// Cancel and open with the default external handler.
    OpenExternal(String),
    /// Cancel and do nothing.
    Block,
}

#[derive(Debug, Clone)]
pub struct NavigationPolicy {
    origins: Vec<Url>,
}

impl Default for NavigationPolicy {
    fn default() -> Self {
        Self::new(None)
    }
}

impl NavigationPolicy {
    /// Policy allowing the bundled origins plus `dev_url` when running
    /// against a dev server.
    pub fn new(dev_url: Option<&Url>) -> Self {
        let mut origins: Vec<Url> = APP_ORIGINS
            .iter()
            .filter_map(|origin| Url::parse(origin).ok())
            .collect();
        if let Some(dev_url) = dev_url {
            origins.push(dev_url.clone());
        }
        Self { origins }
    }

    pub fn decide(&self, url: &Url) -> NavigationDecision {
        if url.as_str() == "about:blank" || self.is_own_origin(url) {
            return NavigationDecision::Allow;
        }

        if EXTERNAL_SCHEMES.contains(&url.scheme()) {
            return NavigationDecision::OpenExternal(url.to_string());
        }

        NavigationDecision::Block
    }

    fn is_own_origin(&self, url: &Url) -> bool {
        self.origins.iter().any(|origin| {
            origin.scheme() == url.scheme()
                && origin.host_str() == url.host_str()
                && origin.port_or_known_default() == url.port_or_known_default()
        })
    }
}

//! WebView creation options.

use std::path::PathBuf;

use glaze_common::Color;
use serde::{Deserialize, Serialize};

/// Options for creating a webview instance.
///
/// All fields have defaults so partial configs work out of the box.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebViewConfig {
    /// Initial URL to load (takes precedence over `html`).
    pub url: Option<String>,
    /// Initial inline HTML to render.
    pub html: Option<String>,
    /// Transparent webview background.
    pub transparent: bool,
    /// Developer tools (always on in debug builds).
    pub dev_tools: bool,
    /// Native context menu on right click.
    pub context_menu: bool,
    /// Ask the engine to prefer its dark theme.
    pub force_dark_mode: bool,
    /// Background color behind the page.
    pub background: Color,
    /// Custom user agent string.
    pub user_agent: Option<String>,
    /// GPU-accelerated rendering.
    pub hardware_acceleration: bool,
    /// Persist cookies on disk under [`WebViewConfig::storage_dir`].
    pub persistent_cookies: bool,
    /// Override for the on-disk storage location; the format of its
    /// contents is owned by the native engine.
    pub storage_path: Option<PathBuf>,
    /// Scheme names to declare with the engine at creation time. Engines
    /// that can register schemes at any time ignore this; engines that
    /// only accept schemes before the first load need every scheme later
    /// passed to `handle_scheme` listed here.
    pub schemes: Vec<String>,
}

impl Default for WebViewConfig {
    fn default() -> Self {
        Self {
            url: None,
            html: None,
            transparent: false,
            dev_tools: cfg!(debug_assertions),
            context_menu: true,
            force_dark_mode: false,
            background: Color::WHITE,
            user_agent: None,
            hardware_acceleration: true,
            persistent_cookies: false,
            storage_path: None,
            schemes: Vec::new(),
        }
    }
}

impl WebViewConfig {
    /// Config that loads a URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Config that renders inline HTML.
    pub fn with_html(html: impl Into<String>) -> Self {
        Self {
            html: Some(html.into()),
            ..Default::default()
        }
    }

    /// Resolved storage directory: the explicit override, the platform
    /// data dir, or the temp dir as a last resort.
    pub fn storage_dir(&self) -> PathBuf {
        if let Some(path) = &self.storage_path {
            return path.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join("glaze"))
            .unwrap_or_else(|| std::env::temp_dir().join("glaze"))
    }
}

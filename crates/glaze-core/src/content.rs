//! Serving bundled content over an intercepted scheme.
//!
//! A [`ContentProvider`] is a ready-made scheme handler: it resolves
//! request paths against a base directory (with in-memory overrides for
//! generated content) and answers with the file bytes and a MIME type
//! guessed from the extension.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::scheme::{SchemeHandler, SchemeOutcome, SchemeResponse};

pub struct ContentProvider {
    base_dir: PathBuf,
    // path -> (mime, data); consulted before the filesystem
    overrides: HashMap<String, (String, Vec<u8>)>,
}

impl ContentProvider {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            overrides: HashMap::new(),
        }
    }

    /// Register an in-memory asset that shadows the filesystem.
    pub fn add_override(
        &mut self,
        path: impl Into<String>,
        mime: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) {
        self.overrides
            .insert(path.into(), (mime.into(), data.into()));
    }

    /// Resolve a request path to MIME type and content bytes.
    pub fn resolve(&self, path: &str) -> Option<(Cow<'_, str>, Cow<'_, [u8]>)> {
        let clean = path.trim_start_matches('/');

        if let Some((mime, data)) = self.overrides.get(clean) {
            return Some((Cow::Borrowed(mime.as_str()), Cow::Borrowed(data.as_slice())));
        }

        let file_path = self.base_dir.join(clean);

        // Canonicalize both sides so neither `..` segments nor symlinks
        // can escape the base directory.
        let canonical_base = std::fs::canonicalize(&self.base_dir).ok()?;
        let canonical_file = std::fs::canonicalize(&file_path).ok()?;
        if !canonical_file.starts_with(&canonical_base) {
            return None;
        }

        let data = std::fs::read(&canonical_file).ok()?;
        let mime = mime_from_extension(&file_path);
        Some((Cow::Borrowed(mime), Cow::Owned(data)))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Wrap this provider as a handler for `scheme`, suitable for
    /// `WebView::handle_scheme`.
    pub fn into_scheme_handler(self, scheme: &str) -> SchemeHandler {
        let provider = Arc::new(self);
        let prefixes = [
            format!("{scheme}://localhost/"),
            format!("{scheme}://localhost"),
            format!("{scheme}:///"),
            format!("{scheme}://"),
            format!("{scheme}:/"),
            format!("{scheme}:"),
        ];
        Box::new(move |request| {
            let path = prefixes
                .iter()
                .find_map(|p| request.url.strip_prefix(p.as_str()))
                .unwrap_or("");

            match provider.resolve(path) {
                Some((mime, data)) => SchemeOutcome::Handled(SchemeResponse::ok(
                    mime.as_ref(),
                    data.into_owned(),
                )),
                None => {
                    warn!(url = %request.url, "content provider: asset not found");
                    SchemeOutcome::Handled(SchemeResponse::not_found())
                }
            }
        })
    }
}

/// Guess MIME type from file extension.
fn mime_from_extension(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("wasm") => "application/wasm",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("txt") => "text/plain",
        Some("xml") => "application/xml",
        _ => "application/octet-stream",
    }
}

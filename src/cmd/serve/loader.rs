// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use percent_encoding::percent_decode_str;

/// Resolves request paths to files under the served directory.
///
/// Request paths come straight from the client, so anything that could
/// escape the root is refused.
pub struct StaticFiles {
    root: PathBuf,
}

#[derive(Debug, PartialEq)]
pub enum StaticFileError {
    Absolute,
    NotFound,
    NotFile,
    SymbolicLink,
    ParentComponent,
    /// The path is not valid UTF-8 once decoded.
    Encoding,
}

impl StaticFiles {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve the path of a request URI, such as `/assets/app.js`.
    pub fn resolve_uri(&self, uri_path: &str) -> Result<PathBuf, StaticFileError> {
        let decoded = percent_decode_str(uri_path)
            .decode_utf8()
            .map_err(|_| StaticFileError::Encoding)?;
        self.validate(decoded.trim_start_matches('/'))
    }

    /// Check that `path`, relative to the root, names a regular file.
    pub fn validate(&self, path: &str) -> Result<PathBuf, StaticFileError> {
        let path = PathBuf::from(path);
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(StaticFileError::ParentComponent);
        }
        if path.is_absolute() {
            return Err(StaticFileError::Absolute);
        }
        let path = self.root.join(path);
        if path.is_symlink() {
            return Err(StaticFileError::SymbolicLink);
        }
        if !path.exists() {
            return Err(StaticFileError::NotFound);
        }
        if !path.is_file() {
            return Err(StaticFileError::NotFile);
        }
        // A symlinked directory along the way can still lead outside.
        let root = self.root.canonicalize().map_err(|_| StaticFileError::NotFound)?;
        let resolved = path.canonicalize().map_err(|_| StaticFileError::NotFound)?;
        if !resolved.starts_with(&root) {
            return Err(StaticFileError::SymbolicLink);
        }
        Ok(path)
    }

    /// The single-page app entry point, if the directory has one.
    pub fn index(&self) -> Option<PathBuf> {
        self.validate("index.html").ok()
    }
}

pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "js" | "mjs" => "text/javascript",
        "css" => "text/css",
        "json" => "application/json",
        "webmanifest" => "application/manifest+json",
        "wasm" => "application/wasm",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}

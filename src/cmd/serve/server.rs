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

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::CONTENT_TYPE;
use tokio::net::TcpListener;
use tokio::signal;

use crate::cmd::serve::loader::StaticFiles;
use crate::cmd::serve::loader::content_type;
use crate::error::Fallible;
use crate::error::fail;

pub struct ServeConfig {
    pub directory: PathBuf,
    pub host: String,
    pub port: u16,
}

type Response = (StatusCode, [(HeaderName, &'static str); 1], Vec<u8>);

pub async fn start_server(config: ServeConfig) -> Fallible<()> {
    if !config.directory.is_dir() {
        return fail("directory does not exist.");
    }
    let root = config.directory.canonicalize()?;
    log::debug!("Serving files from {}", root.display());

    let app = Router::new()
        .fallback(static_handler)
        .with_state(Arc::new(StaticFiles::new(root)));
    let bind = format!("{}:{}", config.host, config.port);

    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(&bind).await?;
    println!("Serving on http://{bind}/");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Serve the requested file, falling back to `index.html` for anything that
/// does not resolve.
async fn static_handler(State(files): State<Arc<StaticFiles>>, uri: Uri) -> Response {
    let path = match files.resolve_uri(uri.path()) {
        Ok(path) => path,
        Err(e) => {
            log::debug!("No file for {}: {e:?}", uri.path());
            match files.index() {
                Some(index) => index,
                None => return not_found(),
            }
        }
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => (StatusCode::OK, [(CONTENT_TYPE, content_type(&path))], bytes),
        Err(e) => {
            log::error!("Failed to read {}: {e}", path.display());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(CONTENT_TYPE, "text/plain")],
                b"Internal Server Error".to_vec(),
            )
        }
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(CONTENT_TYPE, "text/plain")],
        b"Not Found".to_vec(),
    )
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => log::debug!("Received Ctrl+C, shutting down gracefully"),
        Err(e) => log::error!("Failed to listen for Ctrl+C: {e}"),
    }
}

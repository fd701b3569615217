//! Upload page served with axum.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `GET /` | empty upload form |
//! | `POST /` | store `file_upload`, convert, show the fragment |
//! | `GET /uploads/{name}` | stored files, for the embedded PDF viewer |

pub mod handlers;
pub mod page;
pub mod store;

pub use store::{StoredUpload, UploadStore};

use crate::config::ConversionConfig;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

/// Default request body limit (32 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Listener and storage settings for [`serve`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            upload_dir: std::env::temp_dir().join("pdf2html-uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConversionConfig>,
    pub store: UploadStore,
}

/// Build the application router.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let uploads = ServeDir::new(state.store.dir());

    Router::new()
        .route("/", get(handlers::index).post(handlers::upload))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `server.bind` and serve until the process is stopped.
pub async fn serve(server: ServerConfig, config: ConversionConfig) -> std::io::Result<()> {
    let store = UploadStore::open(&server.upload_dir).await?;
    info!("Storing uploads in {}", store.dir().display());

    let state = AppState {
        config: Arc::new(config),
        store,
    };
    let app = router(state, server.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(server.bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}

mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::autosave::SaveReport;
use crate::editor::SharedEditor;

/// The editing session served over HTTP.
#[derive(Clone)]
pub struct AppState {
    pub editor: SharedEditor,
    /// Present when an autosaver is attached to the editor.
    pub save_status: Option<watch::Receiver<SaveReport>>,
}

impl AppState {
    pub fn new(editor: SharedEditor) -> Self {
        Self {
            editor,
            save_status: None,
        }
    }

    pub fn with_save_status(mut self, status: watch::Receiver<SaveReport>) -> Self {
        self.save_status = Some(status);
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Project
        .route("/project", get(handlers::get_project).put(handlers::update_project))
        .route("/project/tree", get(handlers::get_tree))
        .route("/project/manuscript", get(handlers::get_manuscript))
        .route("/project/export", get(handlers::export_project))
        .route("/project/import", post(handlers::import_project))
        .route("/project/save-status", get(handlers::get_save_status))
        // Tools
        .route("/tools", get(handlers::list_tools))
        .route("/tools/{name}", post(handlers::run_tool))
        // History
        .route("/history", get(handlers::get_history))
        .route("/history/undo", post(handlers::undo))
        .route("/history/redo", post(handlers::redo))
        // Selection
        .route(
            "/selection",
            get(handlers::get_selection)
                .put(handlers::select)
                .delete(handlers::clear_selection),
        )
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

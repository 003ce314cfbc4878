// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 tidydrive contributors

//! HTTP API and static UI hosting

use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::chat::handle_chat;
use crate::completion::{ChatMessage, Completer, CompletionClient};
use crate::config::AppConfig;
use crate::drive::http::HttpDriveClient;
use crate::drive::{DriveFile, DriveService};
use crate::placement::PlacementResolver;
use crate::tree::{self, FolderNode};
use crate::upload::{upload_and_place, UploadItem};
use crate::TidyDriveError;

/// Shared application state, built once at startup
pub struct AppState {
    pub config: AppConfig,
    pub drive: Arc<dyn DriveService>,
    pub completion: Option<Arc<dyn Completer>>,
    pub resolver: PlacementResolver,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let drive: Arc<dyn DriveService> = Arc::new(HttpDriveClient::new(&config.drive));
        let completion: Option<Arc<dyn Completer>> =
            CompletionClient::from_config(&config.completion)
                .map(|c| Arc::new(c) as Arc<dyn Completer>);
        let resolver = PlacementResolver::new(
            completion.clone(),
            config.completion.temperature,
            config.drive.max_pages,
        );
        Self { config, drive, completion, resolver }
    }
}

/// Error wrapper so handlers can use `?`.
///
/// `NotAuthenticated` gets its own status so the client can prompt a
/// re-login; everything else is a generic server error carrying the
/// underlying message.
#[derive(Debug)]
struct ApiError(TidyDriveError);

impl From<TidyDriveError> for ApiError {
    fn from(e: TidyDriveError) -> Self {
        Self(e)
    }
}

#[derive(Serialize)]
struct FailureBody {
    success: bool,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            TidyDriveError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = FailureBody { success: false, message: self.0.to_string() };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.web.static_dir.clone();
    Router::new()
        .route("/api/folders/tree", get(get_folder_tree))
        .route("/api/folders", post(create_folder))
        .route("/api/upload", post(upload_file))
        .route("/api/files/move", post(move_file))
        .route("/api/files/search", get(search_files))
        .route("/api/files/latest", get(latest_file))
        .route("/api/chat", post(chat))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Handlers ===

#[derive(Serialize)]
struct TreeResponse {
    success: bool,
    structure: FolderNode,
}

async fn get_folder_tree(State(state): State<Arc<AppState>>) -> ApiResult<TreeResponse> {
    let structure = tree::build_tree(state.drive.as_ref(), state.config.drive.max_pages).await?;
    Ok(Json(TreeResponse { success: true, structure }))
}

#[derive(Serialize)]
struct UploadResponse {
    success: bool,
    file: DriveFile,
    moved: bool,
    message: String,
}

async fn upload_file(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let mut item: Option<UploadItem> = None;
    let mut hint: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| TidyDriveError::Validation(format!("Bad multipart body: {}", e)))?
    {
        let field_name = field.name().map(String::from);
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field
                    .content_type()
                    .map(String::from)
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&name).first_or_octet_stream().to_string()
                    });
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| TidyDriveError::Validation(format!("Bad file part: {}", e)))?
                    .to_vec();
                item = Some(UploadItem {
                    size_bytes: content.len() as u64,
                    name,
                    mime_type,
                    content,
                    hint: None,
                });
            }
            Some("hint") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| TidyDriveError::Validation(format!("Bad hint part: {}", e)))?;
                if !text.trim().is_empty() {
                    hint = Some(text);
                }
            }
            _ => {}
        }
    }

    let mut item = item
        .ok_or_else(|| TidyDriveError::Validation("No file attached".to_string()))?;
    item.hint = hint;

    let outcome = upload_and_place(state.drive.as_ref(), &state.resolver, item).await?;
    Ok(Json(UploadResponse {
        success: true,
        file: outcome.file,
        moved: outcome.moved,
        message: outcome.message,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateFolderRequest {
    name: String,
    parent_id: Option<String>,
}

#[derive(Serialize)]
struct FolderResponse {
    success: bool,
    folder: DriveFile,
    message: String,
}

async fn create_folder(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateFolderRequest>,
) -> ApiResult<FolderResponse> {
    if request.name.trim().is_empty() {
        return Err(TidyDriveError::Validation("Folder name is required".to_string()).into());
    }
    let folder = state
        .drive
        .create_folder(request.name.trim(), request.parent_id.as_deref())
        .await?;
    info!("Created folder '{}'", folder.name);
    Ok(Json(FolderResponse {
        success: true,
        message: format!("Folder '{}' created", folder.name),
        folder,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveFileRequest {
    file_id: String,
    new_parent_id: String,
}

#[derive(Serialize)]
struct MoveFileResponse {
    success: bool,
    file: DriveFile,
    message: String,
}

async fn move_file(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MoveFileRequest>,
) -> ApiResult<MoveFileResponse> {
    let current = state.drive.get_file(&request.file_id).await?;
    let file = state
        .drive
        .move_file(&request.file_id, &request.new_parent_id, &current.parents)
        .await?;
    Ok(Json(MoveFileResponse {
        success: true,
        message: format!("Moved '{}'", file.name),
        file,
    }))
}

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
}

#[derive(Serialize)]
struct SearchResponse {
    success: bool,
    items: Vec<DriveFile>,
}

async fn search_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<SearchResponse> {
    let items = state.drive.search_files(&query.q).await?;
    Ok(Json(SearchResponse { success: true, items }))
}

#[derive(Serialize)]
struct LatestFileView {
    #[serde(flatten)]
    file: DriveFile,
    #[serde(rename = "parentName")]
    parent_name: String,
}

#[derive(Serialize)]
struct LatestResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<LatestFileView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

async fn latest_file(State(state): State<Arc<AppState>>) -> ApiResult<LatestResponse> {
    let Some(file) = state.drive.latest_file().await? else {
        return Ok(Json(LatestResponse {
            success: false,
            file: None,
            message: Some("No files found".to_string()),
        }));
    };

    let parent_name = match file.parents.first() {
        Some(parent_id) => state
            .drive
            .get_file(parent_id)
            .await
            .map(|p| p.name)
            .unwrap_or_else(|_| tree::ROOT_NAME.to_string()),
        None => tree::ROOT_NAME.to_string(),
    };

    Ok(Json(LatestResponse {
        success: true,
        file: Some(LatestFileView { file, parent_name }),
        message: None,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    drive_context: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    success: bool,
    message: String,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    let message = handle_chat(
        state.drive.as_ref(),
        state.completion.as_ref(),
        &request.messages,
        request.drive_context.as_deref(),
    )
    .await?;
    Ok(Json(ChatResponse { success: true, message }))
}

/// Start the web server
pub async fn start_server(config: AppConfig) -> crate::Result<()> {
    let addr = format!("{}:{}", config.web.host, config.web.port);
    let state = Arc::new(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("tidydrive available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TidyDriveError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, shutting down...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::{FolderPage, FolderRecord};
    use async_trait::async_trait;

    struct TinyDrive;

    #[async_trait]
    impl DriveService for TinyDrive {
        async fn list_folders(&self, _: Option<&str>) -> crate::Result<FolderPage> {
            Ok(FolderPage {
                records: vec![FolderRecord {
                    id: "1".to_string(),
                    name: "Docs".to_string(),
                    parents: Vec::new(),
                }],
                next_page_token: None,
            })
        }
        async fn create_file(&self, _: &str, _: &str, _: Vec<u8>) -> crate::Result<DriveFile> {
            unreachable!()
        }
        async fn create_folder(&self, _: &str, _: Option<&str>) -> crate::Result<DriveFile> {
            unreachable!()
        }
        async fn move_file(&self, _: &str, _: &str, _: &[String]) -> crate::Result<DriveFile> {
            unreachable!()
        }
        async fn get_file(&self, _: &str) -> crate::Result<DriveFile> {
            unreachable!()
        }
        async fn search_files(&self, _: &str) -> crate::Result<Vec<DriveFile>> {
            Ok(Vec::new())
        }
        async fn latest_file(&self) -> crate::Result<Option<DriveFile>> {
            Ok(None)
        }
    }

    fn test_state() -> Arc<AppState> {
        let config = AppConfig::default();
        let resolver = PlacementResolver::new(None, 0.3, 10);
        Arc::new(AppState {
            config,
            drive: Arc::new(TinyDrive),
            completion: None,
            resolver,
        })
    }

    #[tokio::test]
    async fn tree_endpoint_reports_structure() {
        let Json(body) = get_folder_tree(State(test_state())).await.unwrap();
        assert!(body.success);
        assert_eq!(body.structure.children.len(), 1);
        assert_eq!(body.structure.children[0].name, "Docs");
    }

    #[tokio::test]
    async fn latest_endpoint_handles_empty_drive() {
        let Json(body) = latest_file(State(test_state())).await.unwrap();
        assert!(!body.success);
        assert_eq!(body.message.as_deref(), Some("No files found"));
    }

    #[test]
    fn not_authenticated_maps_to_401() {
        let response = ApiError(TidyDriveError::NotAuthenticated).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn other_errors_map_to_500() {
        let response = ApiError(TidyDriveError::Listing("boom".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

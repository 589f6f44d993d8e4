use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
};
use chrono::{DateTime, Utc};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::admin;
use crate::analysis::{AnalysisRecord, RecordStatus, UploadAxes};
use crate::chart::{ChartKind, ChartSpec};
use crate::config::CONFIG;
use crate::downloader;
use crate::error::AnalyticsError;
use crate::loader;
use crate::login::{self, AuthUser};
use crate::store::Store;

/// Shared application state handed to every handler.
pub struct AppState {
    pub store: Store,
}

/// Rows the preview endpoint returns.
const PREVIEW_ROWS: usize = 5;

/// Fixed page size for the history listing.
const HISTORY_PAGE_SIZE: usize = 10;

/// Default page size for the files listing.
const DEFAULT_PAGE_SIZE: usize = 10;

/// Room for multipart framing and the extra axis fields on top of the
/// configured file size cap.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::new(&CONFIG.data_dir);
    store.init()?;

    let app_state = Arc::new(AppState { store });
    let app = router(app_state);

    let listener = TcpListener::bind(&CONFIG.bind_addr).await?;
    log::info!("listening on http://{}", CONFIG.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the full application router.
///
/// Public routes are `/ping` and the auth endpoints; everything else
/// sits behind the bearer-token middleware, with the admin subtree
/// behind an additional role check.
pub fn router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(login::handle_register))
        .route("/login", post(login::handle_login))
        .route("/forgot-password", post(login::handle_forgot_password))
        .route("/reset-password", post(login::handle_reset_password));

    let admin_routes = Router::new()
        .route("/dashboard", get(admin::handle_dashboard))
        .route("/users/:id/deactivate", patch(admin::handle_deactivate_user))
        .route("/users/:id", delete(admin::handle_delete_user))
        .route("/uploads/:user_id", delete(admin::handle_purge_uploads))
        .layer(middleware::from_fn(login::require_admin));

    let protected_routes = Router::new()
        .route("/api/files/upload", post(handle_upload))
        .route("/api/files", get(handle_list_files))
        .route("/api/files/:id/analysis", get(handle_file_analysis))
        .route("/api/files/:id/download", get(handle_download))
        .route("/api/files/:id/export", get(handle_export))
        .route("/api/files/:id", delete(handle_delete_file))
        .route("/api/analysis/:file_id", get(handle_analysis_view))
        .route("/api/analysis/:file_id/preview", get(handle_preview))
        .route("/api/analysis/:file_id/chart", put(handle_update_chart))
        .route("/api/history", get(handle_history))
        .nest("/api/admin", admin_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            login::require_auth,
        ));

    Router::new()
        .route("/ping", get(ping))
        .nest("/api/auth", auth_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            CONFIG.max_upload_bytes + MULTIPART_OVERHEAD,
        ))
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    if CONFIG.cors_origin == "*" {
        return CorsLayer::permissive();
    }

    match CONFIG.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            log::warn!(
                "invalid CORS origin {:?}, falling back to permissive",
                CONFIG.cors_origin
            );
            CorsLayer::permissive()
        }
    }
}

async fn ping() -> &'static str {
    "pong"
}

/// JSON error body in the shape the client expects: `{"error": ...}`.
pub(crate) fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Translate a domain error into an HTTP response.
pub(crate) fn error_response(err: AnalyticsError) -> Response {
    match &err {
        AnalyticsError::NotFound(_) => json_error(StatusCode::NOT_FOUND, &err.to_string()),
        e if e.is_client_error() => json_error(StatusCode::BAD_REQUEST, &err.to_string()),
        _ => {
            log::error!("request failed: {}", err);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}

/// Record metadata returned by listings; omits the row data.
#[derive(Debug, Serialize)]
struct FileSummary {
    id: String,
    filename: String,
    file_size: u64,
    mime_type: String,
    chart_type: ChartKind,
    status: RecordStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&AnalysisRecord> for FileSummary {
    fn from(record: &AnalysisRecord) -> Self {
        FileSummary {
            id: record.id.clone(),
            filename: record.filename.clone(),
            file_size: record.file_size,
            mime_type: record.mime_type.clone(),
            chart_type: record.chart_type,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

// ----- upload -----

/// Handle a spreadsheet upload.
///
/// Multipart form: a `file` field with the workbook bytes, plus
/// optional `chart_type`, `x_axis`, `y_axis` and `z_axis` text fields.
/// The whole pipeline runs before anything is persisted, so a parse
/// failure leaves no partial state behind. The upload itself succeeds
/// even when no usable axes exist; the record is then stored
/// unconfigured and the response says so.
async fn handle_upload(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Response {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename = String::new();
    let mut mime_type = String::from("application/octet-stream");
    let mut axes = UploadAxes::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => return json_error(StatusCode::BAD_REQUEST, "Malformed multipart body"),
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                filename = field.file_name().unwrap_or("upload.xlsx").to_string();
                if let Some(content_type) = field.content_type() {
                    mime_type = content_type.to_string();
                }
                match field.bytes().await {
                    Ok(bytes) => file_bytes = Some(bytes.to_vec()),
                    Err(_) => {
                        return json_error(
                            StatusCode::BAD_REQUEST,
                            "Failed to read uploaded file",
                        );
                    }
                }
            }
            "chart_type" | "x_axis" | "y_axis" | "z_axis" => {
                let value = match field.text().await {
                    Ok(text) => text.trim().to_string(),
                    Err(_) => {
                        return json_error(StatusCode::BAD_REQUEST, "Malformed multipart body");
                    }
                };
                if value.is_empty() {
                    continue;
                }
                match name.as_str() {
                    "chart_type" => match ChartKind::parse(&value) {
                        Ok(kind) => axes.chart_type = Some(kind),
                        Err(e) => return error_response(e),
                    },
                    "x_axis" => axes.x_axis = Some(value),
                    "y_axis" => axes.y_axis = Some(value),
                    _ => axes.z_axis = Some(value),
                }
            }
            _ => {}
        }
    }

    let Some(bytes) = file_bytes else {
        return json_error(StatusCode::BAD_REQUEST, "No file uploaded");
    };

    if !loader::is_excel_filename(&filename) {
        return json_error(
            StatusCode::BAD_REQUEST,
            "Only .xls and .xlsx files are supported",
        );
    }

    if bytes.len() > CONFIG.max_upload_bytes {
        return json_error(StatusCode::BAD_REQUEST, "File exceeds the upload size limit");
    }

    let dataset = match loader::dataset_from_excel_bytes(&bytes) {
        Ok(dataset) => dataset,
        Err(e) => return error_response(e),
    };

    let record = AnalysisRecord::create(
        &user.id,
        &filename,
        bytes.len() as u64,
        &mime_type,
        dataset,
        axes,
    );

    if let Err(e) = state.store.save_upload(&user.id, &record.id, &bytes) {
        return error_response(e);
    }
    if let Err(e) = state.store.save_record(&record) {
        return error_response(e);
    }

    let message = match record.status {
        RecordStatus::Configured => "File uploaded and analyzed",
        RecordStatus::Unconfigured => "File uploaded; chart not configured yet",
    };

    log::info!("user {} uploaded {} ({} bytes)", user.id, record.filename, record.file_size);
    (
        StatusCode::CREATED,
        Json(json!({ "message": message, "file": FileSummary::from(&record) })),
    )
        .into_response()
}

// ----- file listing and retrieval -----

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<usize>,
    limit: Option<usize>,
}

/// List the caller's uploads, newest first, paginated.
async fn handle_list_files(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Response {
    let records = match state.store.list_records(&user.id) {
        Ok(records) => records,
        Err(e) => return error_response(e),
    };

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
    let total = records.len();

    let files: Vec<FileSummary> = records
        .iter()
        .skip((page - 1) * limit)
        .take(limit)
        .map(FileSummary::from)
        .collect();

    Json(json!({
        "files": files,
        "page": page,
        "limit": limit,
        "total": total,
        "has_more": page * limit < total,
    }))
    .into_response()
}

/// Return the full analysis document for one upload.
async fn handle_file_analysis(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Response {
    match state.store.load_record(&user.id, &id) {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(e),
    }
}

/// Stream the original upload back, decompressed, as an attachment.
async fn handle_download(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Response {
    let record = match state.store.load_record(&user.id, &id) {
        Ok(record) => record,
        Err(e) => return error_response(e),
    };

    let bytes = match state.store.load_upload(&user.id, &id) {
        Ok(bytes) => bytes,
        Err(e) => return error_response(e),
    };

    (
        [
            (header::CONTENT_TYPE, record.mime_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                attachment_disposition(&record.filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Re-serialize the stored rows to a fresh workbook and return it.
async fn handle_export(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Response {
    let record = match state.store.load_record(&user.id, &id) {
        Ok(record) => record,
        Err(e) => return error_response(e),
    };

    let buffer = match downloader::to_xlsx(&record.raw_data) {
        Ok(buffer) => buffer,
        Err(e) => return error_response(e),
    };

    (
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                attachment_disposition(&export_filename(&record.filename)),
            ),
        ],
        buffer,
    )
        .into_response()
}

/// Delete a record and its stored bytes.
async fn handle_delete_file(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Response {
    match state.store.delete_record(&user.id, &id) {
        Ok(()) => Json(json!({ "message": "File deleted" })).into_response(),
        Err(e) => error_response(e),
    }
}

fn attachment_disposition(filename: &str) -> String {
    // Quotes would break out of the header value.
    let safe = filename.replace(['"', '\r', '\n'], "_");
    format!("attachment; filename=\"{}\"", safe)
}

fn export_filename(filename: &str) -> String {
    let stem = filename
        .strip_suffix(".xlsx")
        .or_else(|| filename.strip_suffix(".xls"))
        .unwrap_or(filename);
    format!("{}_export.xlsx", stem)
}

// ----- analysis views -----

/// Shaped analysis view consumed by the chart screen.
async fn handle_analysis_view(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(file_id): Path<String>,
) -> Response {
    let record = match state.store.load_record(&user.id, &file_id) {
        Ok(record) => record,
        Err(e) => return error_response(e),
    };

    Json(json!({
        "filename": record.filename,
        "data": record.raw_data,
        "chart_type": record.chart_type,
        "columns": record.available_columns,
        "chart_data": record.chart_data,
        "x_axis": record.x_axis,
        "y_axis": record.y_axis,
        "z_axis": record.z_axis,
    }))
    .into_response()
}

/// First rows of an upload, for the column-picker preview.
async fn handle_preview(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(file_id): Path<String>,
) -> Response {
    let record = match state.store.load_record(&user.id, &file_id) {
        Ok(record) => record,
        Err(e) => return error_response(e),
    };

    Json(json!({
        "filename": record.filename,
        "columns": record.available_columns,
        "sample": record.sample(PREVIEW_ROWS),
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct ChartUpdateRequest {
    chart_type: ChartKind,
    x_axis: String,
    y_axis: String,
    z_axis: Option<String>,
}

/// Replace an upload's chart configuration and rebuild its payload.
///
/// Validation happens against the record's column set; on failure the
/// stored document is untouched.
async fn handle_update_chart(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(file_id): Path<String>,
    Json(req): Json<ChartUpdateRequest>,
) -> Response {
    let mut record = match state.store.load_record(&user.id, &file_id) {
        Ok(record) => record,
        Err(e) => return error_response(e),
    };

    let spec = ChartSpec {
        kind: req.chart_type,
        x_axis: req.x_axis,
        y_axis: req.y_axis,
        z_axis: req.z_axis,
    };

    if let Err(e) = record.configure(spec) {
        return error_response(e);
    }

    if let Err(e) = state.store.save_record(&record) {
        return error_response(e);
    }

    Json(json!({
        "message": "Chart configuration updated",
        "chart_type": record.chart_type,
        "chart_data": record.chart_data,
        "x_axis": record.x_axis,
        "y_axis": record.y_axis,
        "z_axis": record.z_axis,
    }))
    .into_response()
}

// ----- history -----

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    page: Option<usize>,
    chart_type: Option<String>,
    filename: Option<String>,
}

/// Paginated upload history with optional chart-kind and filename
/// filters. The filename filter is a case-insensitive regex match,
/// the way the web client sends search input.
async fn handle_history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let records = match state.store.list_records(&user.id) {
        Ok(records) => records,
        Err(e) => return error_response(e),
    };

    let kind_filter = match query.chart_type.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => match ChartKind::parse(s) {
            Ok(kind) => Some(kind),
            Err(e) => return error_response(e),
        },
        None => None,
    };

    let name_filter = match query.filename.as_deref().filter(|s| !s.is_empty()) {
        Some(pattern) => match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(re) => Some(re),
            Err(_) => return json_error(StatusCode::BAD_REQUEST, "Invalid filename filter"),
        },
        None => None,
    };

    let filtered: Vec<&AnalysisRecord> = records
        .iter()
        .filter(|r| kind_filter.map_or(true, |k| r.chart_type == k))
        .filter(|r| {
            name_filter
                .as_ref()
                .map_or(true, |re| re.is_match(&r.filename))
        })
        .collect();

    let page = query.page.unwrap_or(1).max(1);
    let total = filtered.len();

    let history: Vec<FileSummary> = filtered
        .into_iter()
        .skip((page - 1) * HISTORY_PAGE_SIZE)
        .take(HISTORY_PAGE_SIZE)
        .map(FileSummary::from)
        .collect();

    Json(json!({
        "history": history,
        "page": page,
        "total": total,
        "has_more": page * HISTORY_PAGE_SIZE < total,
    }))
    .into_response()
}

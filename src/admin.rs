use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::app::{AppState, error_response, json_error};
use crate::login::{AuthUser, UserView};

/// Number of recent uploads shown on the dashboard.
const RECENT_UPLOADS: usize = 5;

/// Admin dashboard: user and upload totals, the full user list with
/// credentials stripped, and the most recent uploads across all users.
pub async fn handle_dashboard(State(state): State<Arc<AppState>>) -> Response {
    let users = match state.store.load_users() {
        Ok(users) => users,
        Err(e) => return error_response(e),
    };

    let records = match state.store.all_records() {
        Ok(records) => records,
        Err(e) => return error_response(e),
    };

    let active_users = users.values().filter(|u| u.is_active).count();
    let mut user_views: Vec<UserView> = users.values().map(UserView::from).collect();
    user_views.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let recent: Vec<_> = records
        .iter()
        .take(RECENT_UPLOADS)
        .map(|r| {
            json!({
                "id": r.id,
                "user_id": r.user_id,
                "filename": r.filename,
                "file_size": r.file_size,
                "chart_type": r.chart_type,
                "created_at": r.created_at,
            })
        })
        .collect();

    Json(json!({
        "totals": {
            "users": users.len(),
            "active_users": active_users,
            "uploads": records.len(),
        },
        "users": user_views,
        "recent_uploads": recent,
    }))
    .into_response()
}

/// Deactivate an account. Deactivated users fail login and token
/// verification on their next request.
pub async fn handle_deactivate_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Response {
    if admin.id == id {
        return json_error(StatusCode::BAD_REQUEST, "Cannot deactivate your own account");
    }

    let mut users = match state.store.load_users() {
        Ok(users) => users,
        Err(e) => return error_response(e),
    };

    let Some(user) = users.get_mut(&id) else {
        return json_error(StatusCode::NOT_FOUND, "User not found");
    };

    user.is_active = false;
    let view = UserView::from(&*user);

    if let Err(e) = state.store.save_users(&users) {
        return error_response(e);
    }

    log::info!("admin {} deactivated user {}", admin.id, id);
    Json(json!({ "message": "User deactivated", "user": view })).into_response()
}

/// Delete an account together with everything it uploaded.
pub async fn handle_delete_user(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Response {
    if admin.id == id {
        return json_error(StatusCode::BAD_REQUEST, "Cannot delete your own account");
    }

    let mut users = match state.store.load_users() {
        Ok(users) => users,
        Err(e) => return error_response(e),
    };

    if users.remove(&id).is_none() {
        return json_error(StatusCode::NOT_FOUND, "User not found");
    }

    if let Err(e) = state.store.save_users(&users) {
        return error_response(e);
    }

    let deleted_uploads = match state.store.delete_user_uploads(&id) {
        Ok(count) => count,
        Err(e) => return error_response(e),
    };

    log::info!(
        "admin {} deleted user {} ({} uploads removed)",
        admin.id,
        id,
        deleted_uploads
    );
    Json(json!({ "message": "User deleted", "deleted_uploads": deleted_uploads })).into_response()
}

/// Purge every upload a user has made, keeping the account itself.
pub async fn handle_purge_uploads(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AuthUser>,
    Path(user_id): Path<String>,
) -> Response {
    match state.store.delete_user_uploads(&user_id) {
        Ok(count) => {
            log::info!("admin {} purged {} uploads of user {}", admin.id, count, user_id);
            Json(json!({ "message": "Uploads deleted", "deleted_count": count })).into_response()
        }
        Err(e) => error_response(e),
    }
}

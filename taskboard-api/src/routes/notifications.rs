/// Notification endpoints
///
/// Durable notifications back the realtime pushes: a client that was
/// offline when an assignment happened still finds it here.
///
/// # Endpoints
///
/// - `GET /notifications` - Caller's notifications, newest first
/// - `PUT /notifications/:id/read` - Mark a notification read (idempotent)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use taskboard_shared::{auth::policy::AuthContext, models::notification::Notification};
use uuid::Uuid;

/// List notifications handler
///
/// Returns the caller's notifications, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = Notification::list_for_user(&state.db, auth.user_id).await?;
    Ok(Json(notifications))
}

/// Mark notification read handler
///
/// Sets `read = true` and returns the updated record. Marking an
/// already-read notification again is a no-op, not an error.
///
/// # Errors
///
/// - `404 Not Found`: Unknown notification ID
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Notification>> {
    let notification = Notification::mark_read(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    Ok(Json(notification))
}

/// User listing endpoint
///
/// Serves the assignment picker: every user as an `{id, name}` summary.
/// Emails and roles are deliberately not exposed here.
///
/// # Endpoint
///
/// - `GET /users` - All users as identity summaries

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use taskboard_shared::models::user::{User, UserSummary};

/// List users handler
///
/// Returns all users as `{id, name}` summaries, ordered by name.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserSummary>>> {
    let users = User::list_summaries(&state.db).await?;
    Ok(Json(users))
}

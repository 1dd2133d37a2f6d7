/// Task endpoints
///
/// This module provides the task lifecycle endpoints:
/// - Listing the caller's tasks (creator or assignee)
/// - Creation (with an assignment notification when an assignee is set)
/// - Partial update and delete, both gated by the authorization policy
/// - The dashboard aggregate (three concurrent queries)
///
/// # Endpoints
///
/// - `GET /get-task` - Tasks where the caller is creator or assignee
/// - `POST /create-task` - Create a task
/// - `PUT /update/:id` - Partially update a task
/// - `DELETE /delete/:id` - Delete a task
/// - `GET /dashboard-tasks` - `{assignedTasks, createdTasks, overdueTasks}`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    notify,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use taskboard_shared::{
    auth::policy::{self, AuthContext},
    models::{
        task::{
            parse_due_date, utc_midnight_today, CreateTask, Task, TaskPriority, TaskStatus,
            TaskWithUsers, UpdateTask,
        },
        user::User,
    },
};
use uuid::Uuid;

/// Create task request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,

    pub description: String,

    /// Due date in `DD-MM-YYYY` form
    pub due_date: String,

    pub priority: TaskPriority,

    pub status: TaskStatus,

    /// Optional assignee; triggers an assignment notification when set
    pub assigned_to_id: Option<Uuid>,
}

/// Update task request
///
/// Absent fields are left untouched. `assignedToId` is the one field that
/// distinguishes absent from an explicit `null` (which clears the assignee).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,

    pub description: Option<String>,

    /// Due date in `DD-MM-YYYY` form
    pub due_date: Option<String>,

    pub priority: Option<TaskPriority>,

    pub status: Option<TaskStatus>,

    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to_id: Option<Option<Uuid>>,
}

/// Dashboard response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Tasks assigned to the caller, oldest creation first
    pub assigned_tasks: Vec<Task>,

    /// Tasks created by the caller, newest creation first
    pub created_tasks: Vec<Task>,

    /// Overdue, non-completed tasks assigned to the caller, soonest first
    pub overdue_tasks: Vec<Task>,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Distinguishes an absent field from an explicit `null`
///
/// Paired with `#[serde(default)]`: absent yields `None`, `null` yields
/// `Some(None)`, a value yields `Some(Some(v))`.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

/// Treats empty or whitespace-only strings as "not provided"
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// List tasks handler
///
/// Returns every task where the caller is creator or assignee, each
/// enriched with creator/assignee identity summaries, newest first. Read
/// access is scoped by the query filter itself.
///
/// # Endpoint
///
/// ```text
/// GET /get-task
/// ```
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TaskWithUsers>>> {
    let tasks = Task::list_for_user(&state.db, auth.user_id).await?;
    Ok(Json(tasks))
}

/// Create task handler
///
/// Persists the task with the caller as creator, then, if an assignee was
/// given, writes a durable notification and attempts a realtime push. The
/// task write commits before the notification write; a client may observe
/// a task without its notification, never the reverse.
///
/// # Endpoint
///
/// ```text
/// POST /create-task
/// Content-Type: application/json
///
/// {
///   "title": "Ship the release",
///   "description": "Cut and tag v1.2",
///   "dueDate": "25-12-2025",
///   "priority": "HIGH",
///   "status": "TODO",
///   "assignedToId": "uuid"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Due date not a valid `DD-MM-YYYY` date
/// - `401 Unauthorized`: Missing or invalid identity cookie
/// - `500 Internal Server Error`: Server error
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let due_date = parse_due_date(&req.due_date)?;

    let task = Task::create(
        &state.db,
        CreateTask {
            title: req.title,
            description: req.description,
            due_date,
            priority: req.priority,
            status: req.status,
            created_by_id: auth.user_id,
            assigned_to_id: req.assigned_to_id,
        },
    )
    .await?;

    if task.assigned_to_id.is_some() {
        // The token always carries a real user id, but the account may have
        // been deleted since issuance
        let creator = User::find_by_id(&state.db, auth.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Creator account not found".to_string()))?;

        notify::task_assigned(&state, &task, &creator).await?;
    }

    tracing::info!(task_id = %task.id, created_by = %auth.user_id, "Task created");

    Ok(Json(task))
}

/// Update task handler
///
/// Applies a partial update. Admins, the creator, and the current assignee
/// may update; anyone else gets `Forbidden`. Empty-string text fields are
/// treated as not provided; only an explicit `"assignedToId": null` clears
/// the assignee.
///
/// # Endpoint
///
/// ```text
/// PUT /update/:id
/// Content-Type: application/json
///
/// { "status": "IN_PROGRESS" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Due date not a valid `DD-MM-YYYY` date
/// - `403 Forbidden`: Caller is neither admin, creator, nor assignee
/// - `404 Not Found`: Unknown task ID
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if !policy::can_update(&auth, &task) {
        return Err(ApiError::Forbidden(
            "You are not allowed to update this task".to_string(),
        ));
    }

    let due_date = match non_empty(req.due_date) {
        Some(raw) => Some(parse_due_date(&raw)?),
        None => None,
    };

    let patch = UpdateTask {
        title: non_empty(req.title),
        description: non_empty(req.description),
        due_date,
        priority: req.priority,
        status: req.status,
        assigned_to_id: req.assigned_to_id,
    };

    let updated = Task::update(&state.db, id, patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::debug!(task_id = %id, updated_by = %auth.user_id, "Task updated");

    Ok(Json(updated))
}

/// Delete task handler
///
/// Admins and the creator may delete; assignees may not.
///
/// # Endpoint
///
/// ```text
/// DELETE /delete/:id
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller is neither admin nor creator
/// - `404 Not Found`: Unknown task ID
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    let task = Task::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if !policy::can_delete(&auth, task.created_by_id) {
        return Err(ApiError::Forbidden(
            "You are not allowed to delete this task".to_string(),
        ));
    }

    let deleted = Task::delete(&state.db, id).await?;
    if !deleted {
        // Raced with another delete
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::info!(task_id = %id, deleted_by = %auth.user_id, "Task deleted");

    Ok(Json(DeleteResponse {
        message: "Task deleted".to_string(),
    }))
}

/// Dashboard handler
///
/// Issues the three reads concurrently and joins on all of them; if any
/// one fails the whole call fails, never a partial dashboard.
///
/// # Endpoint
///
/// ```text
/// GET /dashboard-tasks
/// ```
///
/// # Errors
///
/// - `500 Internal Server Error`: One of the three queries errored
pub async fn dashboard_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DashboardResponse>> {
    let cutoff = utc_midnight_today();

    let (assigned_tasks, created_tasks, overdue_tasks) = tokio::try_join!(
        Task::list_assigned_to(&state.db, auth.user_id),
        Task::list_created_by(&state.db, auth.user_id),
        Task::list_overdue(&state.db, auth.user_id, cutoff),
    )
    .map_err(|e| ApiError::DashboardQueryFailed(e.to_string()))?;

    Ok(Json(DashboardResponse {
        assigned_tasks,
        created_tasks,
        overdue_tasks,
    }))
}

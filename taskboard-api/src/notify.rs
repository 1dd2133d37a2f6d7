/// Notification engine
///
/// Runs as part of task creation when the new task carries an assignee:
/// first the durable notification row is written, then realtime delivery is
/// attempted as fire-and-forget. The two are deliberately decoupled — a
/// push to a user with no live connection is dropped without affecting the
/// HTTP response, and the durable row is never rolled back over a delivery
/// miss.
///
/// Ordering within one create request: task insert commits, then the
/// notification insert, then the push attempt. A client can observe a task
/// before its notification exists, but never a notification without its
/// backing task.

use serde_json::json;
use tracing::debug;

use taskboard_shared::models::notification::{CreateNotification, Notification};
use taskboard_shared::models::task::Task;
use taskboard_shared::models::user::User;

use crate::app::AppState;
use crate::realtime::TASK_ASSIGNED_EVENT;

/// Builds the notification message for an assignment
fn assignment_message(creator_name: &str, task_title: &str) -> String {
    format!("{} assigned you a new task: \"{}\"", creator_name, task_title)
}

/// Records and announces a task assignment
///
/// Returns `Ok(None)` when the task has no assignee. The durable write is
/// awaited; the push is spawned and its outcome only logged.
///
/// # Errors
///
/// Returns a database error if the notification row cannot be written.
/// Push failures are not errors.
pub async fn task_assigned(
    state: &AppState,
    task: &Task,
    creator: &User,
) -> Result<Option<Notification>, sqlx::Error> {
    let Some(assignee_id) = task.assigned_to_id else {
        return Ok(None);
    };

    let notification = Notification::create(
        &state.db,
        CreateNotification {
            user_id: assignee_id,
            message: assignment_message(&creator.name, &task.title),
            task_id: task.id,
        },
    )
    .await?;

    // Best-effort push; never feeds back into the HTTP response
    let channels = state.channels.clone();
    let payload = json!({
        "message": notification.message,
        "task": task,
    });
    tokio::spawn(async move {
        let delivered = channels.push_to_user(assignee_id, TASK_ASSIGNED_EVENT, payload);
        debug!(%assignee_id, delivered, "Realtime assignment push attempted");
    });

    Ok(Some(notification))
}

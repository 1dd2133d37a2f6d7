/// Task model and database operations
///
/// Tasks are the core entity of the system: created by an authenticated
/// user (who becomes the immutable creator), optionally assigned to another
/// user, and mutated by creator, assignee, or admins per the policy in
/// [`crate::auth::policy`].
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('LOW', 'MEDIUM', 'HIGH');
/// CREATE TYPE task_status AS ENUM ('TODO', 'IN_PROGRESS', 'COMPLETED');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     due_date TIMESTAMPTZ NOT NULL,
///     priority task_priority NOT NULL,
///     status task_status NOT NULL,
///     created_by_id UUID NOT NULL REFERENCES users(id),
///     assigned_to_id UUID REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Due dates
///
/// Clients submit due dates as day-month-year strings ("25-12-2025");
/// [`parse_due_date`] turns them into UTC midnight of that calendar day.
/// There are no time-of-day semantics beyond the midnight comparison used
/// by the overdue query.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::user::UserSummary;

/// Error type for due-date parsing
#[derive(Debug, thiserror::Error)]
pub enum DueDateError {
    /// The string did not parse as a DD-MM-YYYY calendar date
    #[error("Invalid due date \"{0}\": expected DD-MM-YYYY")]
    Unparseable(String),
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Task status
///
/// `Completed` is the single terminal state; completed tasks are excluded
/// from the overdue query regardless of due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }

    /// Checks if the status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

/// Parses a "DD-MM-YYYY" due-date string into UTC midnight of that day
///
/// # Errors
///
/// Returns [`DueDateError::Unparseable`] when the three components do not
/// form a valid calendar date or the field order is wrong ("2025-12-25"
/// is rejected).
///
/// # Example
///
/// ```
/// use taskboard_shared::models::task::parse_due_date;
///
/// let due = parse_due_date("25-12-2025").unwrap();
/// assert_eq!(due.to_rfc3339(), "2025-12-25T00:00:00+00:00");
///
/// assert!(parse_due_date("2025-12-25").is_err());
/// ```
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, DueDateError> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%d-%m-%Y")
        .map_err(|_| DueDateError::Unparseable(raw.to_string()))?;

    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

/// Current UTC midnight, the cutoff used by the overdue query
pub fn utc_midnight_today() -> DateTime<Utc> {
    Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Task record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    pub title: String,

    pub description: String,

    /// UTC midnight of the due day
    pub due_date: DateTime<Utc>,

    pub priority: TaskPriority,

    pub status: TaskStatus,

    /// Creator, set at insert time and immutable thereafter
    pub created_by_id: Uuid,

    /// Assignee; may be cleared by an explicit null in a patch
    pub assigned_to_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    /// The authenticated caller
    pub created_by_id: Uuid,
    pub assigned_to_id: Option<Uuid>,
}

/// Partial update of a task
///
/// `None` fields are left untouched. `assigned_to_id` is the one field
/// that distinguishes "absent" (`None`) from "explicitly cleared"
/// (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub assigned_to_id: Option<Option<Uuid>>,
}

impl UpdateTask {
    /// True when the patch carries no changes
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.assigned_to_id.is_none()
    }
}

/// Task enriched with creator/assignee identity summaries, as returned by
/// the listing queries
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithUsers {
    #[serde(flatten)]
    pub task: Task,

    pub created_by: UserSummary,

    pub assigned_to: Option<UserSummary>,
}

impl sqlx::FromRow<'_, PgRow> for TaskWithUsers {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let task = Task::from_row(row)?;

        let created_by = UserSummary {
            id: task.created_by_id,
            name: row.try_get("created_by_name")?,
        };

        let assigned_to = match (
            task.assigned_to_id,
            row.try_get::<Option<String>, _>("assigned_to_name")?,
        ) {
            (Some(id), Some(name)) => Some(UserSummary { id, name }),
            _ => None,
        };

        Ok(Self {
            task,
            created_by,
            assigned_to,
        })
    }
}

const TASK_COLUMNS: &str = "id, title, description, due_date, priority, status, \
                            created_by_id, assigned_to_id, created_at, updated_at";

impl Task {
    /// Creates a new task
    ///
    /// The creator is taken from `data.created_by_id` and is never updated
    /// afterwards.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, due_date, priority, status,
                               created_by_id, assigned_to_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, due_date, priority, status,
                      created_by_id, assigned_to_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.due_date)
        .bind(data.priority)
        .bind(data.status)
        .bind(data.created_by_id)
        .bind(data.assigned_to_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, priority, status,
                   created_by_id, assigned_to_id, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Applies a partial update
    ///
    /// Only the fields present in `patch` are written; `created_by_id` is
    /// never touched. Returns `None` if the task no longer exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        patch: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        if patch.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if patch.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if patch.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if patch.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }
        if patch.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if patch.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        match patch.assigned_to_id {
            // Explicit clear needs no bind parameter
            Some(None) => query.push_str(", assigned_to_id = NULL"),
            Some(Some(_)) => {
                bind_count += 1;
                query.push_str(&format!(", assigned_to_id = ${}", bind_count));
            }
            None => {}
        }

        query.push_str(" WHERE id = $1 RETURNING ");
        query.push_str(TASK_COLUMNS);

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = patch.title {
            q = q.bind(title);
        }
        if let Some(description) = patch.description {
            q = q.bind(description);
        }
        if let Some(due_date) = patch.due_date {
            q = q.bind(due_date);
        }
        if let Some(priority) = patch.priority {
            q = q.bind(priority);
        }
        if let Some(status) = patch.status {
            q = q.bind(status);
        }
        if let Some(Some(assignee)) = patch.assigned_to_id {
            q = q.bind(assignee);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task
    ///
    /// Notifications referencing the task are removed by the schema's
    /// CASCADE. Returns `false` if the task did not exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists tasks where the user is creator or assignee, enriched with
    /// identity summaries
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<TaskWithUsers>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, TaskWithUsers>(
            r#"
            SELECT t.id, t.title, t.description, t.due_date, t.priority, t.status,
                   t.created_by_id, t.assigned_to_id, t.created_at, t.updated_at,
                   cu.name AS created_by_name,
                   au.name AS assigned_to_name
            FROM tasks t
            JOIN users cu ON cu.id = t.created_by_id
            LEFT JOIN users au ON au.id = t.assigned_to_id
            WHERE t.created_by_id = $1 OR t.assigned_to_id = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks assigned to the user, oldest creation first
    pub async fn list_assigned_to(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, priority, status,
                   created_by_id, assigned_to_id, created_at, updated_at
            FROM tasks
            WHERE assigned_to_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks created by the user, newest creation first
    pub async fn list_created_by(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, priority, status,
                   created_by_id, assigned_to_id, created_at, updated_at
            FROM tasks
            WHERE created_by_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists non-completed tasks assigned to the user that were due strictly
    /// before `cutoff`, soonest due date first
    ///
    /// Callers pass [`utc_midnight_today`] as the cutoff.
    pub async fn list_overdue(
        pool: &PgPool,
        user_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, due_date, priority, status,
                   created_by_id, assigned_to_id, created_at, updated_at
            FROM tasks
            WHERE assigned_to_id = $1
              AND due_date < $2
              AND status <> 'COMPLETED'
            ORDER BY due_date ASC
            "#,
        )
        .bind(user_id)
        .bind(cutoff)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}

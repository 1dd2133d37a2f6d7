/// Authorization policy
///
/// Pure decision functions: given the requester's identity and a task's
/// ownership/assignment data, decide allow or deny. No database access and
/// no side effects — the API layer turns a `false` into a 403 before any
/// mutation happens.
///
/// Read access is not decided here at all: listing queries are scoped to
/// creator-or-assignee in SQL, so there is nothing to check after the fact.
///
/// # Rules
///
/// - update: admin, creator, or assignee
/// - delete: admin or creator
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::policy::{can_delete, AuthContext};
/// use taskboard_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let creator = Uuid::new_v4();
/// let auth = AuthContext {
///     user_id: creator,
///     role: UserRole::User,
///     email: "ada@example.com".to_string(),
/// };
///
/// assert!(can_delete(&auth, creator));
/// assert!(!can_delete(&auth, Uuid::new_v4()));
/// ```

use uuid::Uuid;

use crate::models::task::Task;
use crate::models::user::UserRole;

/// Authenticated requester identity
///
/// Built from validated token claims by the API's auth middleware and
/// carried through request extensions.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Role at token issuance time
    pub role: UserRole,

    /// Email at token issuance time
    pub email: String,
}

impl AuthContext {
    /// Builds the context from validated token claims
    pub fn from_claims(claims: &crate::auth::jwt::Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            email: claims.email.clone(),
        }
    }
}

/// Checks whether the requester may delete a task with the given creator
///
/// True iff the requester is an admin or the creator.
pub fn can_delete(auth: &AuthContext, created_by_id: Uuid) -> bool {
    auth.role.is_admin() || auth.user_id == created_by_id
}

/// Checks whether the requester may update a task
///
/// True iff the requester is an admin, the creator, or the current
/// assignee.
pub fn can_update(auth: &AuthContext, task: &Task) -> bool {
    auth.role.is_admin()
        || auth.user_id == task.created_by_id
        || task.assigned_to_id == Some(auth.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{parse_due_date, TaskPriority, TaskStatus};
    use chrono::Utc;

    fn auth(user_id: Uuid, role: UserRole) -> AuthContext {
        AuthContext {
            user_id,
            role,
            email: "someone@example.com".to_string(),
        }
    }

    fn task(created_by_id: Uuid, assigned_to_id: Option<Uuid>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "A task".to_string(),
            description: "".to_string(),
            due_date: parse_due_date("01-01-2030").unwrap(),
            priority: TaskPriority::Medium,
            status: TaskStatus::Todo,
            created_by_id,
            assigned_to_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    // All four (role, relationship) combinations for delete.
    #[test]
    fn test_can_delete_grid() {
        let creator = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        assert!(can_delete(&auth(creator, UserRole::Admin), creator));
        assert!(can_delete(&auth(stranger, UserRole::Admin), creator));
        assert!(can_delete(&auth(creator, UserRole::User), creator));
        assert!(!can_delete(&auth(stranger, UserRole::User), creator));
    }

    #[test]
    fn test_can_update_allows_assignee() {
        let creator = Uuid::new_v4();
        let assignee = Uuid::new_v4();
        let task = task(creator, Some(assignee));

        // Non-creator, non-admin assignee may update
        assert!(can_update(&auth(assignee, UserRole::User), &task));
    }

    #[test]
    fn test_can_update_denies_unrelated_user() {
        let task = task(Uuid::new_v4(), Some(Uuid::new_v4()));

        assert!(!can_update(&auth(Uuid::new_v4(), UserRole::User), &task));
    }

    #[test]
    fn test_can_update_creator_and_admin() {
        let creator = Uuid::new_v4();
        let task = task(creator, None);

        assert!(can_update(&auth(creator, UserRole::User), &task));
        assert!(can_update(&auth(Uuid::new_v4(), UserRole::Admin), &task));
    }

    #[test]
    fn test_can_update_unassigned_task_denies_former_assignee() {
        let former_assignee = Uuid::new_v4();
        let task = task(Uuid::new_v4(), None);

        assert!(!can_update(&auth(former_assignee, UserRole::User), &task));
    }

    #[test]
    fn test_assignee_cannot_delete() {
        let creator = Uuid::new_v4();
        let assignee = Uuid::new_v4();
        let task = task(creator, Some(assignee));

        assert!(can_update(&auth(assignee, UserRole::User), &task));
        assert!(!can_delete(&auth(assignee, UserRole::User), task.created_by_id));
    }
}

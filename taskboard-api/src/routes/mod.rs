/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (signup, login, logout)
/// - `tasks`: Task CRUD and dashboard endpoints
/// - `users`: User listing for the assignment picker
/// - `notifications`: Notification listing and mark-read

pub mod health;
pub mod auth;
pub mod tasks;
pub mod users;
pub mod notifications;

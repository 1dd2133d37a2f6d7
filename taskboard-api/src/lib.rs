//! # Taskboard API Server Library
//!
//! Core functionality for the taskboard API server.
//!
//! ## Modules
//!
//! - `app`: Application state, router, and cookie authentication
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `notify`: Notification engine (durable write + best-effort push)
//! - `realtime`: Realtime channel registry and WebSocket endpoint
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod notify;
pub mod realtime;
pub mod routes;

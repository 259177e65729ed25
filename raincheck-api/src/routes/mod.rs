/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `tasks`: Task CRUD endpoints
/// - `fcm_token`: Push device token registration
/// - `suggest`: AI completion-time suggestions
/// - `assistant`: Chat assistant
/// - `cron`: Reminder scan trigger

pub mod assistant;
pub mod auth;
pub mod cron;
pub mod fcm_token;
pub mod health;
pub mod suggest;
pub mod tasks;

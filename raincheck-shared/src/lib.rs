//! # RainCheck Shared Library
//!
//! This crate contains shared types, utilities, and business logic used across
//! the RainCheck API server and reminder scheduler.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication utilities (JWT, password hashing, middleware)
//! - `db`: Connection pool and migration runner
//! - `push`: Push notification gateway (FCM HTTP v1)
//! - `suggest`: AI completion-time suggestion client
//! - `assistant`: "RainCheck AI" chat assistant
//! - `reminders`: Reminder scanner core

pub mod assistant;
pub mod auth;
pub mod db;
pub mod models;
pub mod push;
pub mod reminders;
pub mod suggest;

/// Current version of the RainCheck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # RainCheck Scheduler Library
//!
//! Periodic reminder scanning for deployments without an external cron
//! service. The scheduler wraps the shared reminder scan in a cancellable
//! interval loop.

pub mod scheduler;

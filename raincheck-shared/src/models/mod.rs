/// Database models
///
/// - `task`: user-owned to-do items
/// - `user`: user accounts with registered push tokens

pub mod task;
pub mod user;

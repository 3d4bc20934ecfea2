/// Domain models
///
/// - `user`: accounts, login identity, admin flag
/// - `task`: to-do items and the read-side [`task::TaskFilter`]
///
/// Models are plain data. Persistence is in [`crate::store`].

pub mod task;
pub mod user;

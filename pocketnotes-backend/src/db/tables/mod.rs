pub mod auth_sessions;
pub mod users;

pub mod auth;
pub mod health;
pub mod notes;
pub mod share;

pub mod auth;
pub mod deleted_habits;
pub mod habits;
pub mod profile;

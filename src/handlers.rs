pub mod auth;
pub mod notifications;
pub mod shell;
pub mod supervisors;

pub mod auth;
pub mod navigation_service;
pub mod notification_service;
pub mod shell_service;
pub mod supervisor_service;

pub mod auth;
pub mod ferme;
pub mod navigation;
pub mod shell;
pub mod stock;
pub mod supervisor;

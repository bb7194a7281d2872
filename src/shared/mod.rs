pub mod app_error;
pub mod clock;
pub mod config;
pub mod database;
pub mod handlers;
pub mod hash_worker;
pub mod health_check;
pub mod http_error;
pub mod role;

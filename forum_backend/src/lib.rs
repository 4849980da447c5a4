pub mod api;
pub mod config;
pub mod database;
pub mod forum;
pub mod realtime;
pub mod telemetry;
pub mod utils;

pub mod api_client;
pub mod configuration;
pub mod domain;
pub mod login;
pub mod scenario;
pub mod session;
pub mod telemetry;
mod utils;

// OtaServe - Core module structure
pub mod api;
pub mod artifacts;
pub mod auth;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod error;
pub mod logsink;
pub mod version;

pub use api::{create_router, ApiState};
pub use config::Config;

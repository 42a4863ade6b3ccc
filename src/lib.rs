pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use client::DrillClient;
pub use config::DrillConfig;
pub use error::ClientError;
pub use models::*;
pub use services::*;

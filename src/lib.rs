// Public modules
pub mod types;
pub mod error;
pub mod config;
pub mod parsing;
pub mod fetcher;
pub mod publisher;
pub mod collector;
pub mod server;

// Re-export commonly used items
pub use types::*;
pub use error::ExporterError;
pub use config::{load_config, load_config_with_env, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use parsing::{parse_status, parse_duration_seconds, parse_percent, parse_health_line, HEALTH_FIELDS};
pub use fetcher::HealthFetcher;
pub use publisher::{render, HealthMetrics};
pub use collector::HealthCollector;
pub use server::{router, serve};

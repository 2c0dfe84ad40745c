pub mod audit;
pub mod cache;
pub mod config;
pub mod http;
pub mod observability;
pub mod server;
pub mod todos;

pub use audit::{AuditAction, AuditEvent, AuditLogger, AuditOutcome};
pub use cache::{RemoteCache, SetOutcome};
pub use config::{
    AppConfig, AuditConfig, CacheConfig, LoggingConfig, RedisConfig, ServerConfig,
};
pub use observability::{init_tracing, init_tracing_with_level};
pub use server::{AppState, build_app, run};
pub use todos::TodoService;

pub mod defaults;
pub mod paths;
pub mod schema;
pub mod service;
pub mod validation;

pub use paths::AppPaths;
pub use schema::{AppConfig, AssistantConfig, BackendConfig, KnowledgeConfig, LoggingConfig};
pub use service::ConfigService;

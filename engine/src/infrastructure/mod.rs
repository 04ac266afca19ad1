pub mod config;
pub mod in_memory_repository;
pub mod tokio_executor;

pub use config::{AppConfig, EcosystemConfig};
pub use in_memory_repository::InMemoryInstanceRepository;
pub use tokio_executor::TokioProcessExecutor;

pub mod instance_repository;
pub mod process_executor;

#[cfg(test)]
pub mod mock_repository;

pub use instance_repository::InstanceRepository;
pub use process_executor::{ExitHandle, OutputStream, ProcessExecutor, SpawnConfig, SpawnResult};

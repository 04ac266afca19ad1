pub mod get_instance_status;
pub mod list_instances;
pub mod load_config;
pub mod restart_instance;
pub mod start_instance;
pub mod stop_instance;

pub use get_instance_status::{GetInstanceStatus, GetInstanceStatusUseCase};
pub use list_instances::{ListInstances, ListInstancesUseCase};
pub use load_config::{LoadConfig, LoadConfigUseCase};
pub use restart_instance::{RestartInstance, RestartInstanceUseCase};
pub use start_instance::{StartInstance, StartInstanceUseCase};
pub use stop_instance::{StopInstance, StopInstanceUseCase};

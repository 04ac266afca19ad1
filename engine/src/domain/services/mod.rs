pub mod config_parsing_service;
pub mod instance_lifecycle_service;
pub mod instance_watching_service;
pub mod log_routing_service;
pub mod memory_monitoring_service;
pub mod supervision_service;

pub use config_parsing_service::ConfigParsingService;
pub use instance_lifecycle_service::InstanceLifecycleService;
pub use instance_watching_service::{InstanceWatchingService, SupervisorEvent};
pub use log_routing_service::LogRoutingService;
pub use memory_monitoring_service::MemoryMonitoringService;
pub use supervision_service::SupervisionService;

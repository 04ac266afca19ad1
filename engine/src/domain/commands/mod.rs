pub mod load_config;
pub mod restart_instance;
pub mod start_instance;
pub mod stop_instance;

pub use load_config::{FailedApp, LoadConfigCommand, LoadConfigResponse};
pub use restart_instance::{RestartInstanceCommand, RestartInstanceResponse};
pub use start_instance::{StartInstanceCommand, StartInstanceResponse};
pub use stop_instance::{StopInstanceCommand, StopInstanceResponse};

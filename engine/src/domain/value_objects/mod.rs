pub mod exec_mode;
pub mod instance_id;
pub mod instance_state;
pub mod log_config;
pub mod process_exit;
pub mod restart_policy;

pub use exec_mode::ExecMode;
pub use instance_id::InstanceId;
pub use instance_state::InstanceState;
pub use log_config::LogConfig;
pub use process_exit::ProcessExit;
pub use restart_policy::RestartPolicy;

pub mod commands;
pub mod constants;
pub mod entities;
pub mod error;
pub mod ports;
pub mod queries;
pub mod services;
pub mod use_cases;
pub mod value_objects;

pub use entities::{ProcessInstance, ProcessSpec, ProcessSpecBuilder};
pub use error::{DomainError, Result};
pub use value_objects::{
    ExecMode, InstanceId, InstanceState, LogConfig, ProcessExit, RestartPolicy,
};

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::InstanceId;

/// Stop running instances; a stop never triggers the restart policy
#[derive(Debug, Clone, Default)]
pub struct StopInstanceCommand {
    pub instance_id: Option<InstanceId>,
    pub name: Option<String>,
}

impl StopInstanceCommand {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            instance_id: None,
            name: Some(name.into()),
        }
    }

    pub fn by_id(id: InstanceId) -> Self {
        Self {
            instance_id: Some(id),
            name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopInstanceResponse {
    pub stopped: Vec<String>,
}

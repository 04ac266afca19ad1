use serde::{Deserialize, Serialize};

use crate::domain::value_objects::InstanceId;

/// Stop-then-start instances, resetting their restart counter
#[derive(Debug, Clone, Default)]
pub struct RestartInstanceCommand {
    pub instance_id: Option<InstanceId>,
    pub name: Option<String>,
}

impl RestartInstanceCommand {
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
pub struct RestartInstanceResponse {
    pub restarted: Vec<String>,
}

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::InstanceId;

/// Start stopped or crashed instances, clearing their failure record
#[derive(Debug, Clone, Default)]
pub struct StartInstanceCommand {
    pub instance_id: Option<InstanceId>,
    pub name: Option<String>,
}

impl StartInstanceCommand {
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
pub struct StartInstanceResponse {
    pub started: Vec<String>,
}

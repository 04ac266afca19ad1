use serde::{Deserialize, Serialize};

use crate::domain::queries::InstanceStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListInstancesResponse {
    pub instances: Vec<InstanceStatus>,
}

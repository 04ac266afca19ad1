use crate::domain::value_objects::InstanceId;

/// Fetch status for one name's instances or one instance by ID
#[derive(Debug, Clone, Default)]
pub struct GetInstanceStatusQuery {
    pub instance_id: Option<InstanceId>,
    pub name: Option<String>,
}

impl GetInstanceStatusQuery {
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

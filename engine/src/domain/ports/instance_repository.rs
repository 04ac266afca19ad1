use async_trait::async_trait;

use crate::domain::entities::ProcessInstance;
use crate::domain::error::{DomainError, Result};
use crate::domain::value_objects::InstanceId;

/// Driven port for instance storage
#[async_trait]
pub trait InstanceRepository: Send + Sync {
    /// Save an instance (insert or update)
    async fn save(&self, instance: ProcessInstance) -> Result<()>;

    /// Find an instance by its ID
    async fn find_by_id(&self, id: &InstanceId) -> Result<Option<ProcessInstance>>;

    /// Find all instances belonging to a spec name, ordered by index
    async fn find_by_name(&self, name: &str) -> Result<Vec<ProcessInstance>>;

    /// All instances, ordered by spec name then index
    async fn find_all(&self) -> Result<Vec<ProcessInstance>>;

    /// Remove an instance
    async fn delete(&self, id: &InstanceId) -> Result<()>;

    /// Whether any instance of the given spec name exists
    async fn exists_by_name(&self, name: &str) -> Result<bool>;

    /// Resolve a command target given exactly one of ID or name
    async fn find_targets(
        &self,
        id: Option<&InstanceId>,
        name: Option<&str>,
    ) -> Result<Vec<ProcessInstance>> {
        match (id, name) {
            (Some(id), None) => match self.find_by_id(id).await? {
                Some(instance) => Ok(vec![instance]),
                None => Err(DomainError::ProcessNotFound(id.to_string())),
            },
            (None, Some(name)) => {
                let instances = self.find_by_name(name).await?;
                if instances.is_empty() {
                    Err(DomainError::ProcessNotFound(name.to_string()))
                } else {
                    Ok(instances)
                }
            }
            (Some(_), Some(_)) => Err(DomainError::InvalidCommand(
                "specify either an instance ID or a name, not both".to_string(),
            )),
            (None, None) => Err(DomainError::InvalidCommand(
                "an instance ID or a name is required".to_string(),
            )),
        }
    }
}

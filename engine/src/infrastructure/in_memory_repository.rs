use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::ProcessInstance;
use crate::domain::error::Result;
use crate::domain::ports::InstanceRepository;
use crate::domain::value_objects::InstanceId;

/// In-memory instance store; the supervisor's source of truth for runtime
/// state. Instances are cloned out, callers save mutated copies back.
pub struct InMemoryInstanceRepository {
    instances: Arc<RwLock<HashMap<InstanceId, ProcessInstance>>>,
}

impl InMemoryInstanceRepository {
    pub fn new() -> Self {
        Self {
            instances: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryInstanceRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InstanceRepository for InMemoryInstanceRepository {
    async fn save(&self, instance: ProcessInstance) -> Result<()> {
        let mut instances = self.instances.write().await;
        debug!(
            instance = %instance.label(),
            state = %instance.state(),
            "saving instance"
        );
        instances.insert(instance.id(), instance);
        Ok(())
    }

    async fn find_by_id(&self, id: &InstanceId) -> Result<Option<ProcessInstance>> {
        let instances = self.instances.read().await;
        Ok(instances.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<ProcessInstance>> {
        let instances = self.instances.read().await;
        let mut matching: Vec<ProcessInstance> = instances
            .values()
            .filter(|i| i.spec().name() == name)
            .cloned()
            .collect();
        matching.sort_by_key(|i| i.instance_index());
        Ok(matching)
    }

    async fn find_all(&self) -> Result<Vec<ProcessInstance>> {
        let instances = self.instances.read().await;
        let mut all: Vec<ProcessInstance> = instances.values().cloned().collect();
        all.sort_by(|a, b| {
            (a.spec().name(), a.instance_index()).cmp(&(b.spec().name(), b.instance_index()))
        });
        Ok(all)
    }

    async fn delete(&self, id: &InstanceId) -> Result<()> {
        let mut instances = self.instances.write().await;
        if instances.remove(id).is_some() {
            debug!(instance_id = %id, "deleted instance");
        }
        Ok(())
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool> {
        let instances = self.instances.read().await;
        Ok(instances.values().any(|i| i.spec().name() == name))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc as StdArc;

    use super::*;
    use crate::domain::entities::ProcessSpec;

    fn instance_of(name: &str, index: u32, instances: u32) -> ProcessInstance {
        let spec = StdArc::new(
            ProcessSpec::builder(name, "/bin/true")
                .instances(instances)
                .build()
                .unwrap(),
        );
        ProcessInstance::new(spec, index)
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = InMemoryInstanceRepository::new();
        let instance = instance_of("worker", 0, 1);
        let id = instance.id();

        repo.save(instance).await.unwrap();
        let found = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.id(), id);
        assert!(repo.exists_by_name("worker").await.unwrap());
        assert!(!repo.exists_by_name("other").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_name_ordered() {
        let repo = InMemoryInstanceRepository::new();
        repo.save(instance_of("api", 1, 3)).await.unwrap();
        repo.save(instance_of("api", 0, 3)).await.unwrap();
        repo.save(instance_of("api", 2, 3)).await.unwrap();
        repo.save(instance_of("other", 0, 1)).await.unwrap();

        let found = repo.find_by_name("api").await.unwrap();
        assert_eq!(found.len(), 3);
        let indices: Vec<u32> = found.iter().map(|i| i.instance_index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryInstanceRepository::new();
        let instance = instance_of("worker", 0, 1);
        let id = instance.id();
        repo.save(instance).await.unwrap();
        repo.delete(&id).await.unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_targets_by_name() {
        let repo = InMemoryInstanceRepository::new();
        repo.save(instance_of("api", 0, 2)).await.unwrap();
        repo.save(instance_of("api", 1, 2)).await.unwrap();

        let targets = repo.find_targets(None, Some("api")).await.unwrap();
        assert_eq!(targets.len(), 2);

        let missing = repo.find_targets(None, Some("ghost")).await;
        assert!(missing.is_err());
    }
}

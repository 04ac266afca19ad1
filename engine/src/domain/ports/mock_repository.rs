use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::entities::ProcessInstance;
use crate::domain::error::Result;
use crate::domain::ports::InstanceRepository;
use crate::domain::value_objects::InstanceId;

/// Simple in-memory repository double for unit tests
#[derive(Default)]
pub struct MockRepository {
    instances: Mutex<HashMap<InstanceId, ProcessInstance>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InstanceRepository for MockRepository {
    async fn save(&self, instance: ProcessInstance) -> Result<()> {
        let mut instances = self.instances.lock().unwrap();
        instances.insert(instance.id(), instance);
        Ok(())
    }

    async fn find_by_id(&self, id: &InstanceId) -> Result<Option<ProcessInstance>> {
        let instances = self.instances.lock().unwrap();
        Ok(instances.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<ProcessInstance>> {
        let instances = self.instances.lock().unwrap();
        let mut matching: Vec<ProcessInstance> = instances
            .values()
            .filter(|i| i.spec().name() == name)
            .cloned()
            .collect();
        matching.sort_by_key(|i| i.instance_index());
        Ok(matching)
    }

    async fn find_all(&self) -> Result<Vec<ProcessInstance>> {
        let instances = self.instances.lock().unwrap();
        let mut all: Vec<ProcessInstance> = instances.values().cloned().collect();
        all.sort_by(|a, b| {
            (a.spec().name(), a.instance_index()).cmp(&(b.spec().name(), b.instance_index()))
        });
        Ok(all)
    }

    async fn delete(&self, id: &InstanceId) -> Result<()> {
        let mut instances = self.instances.lock().unwrap();
        instances.remove(id);
        Ok(())
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool> {
        let instances = self.instances.lock().unwrap();
        Ok(instances.values().any(|i| i.spec().name() == name))
    }
}

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::Result;
use crate::domain::ports::InstanceRepository;
use crate::domain::queries::{InstanceStatus, ListInstancesResponse};

#[async_trait]
pub trait ListInstances: Send + Sync {
    async fn execute(&self) -> Result<ListInstancesResponse>;
}

pub struct ListInstancesUseCase {
    repository: Arc<dyn InstanceRepository>,
}

impl ListInstancesUseCase {
    pub fn new(repository: Arc<dyn InstanceRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ListInstances for ListInstancesUseCase {
    async fn execute(&self) -> Result<ListInstancesResponse> {
        let instances = self.repository.find_all().await?;
        Ok(ListInstancesResponse {
            instances: instances.iter().map(InstanceStatus::from).collect(),
        })
    }
}

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::Result;
use crate::domain::ports::InstanceRepository;
use crate::domain::queries::{GetInstanceStatusQuery, InstanceStatus};

#[async_trait]
pub trait GetInstanceStatus: Send + Sync {
    async fn execute(&self, query: GetInstanceStatusQuery) -> Result<Vec<InstanceStatus>>;
}

pub struct GetInstanceStatusUseCase {
    repository: Arc<dyn InstanceRepository>,
}

impl GetInstanceStatusUseCase {
    pub fn new(repository: Arc<dyn InstanceRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl GetInstanceStatus for GetInstanceStatusUseCase {
    async fn execute(&self, query: GetInstanceStatusQuery) -> Result<Vec<InstanceStatus>> {
        let targets = self
            .repository
            .find_targets(query.instance_id.as_ref(), query.name.as_deref())
            .await?;
        Ok(targets.iter().map(InstanceStatus::from).collect())
    }
}

pub mod get_instance_status;
pub mod instance_status;
pub mod list_instances;

pub use get_instance_status::GetInstanceStatusQuery;
pub use instance_status::InstanceStatus;
pub use list_instances::ListInstancesResponse;

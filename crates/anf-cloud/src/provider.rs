//! NetApp provider trait definition

use crate::error::Result;
use crate::model::{
    AccountSpec, CapacityPoolSpec, ResourceInfo, ResourceState, SnapshotPolicySpec, VolumeSpec,
};
use async_trait::async_trait;

/// Control-plane operations the provisioning and cleanup sequences consume
///
/// Every call is a single remote request (plus whatever long-running
/// operation tracking the implementation needs before it can answer).
/// Implementations report a missing target as an error for which
/// [`CloudError::is_missing`](crate::CloudError::is_missing) holds.
#[async_trait]
pub trait NetAppProvider: Send + Sync {
    /// Returns the provider name (e.g., "azure")
    fn name(&self) -> &str;

    /// Generic lookup of any ARM resource
    async fn get_resource_by_id(
        &self,
        resource_id: &str,
        api_version: &str,
    ) -> Result<serde_json::Value>;

    async fn create_account(&self, account: &AccountSpec) -> Result<ResourceInfo>;

    async fn create_capacity_pool(&self, pool: &CapacityPoolSpec) -> Result<ResourceInfo>;

    async fn create_snapshot_policy(&self, policy: &SnapshotPolicySpec) -> Result<ResourceInfo>;

    async fn create_volume(&self, volume: &VolumeSpec) -> Result<ResourceInfo>;

    /// Current state of a NetApp resource by ID
    async fn resource_state(&self, resource_id: &str) -> Result<ResourceState>;

    /// Current state of the data protection replication of a volume
    async fn replication_state(&self, volume_id: &str) -> Result<ResourceState>;

    /// Remove the data protection replication from a volume
    async fn delete_volume_replication(&self, volume_id: &str) -> Result<()>;

    async fn delete_volume(&self, volume_id: &str) -> Result<()>;

    async fn delete_capacity_pool(&self, pool_id: &str) -> Result<()>;

    async fn delete_account(&self, account_id: &str) -> Result<()>;
}

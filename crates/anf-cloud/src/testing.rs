//! In-memory provider used by the unit tests

use crate::error::{CloudError, Result, VOLUME_REPLICATION_MISSING};
use crate::model::{
    AccountSpec, CapacityPoolSpec, ResourceIds, ResourceInfo, ResourceState, SnapshotPolicySpec,
    VolumeSpec,
};
use crate::provider::NetAppProvider;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";

#[derive(Default)]
struct Inner {
    calls: Vec<String>,
    states: HashMap<String, ResourceState>,
    replications: HashSet<String>,
    polls: HashMap<String, u32>,
    ready_after: HashMap<String, u32>,
    lingering: HashSet<String>,
    failing: HashSet<&'static str>,
    subnet_missing: bool,
    volume_never_ready: bool,
    replication_missing_via_operation: bool,
}

#[derive(Default)]
pub struct MockProvider {
    inner: Mutex<Inner>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the named operation fail with a server error
    pub fn fail(&self, op: &'static str) {
        self.inner.lock().unwrap().failing.insert(op);
    }

    pub fn subnet_missing(&self) {
        self.inner.lock().unwrap().subnet_missing = true;
    }

    pub fn volume_never_ready(&self) {
        self.inner.lock().unwrap().volume_never_ready = true;
    }

    /// A missing replication is reported as a failed long-running operation
    pub fn replication_missing_via_operation(&self) {
        self.inner.lock().unwrap().replication_missing_via_operation = true;
    }

    pub fn set_state(&self, id: &str, state: ResourceState) {
        self.inner
            .lock()
            .unwrap()
            .states
            .insert(id.to_string(), state);
    }

    /// Resource reports Ready on the `n`th state check
    pub fn ready_after(&self, id: &str, n: u32) {
        self.inner
            .lock()
            .unwrap()
            .ready_after
            .insert(id.to_string(), n);
    }

    /// Deleting the resource succeeds but it never disappears
    pub fn linger(&self, id: &str) {
        self.inner
            .lock()
            .unwrap()
            .lingering
            .insert(id.to_string());
    }

    pub fn add_replication(&self, volume_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .replications
            .insert(volume_id.to_string());
    }

    pub fn poll_count(&self, id: &str) -> u32 {
        self.inner
            .lock()
            .unwrap()
            .polls
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.inner.lock().unwrap().states.contains_key(id)
    }

    /// Operation names in call order
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Only the create/delete calls, in order
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("create_") || c.starts_with("delete_"))
            .collect()
    }

    fn enter(&self, op: &'static str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(op.to_string());
        if inner.failing.contains(op) {
            return Err(CloudError::Api {
                status: 500,
                code: "InternalServerError".to_string(),
                message: format!("{} failed", op),
            });
        }
        Ok(())
    }

    fn created(&self, id: String, name: &str, state: ResourceState) -> ResourceInfo {
        self.inner.lock().unwrap().states.insert(id.clone(), state);
        ResourceInfo {
            id,
            name: name.to_string(),
            provisioning_state: Some("Succeeded".to_string()),
        }
    }

    fn remove(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.lingering.contains(id) {
            return Ok(());
        }
        match inner.states.remove(id) {
            Some(_) => Ok(()),
            None => Err(CloudError::ResourceNotFound(id.to_string())),
        }
    }
}

fn ids(resource_group: &str, account: &str, pool: &str, policy: &str, volume: &str) -> ResourceIds {
    ResourceIds::from_names(SUBSCRIPTION, resource_group, account, pool, policy, volume)
}

#[async_trait]
impl NetAppProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_resource_by_id(
        &self,
        resource_id: &str,
        _api_version: &str,
    ) -> Result<serde_json::Value> {
        self.enter("get_resource_by_id")?;
        if self.inner.lock().unwrap().subnet_missing {
            return Err(CloudError::ResourceNotFound(resource_id.to_string()));
        }
        Ok(serde_json::json!({ "id": resource_id }))
    }

    async fn create_account(&self, account: &AccountSpec) -> Result<ResourceInfo> {
        self.enter("create_account")?;
        let id = ids(&account.resource_group, &account.name, "", "", "").account_id;
        Ok(self.created(id, &account.name, ResourceState::Ready))
    }

    async fn create_capacity_pool(&self, pool: &CapacityPoolSpec) -> Result<ResourceInfo> {
        self.enter("create_capacity_pool")?;
        let id = ids(&pool.resource_group, &pool.account_name, &pool.name, "", "").pool_id;
        Ok(self.created(id, &pool.name, ResourceState::Ready))
    }

    async fn create_snapshot_policy(&self, policy: &SnapshotPolicySpec) -> Result<ResourceInfo> {
        self.enter("create_snapshot_policy")?;
        let id = ids(
            &policy.resource_group,
            &policy.account_name,
            "",
            &policy.name,
            "",
        )
        .snapshot_policy_id;
        Ok(self.created(id, &policy.name, ResourceState::Ready))
    }

    async fn create_volume(&self, volume: &VolumeSpec) -> Result<ResourceInfo> {
        self.enter("create_volume")?;
        let id = ids(
            &volume.resource_group,
            &volume.account_name,
            &volume.pool_name,
            "",
            &volume.name,
        )
        .volume_id;
        let state = if self.inner.lock().unwrap().volume_never_ready {
            ResourceState::Provisioning("Creating".to_string())
        } else {
            ResourceState::Ready
        };
        Ok(self.created(id, &volume.name, state))
    }

    async fn resource_state(&self, resource_id: &str) -> Result<ResourceState> {
        let mut inner = self.inner.lock().unwrap();
        let polls = inner.polls.entry(resource_id.to_string()).or_insert(0);
        *polls += 1;
        let polls = *polls;
        if inner.ready_after.get(resource_id) == Some(&polls) {
            inner
                .states
                .insert(resource_id.to_string(), ResourceState::Ready);
        }
        Ok(inner
            .states
            .get(resource_id)
            .cloned()
            .unwrap_or(ResourceState::Absent))
    }

    async fn replication_state(&self, volume_id: &str) -> Result<ResourceState> {
        if self.inner.lock().unwrap().replications.contains(volume_id) {
            Ok(ResourceState::Ready)
        } else {
            Ok(ResourceState::Absent)
        }
    }

    async fn delete_volume_replication(&self, volume_id: &str) -> Result<()> {
        self.enter("delete_volume_replication")?;
        let mut inner = self.inner.lock().unwrap();
        if inner.replications.remove(volume_id) {
            Ok(())
        } else if inner.replication_missing_via_operation {
            Err(CloudError::OperationFailed {
                code: VOLUME_REPLICATION_MISSING.to_string(),
                message: "Volume has no replication".to_string(),
            })
        } else {
            Err(CloudError::Api {
                status: 400,
                code: VOLUME_REPLICATION_MISSING.to_string(),
                message: "Volume has no replication".to_string(),
            })
        }
    }

    async fn delete_volume(&self, volume_id: &str) -> Result<()> {
        self.enter("delete_volume")?;
        self.remove(volume_id)
    }

    async fn delete_capacity_pool(&self, pool_id: &str) -> Result<()> {
        self.enter("delete_capacity_pool")?;
        self.remove(pool_id)
    }

    async fn delete_account(&self, account_id: &str) -> Result<()> {
        self.enter("delete_account")?;
        self.remove(account_id)
    }
}

//! Azure NetApp Files provider implementation

use crate::client::ArmClient;
use crate::error::AzureError;
use anf_cloud::{
    AccountSpec, CapacityPoolSpec, CloudError, NetAppProvider, ResourceInfo, ResourceState,
    SnapshotPolicySpec, SnapshotSchedules, Tags, VolumeSpec,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Microsoft.NetApp API version used for every NetApp call
pub const NETAPP_API_VERSION: &str = "2020-06-01";

/// NetApp control plane over ARM
pub struct AzureNetAppProvider {
    client: ArmClient,
    subscription_id: String,
}

impl AzureNetAppProvider {
    pub fn new(client: ArmClient, subscription_id: impl Into<String>) -> Self {
        Self {
            client,
            subscription_id: subscription_id.into(),
        }
    }

    async fn put_resource<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> anf_cloud::Result<ResourceInfo> {
        let value = self.client.put(path, NETAPP_API_VERSION, body).await?;
        resource_info(value, path)
    }

    async fn delete_resource(&self, resource_id: &str) -> anf_cloud::Result<()> {
        self.client.delete(resource_id, NETAPP_API_VERSION).await?;
        Ok(())
    }
}

#[async_trait]
impl NetAppProvider for AzureNetAppProvider {
    fn name(&self) -> &str {
        "azure"
    }

    async fn get_resource_by_id(
        &self,
        resource_id: &str,
        api_version: &str,
    ) -> anf_cloud::Result<serde_json::Value> {
        Ok(self.client.get(resource_id, api_version).await?)
    }

    async fn create_account(&self, account: &AccountSpec) -> anf_cloud::Result<ResourceInfo> {
        let path = account_path(&self.subscription_id, &account.resource_group, &account.name);
        let body = ArmResource {
            location: &account.location,
            tags: &account.tags,
            properties: AccountProperties {},
        };
        self.put_resource(&path, &body).await
    }

    async fn create_capacity_pool(
        &self,
        pool: &CapacityPoolSpec,
    ) -> anf_cloud::Result<ResourceInfo> {
        let path = format!(
            "{}/capacityPools/{}",
            account_path(&self.subscription_id, &pool.resource_group, &pool.account_name),
            pool.name
        );
        let body = ArmResource {
            location: &pool.location,
            tags: &pool.tags,
            properties: PoolProperties {
                service_level: pool.service_level.to_string(),
                size: pool.size_bytes,
            },
        };
        self.put_resource(&path, &body).await
    }

    async fn create_snapshot_policy(
        &self,
        policy: &SnapshotPolicySpec,
    ) -> anf_cloud::Result<ResourceInfo> {
        let path = format!(
            "{}/snapshotPolicies/{}",
            account_path(
                &self.subscription_id,
                &policy.resource_group,
                &policy.account_name
            ),
            policy.name
        );
        let body = ArmResource {
            location: &policy.location,
            tags: &policy.tags,
            properties: SnapshotPolicyProperties::new(&policy.schedules, policy.enabled),
        };
        self.put_resource(&path, &body).await
    }

    async fn create_volume(&self, volume: &VolumeSpec) -> anf_cloud::Result<ResourceInfo> {
        let path = format!(
            "{}/capacityPools/{}/volumes/{}",
            account_path(
                &self.subscription_id,
                &volume.resource_group,
                &volume.account_name
            ),
            volume.pool_name,
            volume.name
        );
        let body = ArmResource {
            location: &volume.location,
            tags: &volume.tags,
            properties: VolumeProperties::from(volume),
        };
        self.put_resource(&path, &body).await
    }

    async fn resource_state(&self, resource_id: &str) -> anf_cloud::Result<ResourceState> {
        match self.client.get(resource_id, NETAPP_API_VERSION).await {
            Ok(value) => Ok(ResourceState::from_provisioning_state(
                provisioning_state(&value).as_deref(),
            )),
            Err(e) => absent_or(e),
        }
    }

    async fn replication_state(&self, volume_id: &str) -> anf_cloud::Result<ResourceState> {
        let path = format!("{}/replicationStatus", volume_id.trim_end_matches('/'));
        match self.client.get(&path, NETAPP_API_VERSION).await {
            Ok(_) => Ok(ResourceState::Ready),
            Err(e) => replication_absent_or(e),
        }
    }

    async fn delete_volume_replication(&self, volume_id: &str) -> anf_cloud::Result<()> {
        self.client
            .post_action(volume_id, "deleteReplication", NETAPP_API_VERSION)
            .await?;
        Ok(())
    }

    async fn delete_volume(&self, volume_id: &str) -> anf_cloud::Result<()> {
        self.delete_resource(volume_id).await
    }

    async fn delete_capacity_pool(&self, pool_id: &str) -> anf_cloud::Result<()> {
        self.delete_resource(pool_id).await
    }

    async fn delete_account(&self, account_id: &str) -> anf_cloud::Result<()> {
        self.delete_resource(account_id).await
    }
}

fn account_path(subscription_id: &str, resource_group: &str, account: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.NetApp/netAppAccounts/{}",
        subscription_id, resource_group, account
    )
}

/// A missing target reads as `Absent`; anything else is a lookup error
fn absent_or(e: AzureError) -> anf_cloud::Result<ResourceState> {
    let e = CloudError::from(e);
    if e.is_missing() {
        Ok(ResourceState::Absent)
    } else {
        Err(e)
    }
}

/// `replicationStatus` answers a volume without replication with a client error
/// (often 400 with a code other than `VolumeReplicationMissing`), so every 4xx
/// except throttling reads as `Absent`
fn replication_absent_or(e: AzureError) -> anf_cloud::Result<ResourceState> {
    match &e {
        AzureError::Api { status, .. } if (400..500).contains(status) && *status != 429 => {
            Ok(ResourceState::Absent)
        }
        _ => absent_or(e),
    }
}

fn provisioning_state(value: &serde_json::Value) -> Option<String> {
    value
        .get("properties")
        .and_then(|p| p.get("provisioningState"))
        .and_then(|s| s.as_str())
        .map(str::to_string)
}

fn resource_info(value: serde_json::Value, path: &str) -> anf_cloud::Result<ResourceInfo> {
    let provisioning_state = provisioning_state(&value);
    let resource: ArmResourceResponse = serde_json::from_value(value)?;

    if resource.id.is_empty() {
        return Err(
            AzureError::UnexpectedResponse(format!("no resource id returned for {}", path)).into(),
        );
    }

    Ok(ResourceInfo {
        id: resource.id,
        name: resource.name,
        provisioning_state,
    })
}

// ============================================================================
// ARM API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ArmResource<'a, P> {
    location: &'a str,
    #[serde(skip_serializing_if = "no_tags")]
    tags: &'a Tags,
    properties: P,
}

fn no_tags(tags: &&Tags) -> bool {
    tags.is_empty()
}

#[derive(Debug, Deserialize)]
struct ArmResourceResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Serialize)]
struct AccountProperties {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PoolProperties {
    service_level: String,
    size: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotPolicyProperties<'a> {
    hourly_schedule: HourlyBody,
    daily_schedule: DailyBody,
    weekly_schedule: WeeklyBody<'a>,
    monthly_schedule: MonthlyBody<'a>,
    enabled: bool,
}

impl<'a> SnapshotPolicyProperties<'a> {
    fn new(schedules: &'a SnapshotSchedules, enabled: bool) -> Self {
        Self {
            hourly_schedule: HourlyBody {
                minute: schedules.hourly.minute,
                snapshots_to_keep: schedules.hourly.snapshots_to_keep,
            },
            daily_schedule: DailyBody {
                hour: schedules.daily.hour,
                minute: schedules.daily.minute,
                snapshots_to_keep: schedules.daily.snapshots_to_keep,
            },
            weekly_schedule: WeeklyBody {
                day: &schedules.weekly.day,
                hour: schedules.weekly.hour,
                minute: schedules.weekly.minute,
                snapshots_to_keep: schedules.weekly.snapshots_to_keep,
            },
            monthly_schedule: MonthlyBody {
                days_of_month: &schedules.monthly.days_of_month,
                hour: schedules.monthly.hour,
                minute: schedules.monthly.minute,
                snapshots_to_keep: schedules.monthly.snapshots_to_keep,
            },
            enabled,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HourlyBody {
    minute: u32,
    snapshots_to_keep: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DailyBody {
    hour: u32,
    minute: u32,
    snapshots_to_keep: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WeeklyBody<'a> {
    day: &'a str,
    hour: u32,
    minute: u32,
    snapshots_to_keep: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MonthlyBody<'a> {
    days_of_month: &'a str,
    hour: u32,
    minute: u32,
    snapshots_to_keep: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VolumeProperties<'a> {
    creation_token: &'a str,
    service_level: String,
    usage_threshold: u64,
    protocol_types: &'a [String],
    subnet_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_protection: Option<DataProtection<'a>>,
}

impl<'a> From<&'a VolumeSpec> for VolumeProperties<'a> {
    fn from(volume: &'a VolumeSpec) -> Self {
        Self {
            creation_token: &volume.creation_token,
            service_level: volume.service_level.to_string(),
            usage_threshold: volume.usage_threshold_bytes,
            protocol_types: &volume.protocol_types,
            subnet_id: &volume.subnet_id,
            data_protection: volume.snapshot_policy_id.as_deref().map(|id| DataProtection {
                snapshot: SnapshotProtection {
                    snapshot_policy_id: id,
                },
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct DataProtection<'a> {
    snapshot: SnapshotProtection<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotProtection<'a> {
    snapshot_policy_id: &'a str,
}

//! Azure NetApp Files resource model

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 4 TiB, the smallest capacity pool ANF accepts
pub const MIN_CAPACITY_POOL_SIZE_BYTES: u64 = 4_398_046_511_104;

/// 100 GiB, the smallest volume ANF accepts
pub const MIN_VOLUME_SIZE_BYTES: u64 = 107_374_182_400;

/// Resource tags
pub type Tags = BTreeMap<String, String>;

/// Kind of resource a step operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Subnet,
    Account,
    CapacityPool,
    SnapshotPolicy,
    Volume,
    VolumeReplication,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Subnet => write!(f, "subnet"),
            ResourceKind::Account => write!(f, "account"),
            ResourceKind::CapacityPool => write!(f, "capacity pool"),
            ResourceKind::SnapshotPolicy => write!(f, "snapshot policy"),
            ResourceKind::Volume => write!(f, "volume"),
            ResourceKind::VolumeReplication => write!(f, "data replication"),
        }
    }
}

/// Capacity pool / volume performance tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceLevel {
    #[default]
    Standard,
    Premium,
    Ultra,
}

impl std::fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceLevel::Standard => write!(f, "Standard"),
            ServiceLevel::Premium => write!(f, "Premium"),
            ServiceLevel::Ultra => write!(f, "Ultra"),
        }
    }
}

/// Identity of a resource returned by the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    /// ARM resource ID
    pub id: String,

    /// Resource name
    pub name: String,

    /// `provisioningState` reported at creation time, if any
    pub provisioning_state: Option<String>,
}

/// Result of probing a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// The resource does not exist
    Absent,
    /// The resource exists but is not usable yet
    Provisioning(String),
    /// The resource exists and finished provisioning
    Ready,
    /// Provisioning ended in `Failed` or `Canceled`; it will not become ready
    Failed(String),
}

impl ResourceState {
    /// Map an ARM `provisioningState` to a resource state
    pub fn from_provisioning_state(state: Option<&str>) -> Self {
        match state {
            None => ResourceState::Ready,
            Some(s) if s.eq_ignore_ascii_case("Succeeded") => ResourceState::Ready,
            Some(s) if s.eq_ignore_ascii_case("Failed") || s.eq_ignore_ascii_case("Canceled") => {
                ResourceState::Failed(s.to_string())
            }
            Some(s) => ResourceState::Provisioning(s.to_string()),
        }
    }
}

/// NetApp account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSpec {
    pub resource_group: String,
    pub name: String,
    pub location: String,
    pub tags: Tags,
}

/// Capacity pool inside an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityPoolSpec {
    pub resource_group: String,
    pub account_name: String,
    pub name: String,
    pub location: String,
    pub service_level: ServiceLevel,
    pub size_bytes: u64,
    pub tags: Tags,
}

/// Hourly rule: every hour at `minute`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlySchedule {
    pub minute: u32,
    pub snapshots_to_keep: u32,
}

/// Daily rule: every day at `hour:minute`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySchedule {
    pub hour: u32,
    pub minute: u32,
    pub snapshots_to_keep: u32,
}

/// Weekly rule: every `day` at `hour:minute`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub day: String,
    pub hour: u32,
    pub minute: u32,
    pub snapshots_to_keep: u32,
}

/// Monthly rule: on each of `days_of_month` (comma separated) at `hour:minute`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySchedule {
    pub days_of_month: String,
    pub hour: u32,
    pub minute: u32,
    pub snapshots_to_keep: u32,
}

/// The four rules of a snapshot policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSchedules {
    pub hourly: HourlySchedule,
    pub daily: DailySchedule,
    pub weekly: WeeklySchedule,
    pub monthly: MonthlySchedule,
}

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

impl Default for SnapshotSchedules {
    fn default() -> Self {
        Self {
            hourly: HourlySchedule {
                minute: 50,
                snapshots_to_keep: 5,
            },
            daily: DailySchedule {
                hour: 22,
                minute: 0,
                snapshots_to_keep: 5,
            },
            weekly: WeeklySchedule {
                day: "Friday".to_string(),
                hour: 23,
                minute: 0,
                snapshots_to_keep: 5,
            },
            monthly: MonthlySchedule {
                days_of_month: "1,15,25".to_string(),
                hour: 8,
                minute: 0,
                snapshots_to_keep: 5,
            },
        }
    }
}

fn canonical_weekday(day: &str) -> Option<&'static str> {
    WEEKDAYS
        .iter()
        .copied()
        .find(|d| d.eq_ignore_ascii_case(day.trim()))
}

impl SnapshotSchedules {
    /// Validated copy with the weekday spelled the way ANF expects (`" friday "` → `"Friday"`)
    /// and the monthly day list without blanks (`"1, 15"` → `"1,15"`)
    pub fn normalized(&self) -> Result<Self> {
        self.validate()?;

        let mut schedules = self.clone();
        if let Some(day) = canonical_weekday(&self.weekly.day) {
            schedules.weekly.day = day.to_string();
        }
        schedules.monthly.days_of_month = self
            .monthly
            .days_of_month
            .split(',')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(",");
        Ok(schedules)
    }

    /// Check every rule is within the ranges ANF accepts
    pub fn validate(&self) -> Result<()> {
        check_minute("hourly", self.hourly.minute)?;
        check_keep("hourly", self.hourly.snapshots_to_keep)?;

        check_time("daily", self.daily.hour, self.daily.minute)?;
        check_keep("daily", self.daily.snapshots_to_keep)?;

        if canonical_weekday(&self.weekly.day).is_none() {
            return Err(CloudError::InvalidConfig(format!(
                "weekly schedule day '{}' is not a weekday name",
                self.weekly.day
            )));
        }
        check_time("weekly", self.weekly.hour, self.weekly.minute)?;
        check_keep("weekly", self.weekly.snapshots_to_keep)?;

        let days: Vec<&str> = self
            .monthly
            .days_of_month
            .split(',')
            .map(str::trim)
            .collect();
        for day in days {
            match day.parse::<u32>() {
                Ok(1..=31) => {}
                _ => {
                    return Err(CloudError::InvalidConfig(format!(
                        "monthly schedule day '{}' must be between 1 and 31",
                        day
                    )));
                }
            }
        }
        check_time("monthly", self.monthly.hour, self.monthly.minute)?;
        check_keep("monthly", self.monthly.snapshots_to_keep)?;

        Ok(())
    }
}

fn check_minute(rule: &str, minute: u32) -> Result<()> {
    if minute > 59 {
        return Err(CloudError::InvalidConfig(format!(
            "{} schedule minute {} must be between 0 and 59",
            rule, minute
        )));
    }
    Ok(())
}

fn check_time(rule: &str, hour: u32, minute: u32) -> Result<()> {
    if hour > 23 {
        return Err(CloudError::InvalidConfig(format!(
            "{} schedule hour {} must be between 0 and 23",
            rule, hour
        )));
    }
    check_minute(rule, minute)
}

fn check_keep(rule: &str, keep: u32) -> Result<()> {
    if keep == 0 {
        return Err(CloudError::InvalidConfig(format!(
            "{} schedule must keep at least one snapshot",
            rule
        )));
    }
    Ok(())
}

/// Snapshot policy inside an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPolicySpec {
    pub resource_group: String,
    pub account_name: String,
    pub name: String,
    pub location: String,
    pub schedules: SnapshotSchedules,
    pub enabled: bool,
    pub tags: Tags,
}

/// Volume inside a capacity pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeSpec {
    pub resource_group: String,
    pub account_name: String,
    pub pool_name: String,
    pub name: String,
    pub location: String,
    pub service_level: ServiceLevel,
    /// Export path, unique per subscription and region
    pub creation_token: String,
    pub protocol_types: Vec<String>,
    pub usage_threshold_bytes: u64,
    pub subnet_id: String,
    /// Attached snapshot policy, filled in once the policy exists
    pub snapshot_policy_id: Option<String>,
    pub tags: Tags,
}

/// Subnet resource ID for a virtual network
pub fn subnet_id(subscription_id: &str, resource_group: &str, vnet: &str, subnet: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/virtualNetworks/{}/subnets/{}",
        subscription_id, resource_group, vnet, subnet
    )
}

/// ARM IDs of the NetApp resources, derived from their names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIds {
    pub account_id: String,
    pub pool_id: String,
    pub snapshot_policy_id: String,
    pub volume_id: String,
}

impl ResourceIds {
    pub fn from_names(
        subscription_id: &str,
        resource_group: &str,
        account: &str,
        pool: &str,
        snapshot_policy: &str,
        volume: &str,
    ) -> Self {
        let account_id = format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.NetApp/netAppAccounts/{}",
            subscription_id, resource_group, account
        );
        let pool_id = format!("{}/capacityPools/{}", account_id, pool);
        let snapshot_policy_id = format!("{}/snapshotPolicies/{}", account_id, snapshot_policy);
        let volume_id = format!("{}/volumes/{}", pool_id, volume);

        Self {
            account_id,
            pool_id,
            snapshot_policy_id,
            volume_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedules_are_valid() {
        let schedules = SnapshotSchedules::default();
        assert!(schedules.validate().is_ok());
        assert_eq!(schedules.hourly.minute, 50);
        assert_eq!(schedules.weekly.day, "Friday");
        assert_eq!(schedules.monthly.days_of_month, "1,15,25");
    }

    #[test]
    fn test_schedule_validation() {
        let mut schedules = SnapshotSchedules::default();
        schedules.hourly.minute = 60;
        assert!(schedules.validate().is_err());

        let mut schedules = SnapshotSchedules::default();
        schedules.daily.hour = 24;
        assert!(schedules.validate().is_err());

        let mut schedules = SnapshotSchedules::default();
        schedules.weekly.day = "Funday".to_string();
        assert!(schedules.validate().is_err());

        let mut schedules = SnapshotSchedules::default();
        schedules.monthly.days_of_month = "1,32".to_string();
        assert!(schedules.validate().is_err());

        let mut schedules = SnapshotSchedules::default();
        schedules.monthly.snapshots_to_keep = 0;
        assert!(schedules.validate().is_err());
    }

    #[test]
    fn test_normalized_schedules() {
        let mut schedules = SnapshotSchedules::default();
        schedules.weekly.day = " friday ".to_string();
        schedules.monthly.days_of_month = "1, 15 ,20".to_string();

        let normalized = schedules.normalized().unwrap();
        assert_eq!(normalized.weekly.day, "Friday");
        assert_eq!(normalized.monthly.days_of_month, "1,15,20");
        assert_eq!(normalized.hourly, schedules.hourly);

        schedules.weekly.day = "Fryday".to_string();
        assert!(schedules.normalized().is_err());
    }

    #[test]
    fn test_provisioning_state_mapping() {
        assert_eq!(ResourceState::from_provisioning_state(None), ResourceState::Ready);
        assert_eq!(
            ResourceState::from_provisioning_state(Some("Succeeded")),
            ResourceState::Ready
        );
        assert_eq!(
            ResourceState::from_provisioning_state(Some("Creating")),
            ResourceState::Provisioning("Creating".to_string())
        );
        assert_eq!(
            ResourceState::from_provisioning_state(Some("Failed")),
            ResourceState::Failed("Failed".to_string())
        );
        assert_eq!(
            ResourceState::from_provisioning_state(Some("canceled")),
            ResourceState::Failed("canceled".to_string())
        );
    }

    #[test]
    fn test_resource_ids_from_names() {
        let ids = ResourceIds::from_names("sub", "anf-rg", "acct", "Pool01", "policy", "vol");
        assert_eq!(
            ids.account_id,
            "/subscriptions/sub/resourceGroups/anf-rg/providers/Microsoft.NetApp/netAppAccounts/acct"
        );
        assert!(ids.pool_id.ends_with("/netAppAccounts/acct/capacityPools/Pool01"));
        assert!(ids.volume_id.ends_with("/capacityPools/Pool01/volumes/vol"));
        assert!(ids.snapshot_policy_id.ends_with("/snapshotPolicies/policy"));
    }

    #[test]
    fn test_subnet_id() {
        assert_eq!(
            subnet_id("sub", "anf-rg", "westus-vnet", "anf-sn"),
            "/subscriptions/sub/resourceGroups/anf-rg/providers/Microsoft.Network/virtualNetworks/westus-vnet/subnets/anf-sn"
        );
    }
}

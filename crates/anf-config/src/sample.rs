//! サンプルの実行設定（YAML ファイル + デフォルト値）

use crate::error::{ConfigError, Result};
use crate::naming;
use anf_cloud::{
    AccountSpec, CapacityPoolSpec, MIN_CAPACITY_POOL_SIZE_BYTES, MIN_VOLUME_SIZE_BYTES,
    PollConfig, ProvisionContext, ResourceIds, ServiceLevel, SnapshotPolicySpec,
    SnapshotSchedules, Tags, VolumeSpec, subnet_id,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level sample configuration
///
/// Every field has a default, so an empty file (or no file) reproduces the
/// stock sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SampleConfig {
    pub location: String,
    pub resource_group: String,
    pub network: NetworkConfig,
    pub account: AccountConfig,
    pub capacity_pool: CapacityPoolConfig,
    pub volume: VolumeConfig,
    pub snapshot_policy: SnapshotPolicyConfig,
    pub tags: Tags,
    pub polling: PollingConfig,
    /// 成功時にリソースを削除する
    pub cleanup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    pub resource_group: String,
    pub vnet: String,
    pub subnet: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccountConfig {
    /// 省略時はランダム生成
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapacityPoolConfig {
    pub name: String,
    pub service_level: ServiceLevel,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VolumeConfig {
    /// 省略時は `NFSv3-Vol-<account>-<pool>`
    pub name: Option<String>,
    pub size_bytes: u64,
    pub protocol_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotPolicyConfig {
    pub name: String,
    pub enabled: bool,
    pub schedules: SnapshotSchedules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollingConfig {
    pub interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            location: "westus".to_string(),
            resource_group: "anf-rg".to_string(),
            network: NetworkConfig::default(),
            account: AccountConfig::default(),
            capacity_pool: CapacityPoolConfig::default(),
            volume: VolumeConfig::default(),
            snapshot_policy: SnapshotPolicyConfig::default(),
            tags: Tags::from([
                (
                    "Author".to_string(),
                    "ANF Rust Snapshot Policy SDK Sample".to_string(),
                ),
                ("Service".to_string(), "Azure Netapp Files".to_string()),
            ]),
            polling: PollingConfig::default(),
            cleanup: true,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            resource_group: "anf-rg".to_string(),
            vnet: "westus-vnet".to_string(),
            subnet: "anf-sn".to_string(),
        }
    }
}

impl Default for CapacityPoolConfig {
    fn default() -> Self {
        Self {
            name: "Pool01".to_string(),
            service_level: ServiceLevel::Standard,
            size_bytes: MIN_CAPACITY_POOL_SIZE_BYTES,
        }
    }
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            name: None,
            size_bytes: MIN_VOLUME_SIZE_BYTES,
            protocol_types: vec!["NFSv3".to_string()],
        }
    }
}

impl Default for SnapshotPolicyConfig {
    fn default() -> Self {
        Self {
            name: "snapshotpolicy01".to_string(),
            enabled: true,
            schedules: SnapshotSchedules::default(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        let poll = PollConfig::default();
        Self {
            interval_secs: poll.interval.as_secs(),
            max_attempts: poll.max_attempts,
        }
    }
}

impl PollingConfig {
    pub fn to_poll_config(&self) -> PollConfig {
        PollConfig::new(Duration::from_secs(self.interval_secs), self.max_attempts)
    }
}

impl SampleConfig {
    /// YAML ファイルから読み込む
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::ConfigFileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content).map_err(|source| ConfigError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded sample config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // 空ファイルはデフォルト扱い
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// リモート呼び出し前に検出できる誤りをチェック
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("location", &self.location),
            ("resource_group", &self.resource_group),
            ("network.resource_group", &self.network.resource_group),
            ("network.vnet", &self.network.vnet),
            ("network.subnet", &self.network.subnet),
            ("capacity_pool.name", &self.capacity_pool.name),
            ("snapshot_policy.name", &self.snapshot_policy.name),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
            }
        }
        if let Some(name) = &self.account.name {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("account.name must not be empty".into()));
            }
        }
        if let Some(name) = &self.volume.name {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("volume.name must not be empty".into()));
            }
        }

        if self.capacity_pool.size_bytes < MIN_CAPACITY_POOL_SIZE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "capacity_pool.size_bytes must be at least {} (4 TiB)",
                MIN_CAPACITY_POOL_SIZE_BYTES
            )));
        }
        if self.volume.size_bytes < MIN_VOLUME_SIZE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "volume.size_bytes must be at least {} (100 GiB)",
                MIN_VOLUME_SIZE_BYTES
            )));
        }
        if self.volume.size_bytes > self.capacity_pool.size_bytes {
            return Err(ConfigError::Invalid(
                "volume.size_bytes must not exceed capacity_pool.size_bytes".into(),
            ));
        }
        if self.volume.protocol_types.is_empty() {
            return Err(ConfigError::Invalid(
                "volume.protocol_types must list at least one protocol".into(),
            ));
        }
        if self.polling.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "polling.max_attempts must be at least 1".into(),
            ));
        }

        self.snapshot_policy.schedules.validate()?;
        Ok(())
    }

    /// アカウント名（未指定ならランダム生成）
    pub fn account_name(&self) -> String {
        self.account
            .name
            .clone()
            .unwrap_or_else(naming::generate_account_name)
    }

    pub fn volume_name(&self, account_name: &str) -> String {
        self.volume
            .name
            .clone()
            .unwrap_or_else(|| naming::default_volume_name(account_name, &self.capacity_pool.name))
    }

    pub fn subnet_id(&self, subscription_id: &str) -> String {
        subnet_id(
            subscription_id,
            &self.network.resource_group,
            &self.network.vnet,
            &self.network.subnet,
        )
    }

    /// 名前から ARM リソース ID を組み立てる（手動クリーンアップ用）
    pub fn resource_ids(&self, subscription_id: &str, account_name: &str) -> ResourceIds {
        ResourceIds::from_names(
            subscription_id,
            &self.resource_group,
            account_name,
            &self.capacity_pool.name,
            &self.snapshot_policy.name,
            &self.volume_name(account_name),
        )
    }

    /// 検証して、プロビジョニングに必要な値をすべて解決する
    pub fn resolve(&self, subscription_id: &str, account_name: &str) -> Result<ProvisionContext> {
        self.validate()?;
        if account_name.trim().is_empty() {
            return Err(ConfigError::Invalid("account name must not be empty".into()));
        }

        let subnet_id = self.subnet_id(subscription_id);
        let volume_name = self.volume_name(account_name);

        Ok(ProvisionContext {
            subnet_id: subnet_id.clone(),
            account: AccountSpec {
                resource_group: self.resource_group.clone(),
                name: account_name.to_string(),
                location: self.location.clone(),
                tags: self.tags.clone(),
            },
            pool: CapacityPoolSpec {
                resource_group: self.resource_group.clone(),
                account_name: account_name.to_string(),
                name: self.capacity_pool.name.clone(),
                location: self.location.clone(),
                service_level: self.capacity_pool.service_level,
                size_bytes: self.capacity_pool.size_bytes,
                tags: self.tags.clone(),
            },
            snapshot_policy: SnapshotPolicySpec {
                resource_group: self.resource_group.clone(),
                account_name: account_name.to_string(),
                name: self.snapshot_policy.name.clone(),
                location: self.location.clone(),
                schedules: self.snapshot_policy.schedules.normalized()?,
                enabled: self.snapshot_policy.enabled,
                tags: self.tags.clone(),
            },
            volume: VolumeSpec {
                resource_group: self.resource_group.clone(),
                account_name: account_name.to_string(),
                pool_name: self.capacity_pool.name.clone(),
                name: volume_name.clone(),
                location: self.location.clone(),
                service_level: self.capacity_pool.service_level,
                creation_token: volume_name,
                protocol_types: self.volume.protocol_types.clone(),
                usage_threshold_bytes: self.volume.size_bytes,
                subnet_id,
                snapshot_policy_id: None,
                tags: self.tags.clone(),
            },
            poll: self.polling.to_poll_config(),
            cleanup: self.cleanup,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_match_stock_sample() {
        let config = SampleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.location, "westus");
        assert_eq!(config.capacity_pool.name, "Pool01");
        assert_eq!(config.capacity_pool.size_bytes, 4_398_046_511_104);
        assert_eq!(config.volume.size_bytes, 107_374_182_400);
        assert_eq!(config.volume.protocol_types, vec!["NFSv3".to_string()]);
        assert_eq!(config.polling.interval_secs, 60);
        assert_eq!(config.polling.max_attempts, 50);
        assert!(config.cleanup);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = SampleConfig::from_yaml(
            r#"
location: eastus
account:
  name: my-account
snapshot_policy:
  schedules:
    hourly: { minute: 10, snapshots_to_keep: 2 }
    daily: { hour: 1, minute: 0, snapshots_to_keep: 3 }
    weekly: { day: Monday, hour: 2, minute: 0, snapshots_to_keep: 4 }
    monthly: { days_of_month: "1", hour: 3, minute: 0, snapshots_to_keep: 5 }
polling:
  interval_secs: 5
"#,
        )
        .unwrap();

        assert_eq!(config.location, "eastus");
        assert_eq!(config.account.name.as_deref(), Some("my-account"));
        assert_eq!(config.snapshot_policy.name, "snapshotpolicy01");
        assert_eq!(config.snapshot_policy.schedules.hourly.minute, 10);
        assert_eq!(config.polling.interval_secs, 5);
        assert_eq!(config.polling.max_attempts, 50);
        assert_eq!(config.network.vnet, "westus-vnet");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = SampleConfig::from_yaml("  \n").unwrap();
        assert_eq!(config.resource_group, "anf-rg");
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(SampleConfig::from_yaml("locaton: eastus").is_err());
    }

    #[test]
    fn test_validate_sizes() {
        let mut config = SampleConfig::default();
        config.capacity_pool.size_bytes = 1024;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SampleConfig::default();
        config.volume.size_bytes = 1024;
        assert!(config.validate().is_err());

        let mut config = SampleConfig::default();
        config.volume.size_bytes = config.capacity_pool.size_bytes + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_schedules() {
        let mut config = SampleConfig::default();
        config.snapshot_policy.schedules.daily.hour = 25;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("daily"));
    }

    #[test]
    fn test_resolve_normalizes_weekday() {
        let mut config = SampleConfig::default();
        config.snapshot_policy.schedules.weekly.day = "SUNDAY".to_string();
        let ctx = config.resolve("sub", "acct").unwrap();
        assert_eq!(ctx.snapshot_policy.schedules.weekly.day, "Sunday");
    }

    #[test]
    fn test_validate_empty_names() {
        let mut config = SampleConfig::default();
        config.network.subnet = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = SampleConfig::default();
        config.volume.name = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_threads_names() {
        let config = SampleConfig::default();
        let ctx = config.resolve("sub", "anf-quiet-lake-0042").unwrap();

        assert_eq!(
            ctx.subnet_id,
            "/subscriptions/sub/resourceGroups/anf-rg/providers/Microsoft.Network/virtualNetworks/westus-vnet/subnets/anf-sn"
        );
        assert_eq!(ctx.account.name, "anf-quiet-lake-0042");
        assert_eq!(ctx.pool.account_name, "anf-quiet-lake-0042");
        assert_eq!(ctx.volume.name, "NFSv3-Vol-anf-quiet-lake-0042-Pool01");
        assert_eq!(ctx.volume.creation_token, ctx.volume.name);
        assert_eq!(ctx.volume.subnet_id, ctx.subnet_id);
        assert!(ctx.volume.snapshot_policy_id.is_none());
        assert_eq!(ctx.poll, PollConfig::default());
        assert!(ctx.cleanup);
    }

    #[test]
    fn test_resource_ids_use_derived_volume_name() {
        let config = SampleConfig::default();
        let ids = config.resource_ids("sub", "acct");
        assert!(ids.volume_id.ends_with("/capacityPools/Pool01/volumes/NFSv3-Vol-acct-Pool01"));
    }

    #[test]
    fn test_generated_account_name() {
        let config = SampleConfig::default();
        assert!(config.account_name().starts_with("anf-"));

        let mut config = SampleConfig::default();
        config.account.name = Some("fixed".to_string());
        assert_eq!(config.account_name(), "fixed");
    }

    #[test]
    fn test_from_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "cleanup: false\n").unwrap();

        let config = SampleConfig::from_path(&path).unwrap();
        assert!(!config.cleanup);

        let missing = SampleConfig::from_path(&temp_dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(ConfigError::ConfigFileNotFound(_))));
    }

    #[test]
    fn test_yaml_roundtrip_of_defaults() {
        let config = SampleConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed = SampleConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.snapshot_policy.schedules, config.snapshot_policy.schedules);
        assert_eq!(parsed.tags, config.tags);
    }
}

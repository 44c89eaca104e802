//! リソース待機モジュール（固定間隔ポーリング）
//!
//! リソースの準備完了、または削除完了を固定間隔・固定回数で待機します。

use crate::error::{CloudError, Result};
use crate::model::ResourceState;
use crate::provider::NetAppProvider;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// ポーリング設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// 試行間隔
    pub interval: Duration,

    /// 最大試行回数
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            max_attempts: 50,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// 全試行にかかる最大待機時間
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// 何をポーリングするか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTarget {
    /// リソース本体
    Resource,
    /// ボリュームのレプリケーション
    Replication,
}

/// リソースが Ready になるまで待機
///
/// # Returns
/// * `Ok(())` - リソースが準備完了
/// * `Err(CloudError::ProvisioningFailed)` - Failed / Canceled に到達
/// * `Err(CloudError::Timeout)` - 最大試行回数を超過
pub async fn wait_for_resource(
    provider: &dyn NetAppProvider,
    resource_id: &str,
    config: &PollConfig,
) -> Result<()> {
    poll_until(
        resource_id,
        config,
        || provider.resource_state(resource_id),
        |state| *state == ResourceState::Ready,
    )
    .await
}

/// リソースが存在しなくなるまで待機
pub async fn wait_for_no_resource(
    provider: &dyn NetAppProvider,
    resource_id: &str,
    target: PollTarget,
    config: &PollConfig,
) -> Result<()> {
    match target {
        PollTarget::Resource => {
            poll_until(
                resource_id,
                config,
                || provider.resource_state(resource_id),
                |state| *state == ResourceState::Absent,
            )
            .await
        }
        PollTarget::Replication => {
            poll_until(
                resource_id,
                config,
                || provider.replication_state(resource_id),
                |state| *state == ResourceState::Absent,
            )
            .await
        }
    }
}

async fn poll_until<F, Fut>(
    resource_id: &str,
    config: &PollConfig,
    mut check: F,
    done: impl Fn(&ResourceState) -> bool,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ResourceState>>,
{
    for attempt in 0..config.max_attempts {
        match check().await {
            Ok(state) if done(&state) => {
                tracing::debug!(resource_id, attempt, "poll finished: {:?}", state);
                return Ok(());
            }
            // Failed / Canceled からは戻らないので待たずに終了
            Ok(ResourceState::Failed(state)) => {
                return Err(CloudError::ProvisioningFailed {
                    resource_id: resource_id.to_string(),
                    state,
                });
            }
            Ok(state) => {
                tracing::debug!(resource_id, attempt, "still waiting: {:?}", state);
            }
            Err(e) => {
                // 一時的なエラーは「まだ」として扱う
                tracing::debug!(resource_id, attempt, "state check failed: {}", e);
            }
        }

        // 最後の試行でなければ待機
        if attempt + 1 < config.max_attempts {
            sleep(config.interval).await;
        }
    }

    Err(CloudError::Timeout(format!(
        "{} did not reach the expected state after {} attempts",
        resource_id, config.max_attempts
    )))
}

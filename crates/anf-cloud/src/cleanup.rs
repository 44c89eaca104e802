//! Cleanup sequence: replication, volume, capacity pool, account

use crate::action::{Action, ActionType, Journal, ProgressSink, RunReport};
use crate::error::RunError;
use crate::model::{ResourceIds, ResourceKind};
use crate::provider::NetAppProvider;
use crate::provision::ProvisionedResources;
use crate::waiter::{PollConfig, PollTarget, wait_for_no_resource};

/// Resources to remove, by ARM ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupTargets {
    pub account_id: String,
    pub pool_id: String,
    pub volume_id: String,
}

impl CleanupTargets {
    /// Targets from a provisioning run; `None` unless account, pool and volume all exist
    pub fn from_provisioned(resources: &ProvisionedResources) -> Option<Self> {
        Some(Self {
            account_id: resources.account_id.clone()?,
            pool_id: resources.pool_id.clone()?,
            volume_id: resources.volume_id.clone()?,
        })
    }
}

impl From<ResourceIds> for CleanupTargets {
    fn from(ids: ResourceIds) -> Self {
        Self {
            account_id: ids.account_id,
            pool_id: ids.pool_id,
            volume_id: ids.volume_id,
        }
    }
}

/// Delete everything in reverse creation order, stopping at the first failure
///
/// A missing replication counts as removed. The account deletion is not
/// polled.
pub async fn cleanup(
    provider: &dyn NetAppProvider,
    targets: &CleanupTargets,
    poll: &PollConfig,
    report: &mut RunReport,
    sink: &mut dyn ProgressSink,
) -> Result<(), RunError> {
    let mut journal = Journal::new(report, sink);

    // レプリケーション削除（存在しない場合は成功扱い）
    let action = Action::new(
        ActionType::Delete,
        ResourceKind::VolumeReplication,
        &targets.volume_id,
    );
    journal.start(&action);
    match provider.delete_volume_replication(&targets.volume_id).await {
        Ok(()) => {}
        Err(e) if e.is_missing() => {
            tracing::debug!(volume_id = %targets.volume_id, "no replication to remove: {}", e);
        }
        Err(source) => {
            let err = RunError::Delete {
                kind: ResourceKind::VolumeReplication,
                source,
            };
            journal.fail(&action, &err);
            return Err(err);
        }
    }
    settle(
        provider,
        &mut journal,
        &action,
        PollTarget::Replication,
        poll,
    )
    .await?;

    let action = Action::new(ActionType::Delete, ResourceKind::Volume, &targets.volume_id);
    journal.start(&action);
    delete(&mut journal, &action, provider.delete_volume(&targets.volume_id)).await?;
    settle(provider, &mut journal, &action, PollTarget::Resource, poll).await?;

    let action = Action::new(
        ActionType::Delete,
        ResourceKind::CapacityPool,
        &targets.pool_id,
    );
    journal.start(&action);
    delete(
        &mut journal,
        &action,
        provider.delete_capacity_pool(&targets.pool_id),
    )
    .await?;
    settle(provider, &mut journal, &action, PollTarget::Resource, poll).await?;

    let action = Action::new(ActionType::Delete, ResourceKind::Account, &targets.account_id);
    journal.start(&action);
    delete(
        &mut journal,
        &action,
        provider.delete_account(&targets.account_id),
    )
    .await?;
    journal.succeed(&action, Some(&targets.account_id));

    Ok(())
}

async fn delete(
    journal: &mut Journal<'_>,
    action: &Action,
    request: impl std::future::Future<Output = crate::Result<()>>,
) -> Result<(), RunError> {
    request.await.map_err(|source| {
        let err = RunError::Delete {
            kind: action.kind,
            source,
        };
        journal.fail(action, &err);
        err
    })
}

/// Poll until the deleted target is gone, then record the step as done
async fn settle(
    provider: &dyn NetAppProvider,
    journal: &mut Journal<'_>,
    action: &Action,
    target: PollTarget,
    poll: &PollConfig,
) -> Result<(), RunError> {
    if let Err(source) = wait_for_no_resource(provider, &action.target, target, poll).await {
        let err = RunError::Poll {
            kind: action.kind,
            source,
        };
        journal.fail(action, &err);
        return Err(err);
    }
    journal.succeed(action, Some(&action.target));
    Ok(())
}

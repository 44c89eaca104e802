//! Provisioning sequence: subnet check, account, pool, snapshot policy, volume

use crate::action::{Action, ActionType, Journal, ProgressSink, RunReport};
use crate::error::RunError;
use crate::model::{AccountSpec, CapacityPoolSpec, ResourceKind, SnapshotPolicySpec, VolumeSpec};
use crate::provider::NetAppProvider;
use crate::waiter::{PollConfig, wait_for_resource};

/// API version used for the subnet lookup
pub const VIRTUAL_NETWORKS_API_VERSION: &str = "2019-09-01";

/// Everything the sequence needs, resolved up front
#[derive(Debug, Clone)]
pub struct ProvisionContext {
    pub subnet_id: String,
    pub account: AccountSpec,
    pub pool: CapacityPoolSpec,
    pub snapshot_policy: SnapshotPolicySpec,
    /// Volume request; its snapshot policy reference is set from the created policy
    pub volume: VolumeSpec,
    pub poll: PollConfig,
    /// Clean up once provisioning succeeds
    pub cleanup: bool,
}

/// IDs produced by the completed steps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionedResources {
    pub account_id: Option<String>,
    pub pool_id: Option<String>,
    pub snapshot_policy_id: Option<String>,
    pub volume_id: Option<String>,
}

impl ProvisionedResources {
    /// IDs of the resources that exist, in creation order
    pub fn created(&self) -> Vec<(ResourceKind, &str)> {
        [
            (ResourceKind::Account, &self.account_id),
            (ResourceKind::CapacityPool, &self.pool_id),
            (ResourceKind::SnapshotPolicy, &self.snapshot_policy_id),
            (ResourceKind::Volume, &self.volume_id),
        ]
        .into_iter()
        .filter_map(|(kind, id)| id.as_deref().map(|id| (kind, id)))
        .collect()
    }
}

/// What the provisioning phase hands to [`RunGuard`](crate::RunGuard)
#[derive(Debug)]
pub struct RunOutcome {
    pub resources: ProvisionedResources,
    pub result: Result<(), RunError>,
    /// Set only when every step succeeded and cleanup is enabled
    pub should_clean_up: bool,
    pub report: RunReport,
}

/// Run the provisioning steps in order, stopping at the first failure
pub async fn provision(
    provider: &dyn NetAppProvider,
    ctx: &ProvisionContext,
    sink: &mut dyn ProgressSink,
) -> RunOutcome {
    let mut report = RunReport::new();
    let mut resources = ProvisionedResources::default();

    let result = {
        let mut journal = Journal::new(&mut report, sink);
        run_steps(provider, ctx, &mut resources, &mut journal).await
    };

    let should_clean_up = result.is_ok() && ctx.cleanup;
    RunOutcome {
        resources,
        result,
        should_clean_up,
        report,
    }
}

async fn run_steps(
    provider: &dyn NetAppProvider,
    ctx: &ProvisionContext,
    resources: &mut ProvisionedResources,
    journal: &mut Journal<'_>,
) -> Result<(), RunError> {
    check_subnet(provider, &ctx.subnet_id, journal).await?;

    let action = Action::new(ActionType::Create, ResourceKind::Account, &ctx.account.name);
    let account = create(journal, &action, provider.create_account(&ctx.account)).await?;
    resources.account_id = Some(account);

    let action = Action::new(ActionType::Create, ResourceKind::CapacityPool, &ctx.pool.name);
    let pool = create(journal, &action, provider.create_capacity_pool(&ctx.pool)).await?;
    resources.pool_id = Some(pool);

    let action = Action::new(
        ActionType::Create,
        ResourceKind::SnapshotPolicy,
        &ctx.snapshot_policy.name,
    );
    let policy = create(
        journal,
        &action,
        provider.create_snapshot_policy(&ctx.snapshot_policy),
    )
    .await?;
    resources.snapshot_policy_id = Some(policy.clone());

    let mut volume_spec = ctx.volume.clone();
    volume_spec.snapshot_policy_id = Some(policy);
    let action = Action::new(ActionType::Create, ResourceKind::Volume, &volume_spec.name);
    let volume = create(journal, &action, provider.create_volume(&volume_spec)).await?;
    resources.volume_id = Some(volume.clone());

    let action = Action::new(ActionType::Wait, ResourceKind::Volume, &volume_spec.name);
    journal.start(&action);
    if let Err(source) = wait_for_resource(provider, &volume, &ctx.poll).await {
        let err = RunError::NotReady {
            kind: ResourceKind::Volume,
            source,
        };
        journal.fail(&action, &err);
        return Err(err);
    }
    journal.succeed(&action, Some(&volume));

    // スナップショットポリシーの更新は未実装
    let action = Action::new(
        ActionType::Update,
        ResourceKind::SnapshotPolicy,
        &ctx.snapshot_policy.name,
    );
    journal.skip(&action, "updating a snapshot policy is not implemented");

    Ok(())
}

async fn check_subnet(
    provider: &dyn NetAppProvider,
    subnet_id: &str,
    journal: &mut Journal<'_>,
) -> Result<(), RunError> {
    let action = Action::new(ActionType::Check, ResourceKind::Subnet, subnet_id);
    journal.start(&action);

    match provider
        .get_resource_by_id(subnet_id, VIRTUAL_NETWORKS_API_VERSION)
        .await
    {
        Ok(_) => {
            journal.succeed(&action, Some(subnet_id));
            Ok(())
        }
        Err(source) => {
            let err = if source.is_missing() {
                RunError::SubnetNotFound {
                    subnet_id: subnet_id.to_string(),
                    source,
                }
            } else {
                RunError::SubnetLookup {
                    subnet_id: subnet_id.to_string(),
                    source,
                }
            };
            journal.fail(&action, &err);
            Err(err)
        }
    }
}

async fn create(
    journal: &mut Journal<'_>,
    action: &Action,
    request: impl std::future::Future<Output = crate::Result<crate::ResourceInfo>>,
) -> Result<String, RunError> {
    journal.start(action);

    let created = request.await.and_then(|info| {
        if info.id.is_empty() {
            Err(crate::CloudError::Http(format!(
                "control plane returned an empty id for {}",
                info.name
            )))
        } else {
            Ok(info)
        }
    });

    match created {
        Ok(info) => {
            journal.succeed(action, Some(&info.id));
            Ok(info.id)
        }
        Err(source) => {
            let err = RunError::Create {
                kind: action.kind,
                source,
            };
            journal.fail(action, &err);
            Err(err)
        }
    }
}

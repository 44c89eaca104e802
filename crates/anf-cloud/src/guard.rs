//! Finalizer that runs after the provisioning phase, whatever its result

use crate::action::{ProgressSink, RunReport};
use crate::cleanup::{CleanupTargets, cleanup};
use crate::error::RunError;
use crate::provider::NetAppProvider;
use crate::provision::{ProvisionedResources, RunOutcome};
use crate::waiter::PollConfig;

/// What happened to the cleanup phase
#[derive(Debug)]
pub enum CleanupStatus {
    /// The cleanup flag was not set
    Skipped,
    Completed,
    Failed(RunError),
}

/// Final state of a run
#[derive(Debug)]
pub struct RunSummary {
    pub resources: ProvisionedResources,
    pub provision_error: Option<RunError>,
    pub cleanup: CleanupStatus,
    pub report: RunReport,
}

impl RunSummary {
    /// 0 on full success, 1 when either phase failed
    pub fn exit_code(&self) -> i32 {
        let cleanup_failed = matches!(self.cleanup, CleanupStatus::Failed(_));
        if self.provision_error.is_some() || cleanup_failed {
            1
        } else {
            0
        }
    }

    /// Resources left behind for manual removal
    pub fn leftovers(&self) -> Vec<&str> {
        match self.cleanup {
            CleanupStatus::Completed => Vec::new(),
            _ => self
                .resources
                .created()
                .into_iter()
                .map(|(_, id)| id)
                .collect(),
        }
    }
}

/// Holds the provisioning outcome until the caller finishes the run
///
/// `finish` must be called exactly once; it is the only place cleanup runs.
#[must_use = "call finish() to run cleanup and get the exit code"]
pub struct RunGuard {
    outcome: RunOutcome,
}

impl RunGuard {
    pub fn new(outcome: RunOutcome) -> Self {
        Self { outcome }
    }

    pub fn should_clean_up(&self) -> bool {
        self.outcome.should_clean_up
    }

    pub fn outcome(&self) -> &RunOutcome {
        &self.outcome
    }

    /// Run cleanup if the flag is set and summarize the run
    pub async fn finish(
        self,
        provider: &dyn NetAppProvider,
        poll: &PollConfig,
        sink: &mut dyn ProgressSink,
    ) -> RunSummary {
        let RunOutcome {
            resources,
            result,
            should_clean_up,
            mut report,
        } = self.outcome;

        let targets = if should_clean_up {
            CleanupTargets::from_provisioned(&resources)
        } else {
            None
        };

        let cleanup = match targets {
            Some(targets) => {
                tracing::info!("performing clean up");
                match cleanup(provider, &targets, poll, &mut report, sink).await {
                    Ok(()) => CleanupStatus::Completed,
                    Err(e) => CleanupStatus::Failed(e),
                }
            }
            None => CleanupStatus::Skipped,
        };

        RunSummary {
            resources,
            provision_error: result.err(),
            cleanup,
            report,
        }
    }
}

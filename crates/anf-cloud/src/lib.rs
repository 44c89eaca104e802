//! Azure NetApp Files provisioning core
//!
//! This crate holds the resource model, the provider abstraction and the
//! two sequences the sample runs against it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   anf-sample                     │
//! │                 (run / cleanup)                  │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                  anf-cloud                       │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │           Provider Abstraction            │   │
//! │  │  trait NetAppProvider { ... }             │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐ ┌──────────────┐ ┌─────────┐ │
//! │  │  provision   │ │   cleanup    │ │ waiter  │ │
//! │  └──────────────┘ └──────────────┘ └─────────┘ │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │ anf-cloud-    │
//! │   azure       │
//! └───────────────┘
//! ```
//!
//! The provisioning phase stops at the first failing step and only then
//! decides whether cleanup may run; [`RunGuard::finish`] performs it.

pub mod action;
pub mod cleanup;
pub mod error;
pub mod guard;
pub mod model;
pub mod provider;
pub mod provision;
pub mod waiter;

#[cfg(test)]
mod testing;

// Re-exports
pub use action::{Action, ActionResult, ActionType, NoProgress, Progress, ProgressSink, RunReport};
pub use cleanup::{CleanupTargets, cleanup};
pub use error::{CloudError, Result, RunError, VOLUME_REPLICATION_MISSING};
pub use guard::{CleanupStatus, RunGuard, RunSummary};
pub use model::{
    AccountSpec, CapacityPoolSpec, DailySchedule, HourlySchedule, MIN_CAPACITY_POOL_SIZE_BYTES,
    MIN_VOLUME_SIZE_BYTES, MonthlySchedule, ResourceIds, ResourceInfo, ResourceKind,
    ResourceState, ServiceLevel, SnapshotPolicySpec, SnapshotSchedules, Tags, VolumeSpec,
    WeeklySchedule, subnet_id,
};
pub use provider::NetAppProvider;
pub use provision::{
    ProvisionContext, ProvisionedResources, RunOutcome, VIRTUAL_NETWORKS_API_VERSION, provision,
};
pub use waiter::{PollConfig, PollTarget, wait_for_no_resource, wait_for_resource};

//! Steps of a run and their outcome

use crate::model::ResourceKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single step of the provisioning or cleanup sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Type of action to perform
    pub action_type: ActionType,

    /// Kind of resource the step touches
    pub kind: ResourceKind,

    /// Resource name or ID the step targets
    pub target: String,
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Check that a precondition resource exists
    Check,
    /// Create a new resource
    Create,
    /// Wait for a resource to become ready
    Wait,
    /// Update an existing resource
    Update,
    /// Delete a resource
    Delete,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Check => write!(f, "check"),
            ActionType::Create => write!(f, "create"),
            ActionType::Wait => write!(f, "wait"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
        }
    }
}

impl Action {
    pub fn new(action_type: ActionType, kind: ResourceKind, target: impl Into<String>) -> Self {
        Self {
            action_type,
            kind,
            target: target.into(),
        }
    }

    /// Console line announcing the step
    pub fn description(&self) -> String {
        match self.action_type {
            ActionType::Check => format!("Checking if {} {} exists", self.kind, self.target),
            ActionType::Create => format!("Creating {} {}", self.kind, self.target),
            ActionType::Wait => format!("Waiting for {} {} to be ready", self.kind, self.target),
            ActionType::Update => format!("Updating {} {}", self.kind, self.target),
            ActionType::Delete => format!("Removing {} {}", self.kind, self.target),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.action_type, self.kind, self.target)
    }
}

/// Progress notification emitted while a sequence runs
#[derive(Debug, Clone)]
pub enum Progress {
    Started(Action),
    Succeeded {
        action: Action,
        resource_id: Option<String>,
    },
    Failed {
        action: Action,
        error: String,
    },
    Skipped {
        action: Action,
        reason: String,
    },
}

/// Receiver of [`Progress`] events (console renderer, test recorder, ...)
pub trait ProgressSink {
    fn on_progress(&mut self, event: &Progress);
}

impl<F> ProgressSink for F
where
    F: FnMut(&Progress),
{
    fn on_progress(&mut self, event: &Progress) {
        self(event)
    }
}

/// Sink that drops every event
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _event: &Progress) {}
}

/// Result of a single action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub action: Action,

    /// ID produced or touched by the action
    pub resource_id: Option<String>,

    /// Error message if failed
    pub error: Option<String>,
}

/// Record of everything a run did
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,

    /// Successfully applied actions, in order
    pub succeeded: Vec<ActionResult>,

    /// Failed actions
    pub failed: Vec<ActionResult>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, action: Action, resource_id: Option<String>) {
        self.succeeded.push(ActionResult {
            action,
            resource_id,
            error: None,
        });
    }

    pub fn add_failure(&mut self, action: Action, error: String) {
        self.failed.push(ActionResult {
            action,
            resource_id: None,
            error: Some(error),
        });
    }

    /// Actions of the given type that succeeded, in order
    pub fn succeeded_of(&self, action_type: ActionType) -> Vec<&Action> {
        self.succeeded
            .iter()
            .map(|r| &r.action)
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Seconds elapsed since the run started
    pub fn elapsed_secs(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} created, {} deleted, {} failed",
            self.succeeded_of(ActionType::Create).len(),
            self.succeeded_of(ActionType::Delete).len(),
            self.failed.len()
        )
    }
}

/// Pairs a [`RunReport`] with the sink that renders it live
pub(crate) struct Journal<'a> {
    report: &'a mut RunReport,
    sink: &'a mut dyn ProgressSink,
}

impl<'a> Journal<'a> {
    pub(crate) fn new(report: &'a mut RunReport, sink: &'a mut dyn ProgressSink) -> Self {
        Self { report, sink }
    }

    pub(crate) fn start(&mut self, action: &Action) {
        tracing::info!(action = %action, "start");
        self.sink.on_progress(&Progress::Started(action.clone()));
    }

    pub(crate) fn succeed(&mut self, action: &Action, resource_id: Option<&str>) {
        tracing::info!(action = %action, resource_id, "done");
        let resource_id = resource_id.map(str::to_string);
        self.sink.on_progress(&Progress::Succeeded {
            action: action.clone(),
            resource_id: resource_id.clone(),
        });
        self.report.add_success(action.clone(), resource_id);
    }

    pub(crate) fn fail(&mut self, action: &Action, error: &dyn std::fmt::Display) {
        tracing::error!(action = %action, "{}", error);
        let error = error.to_string();
        self.sink.on_progress(&Progress::Failed {
            action: action.clone(),
            error: error.clone(),
        });
        self.report.add_failure(action.clone(), error);
    }

    pub(crate) fn skip(&mut self, action: &Action, reason: &str) {
        tracing::debug!(action = %action, reason, "skipped");
        self.sink.on_progress(&Progress::Skipped {
            action: action.clone(),
            reason: reason.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_description() {
        let action = Action::new(ActionType::Create, ResourceKind::CapacityPool, "Pool01");
        assert_eq!(action.description(), "Creating capacity pool Pool01");
        assert_eq!(action.to_string(), "create capacity pool Pool01");
    }

    #[test]
    fn test_report_summary() {
        let mut report = RunReport::new();
        report.add_success(
            Action::new(ActionType::Create, ResourceKind::Account, "acct"),
            Some("/acct".to_string()),
        );
        report.add_success(
            Action::new(ActionType::Delete, ResourceKind::Account, "/acct"),
            None,
        );
        assert!(report.is_success());

        report.add_failure(
            Action::new(ActionType::Create, ResourceKind::Volume, "vol"),
            "boom".to_string(),
        );
        assert!(!report.is_success());
        assert_eq!(report.to_string(), "1 created, 1 deleted, 1 failed");
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |event: &Progress| {
                if let Progress::Started(action) = event {
                    seen.push(action.target.clone());
                }
            };
            let mut report = RunReport::new();
            let mut journal = Journal::new(&mut report, &mut sink);
            journal.start(&Action::new(ActionType::Check, ResourceKind::Subnet, "sn"));
        }
        assert_eq!(seen, vec!["sn".to_string()]);
    }
}

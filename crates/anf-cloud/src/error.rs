//! Cloud provider and run error types

use crate::model::ResourceKind;
use thiserror::Error;

/// ARM error code returned when a volume has no replication to remove
pub const VOLUME_REPLICATION_MISSING: &str = "VolumeReplicationMissing";

/// Errors raised by a [`NetAppProvider`](crate::NetAppProvider)
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("API error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// A long-running operation ended in `Failed` or `Canceled`
    #[error("Operation failed {code}: {message}")]
    OperationFailed { code: String, message: String },

    #[error("{resource_id} provisioning ended in {state}")]
    ProvisioningFailed { resource_id: String, state: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Whether the error means the target does not exist (any shape ARM uses for it)
    pub fn is_missing(&self) -> bool {
        match self {
            CloudError::ResourceNotFound(_) => true,
            CloudError::Api { status, code, .. } => {
                *status == 404 || is_missing_code(code)
            }
            CloudError::OperationFailed { code, .. } => is_missing_code(code),
            _ => false,
        }
    }
}

fn is_missing_code(code: &str) -> bool {
    code == VOLUME_REPLICATION_MISSING || code == "ResourceNotFound"
}

pub type Result<T> = std::result::Result<T, CloudError>;

/// Errors that end a provisioning or cleanup phase
#[derive(Error, Debug)]
pub enum RunError {
    #[error("subnet {subnet_id} not found: {source}")]
    SubnetNotFound {
        subnet_id: String,
        #[source]
        source: CloudError,
    },

    #[error("an error occurred trying to check if {subnet_id} subnet exists: {source}")]
    SubnetLookup {
        subnet_id: String,
        #[source]
        source: CloudError,
    },

    #[error("an error occurred while creating {kind}: {source}")]
    Create {
        kind: ResourceKind,
        #[source]
        source: CloudError,
    },

    #[error("an error occurred while waiting for {kind}: {source}")]
    NotReady {
        kind: ResourceKind,
        #[source]
        source: CloudError,
    },

    #[error("an error occurred while deleting {kind}: {source}")]
    Delete {
        kind: ResourceKind,
        #[source]
        source: CloudError,
    },

    #[error("{kind} was not removed in time: {source}")]
    Poll {
        kind: ResourceKind,
        #[source]
        source: CloudError,
    },
}

impl RunError {
    /// Resource kind the failing step was working on
    pub fn kind(&self) -> ResourceKind {
        match self {
            RunError::SubnetNotFound { .. } | RunError::SubnetLookup { .. } => ResourceKind::Subnet,
            RunError::Create { kind, .. }
            | RunError::NotReady { kind, .. }
            | RunError::Delete { kind, .. }
            | RunError::Poll { kind, .. } => *kind,
        }
    }
}

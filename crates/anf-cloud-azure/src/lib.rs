//! Azure provider for the ANF snapshot policy sample
//!
//! Implements [`anf_cloud::NetAppProvider`] on top of the Azure Resource
//! Manager REST API, authenticating as a service principal.
//!
//! # Example
//!
//! ```ignore
//! use anf_cloud_azure::{ArmClient, AzureNetAppProvider, ClientSecretCredential};
//!
//! let credential = ClientSecretCredential::new(
//!     tenant_id,
//!     client_id,
//!     client_secret,
//!     "https://login.microsoftonline.com",
//!     "https://management.azure.com/",
//! );
//! let client = ArmClient::new(credential, "https://management.azure.com/");
//! let provider = AzureNetAppProvider::new(client, subscription_id);
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod provider;

pub use auth::{ClientSecretCredential, TokenProvider};
pub use client::{ArmClient, DEFAULT_RESOURCE_MANAGER_ENDPOINT, OperationPolling};
pub use error::{AzureError, Result};
pub use provider::{AzureNetAppProvider, NETAPP_API_VERSION};

//! Azure Resource Manager interaction.
//!
//! - [`cli`] - Azure CLI command execution
//! - [`credential`] - bearer token and subscription from the CLI
//! - [`arm`] - REST client with long-running-operation polling
//! - [`provider`] - [`crate::provider::Provider`] implementation

pub mod arm;
mod cli;
mod credential;
mod provider;

pub use arm::{ArmClient, PollSettings};
pub use credential::ArmCredential;
pub use provider::ArmProvider;

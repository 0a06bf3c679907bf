//! Provisions a GitHub Enterprise Server host on Azure.
//!
//! - [`config`] - constants and the immutable [`DeployConfig`]
//! - [`descriptor`] - desired-state graph of the deployment
//! - [`validate`] - well-formedness checks on the graph
//! - [`engine`] - applies the graph through a [`Provider`]
//! - [`azure`] - ARM REST implementation of [`Provider`]

pub mod azure;
pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod models;
pub mod provider;
pub mod report;
pub mod validate;

pub use config::DeployConfig;
pub use descriptor::{declare, Deployment};
pub use engine::{destroy, up, StackOutputs};
pub use error::DeployError;
pub use provider::Provider;

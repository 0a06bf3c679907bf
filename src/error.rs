//! Error types for descriptor evaluation and provider calls.

use std::path::PathBuf;
use thiserror::Error;

/// Every failure a deployment can surface.
///
/// Local errors (`MissingConfig`, `InvalidConfig`, `SshKeyRead`,
/// `InvalidDeployment`) are raised before any cloud call. Provider errors
/// carry the status, code and message returned by Azure verbatim.
#[derive(Debug, Error)]
pub enum DeployError {
    // ── Local configuration ─────────────────────────────────────────
    /// Required configuration value absent or empty.
    #[error("Missing required configuration value: {key}")]
    MissingConfig { key: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    /// SSH public key file could not be read.
    #[error("Failed to read SSH public key {}: {source}", path.display())]
    SshKeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The declared resource graph violates a well-formedness rule.
    #[error("Invalid deployment: {0}")]
    InvalidDeployment(String),

    // ── Provider ────────────────────────────────────────────────────
    /// Provider rejected the resource properties (HTTP 400/422).
    #[error("Provider validation error (HTTP {status}) {code}: {message}")]
    ProviderValidation {
        status: u16,
        code: String,
        message: String,
    },

    /// Quota, name collision, capacity and every other non-success status.
    #[error("Provider operation error (HTTP {status}) {code}: {message}")]
    ProviderOperation {
        status: u16,
        code: String,
        message: String,
    },

    /// `kind` is the ARM resource type, e.g. `Microsoft.Compute/virtualMachines`.
    #[error("Provisioning of {kind} {resource} ended in state {state}")]
    ProvisioningFailed {
        kind: String,
        resource: String,
        state: String,
    },

    #[error("Provisioning of {kind} {resource} not finished after {attempts} polls")]
    ProvisioningTimeout {
        kind: String,
        resource: String,
        attempts: u32,
    },

    /// Post-creation read failed.
    #[error("Lookup of {resource} failed: {message}")]
    Lookup { resource: String, message: String },

    // ── Transport / data ────────────────────────────────────────────
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON did not match the expected shape; `path` points at the field.
    #[error("Deserialization error at {path}: {message}")]
    Deserialization { path: String, message: String },

    #[error("Azure CLI error: {0}")]
    Cli(String),
}

impl DeployError {
    /// Map a non-success provider response onto the taxonomy.
    pub fn from_provider_status(status: u16, code: String, message: String) -> Self {
        match status {
            400 | 422 => DeployError::ProviderValidation {
                status,
                code,
                message,
            },
            _ => DeployError::ProviderOperation {
                status,
                code,
                message,
            },
        }
    }

    /// True for errors raised before any cloud call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            DeployError::MissingConfig { .. }
                | DeployError::InvalidConfig { .. }
                | DeployError::SshKeyRead { .. }
                | DeployError::InvalidDeployment(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_provider_status() {
        let err = DeployError::from_provider_status(400, "InvalidParameter".into(), "bad".into());
        assert!(matches!(err, DeployError::ProviderValidation { status: 400, .. }));

        let err = DeployError::from_provider_status(
            409,
            "DnsRecordInUse".into(),
            "label taken".into(),
        );
        assert!(matches!(err, DeployError::ProviderOperation { status: 409, .. }));
        assert_eq!(
            err.to_string(),
            "Provider operation error (HTTP 409) DnsRecordInUse: label taken"
        );
        assert!(!err.is_local());
    }

    #[test]
    fn test_is_local() {
        let err = DeployError::MissingConfig {
            key: "GHES_ADMIN_USER".into(),
        };
        assert!(err.is_local());
        assert_eq!(
            err.to_string(),
            "Missing required configuration value: GHES_ADMIN_USER"
        );
    }
}

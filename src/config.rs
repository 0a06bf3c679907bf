//! Deployment constants and the immutable [`DeployConfig`].

use crate::error::DeployError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ── Environment keys ────────────────────────────────────────────────
pub const ENV_ADMIN_USER: &str = "GHES_ADMIN_USER";
pub const ENV_SSH_PUB_KEY_PATH: &str = "GHES_SSH_PUB_KEY_PATH";
pub const ENV_NAME_PREFIX: &str = "GHES_NAME_PREFIX";
pub const ENV_LOCATION: &str = "AZURE_LOCATION";
pub const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
pub const ENV_ARM_ENDPOINT: &str = "ARM_ENDPOINT";

pub const DEFAULT_NAME_PREFIX: &str = "test-ghes";
pub const DEFAULT_LOCATION: &str = "eastus";
pub const ARM_ENDPOINT: &str = "https://management.azure.com";

// ── Host ────────────────────────────────────────────────────────────
pub const VM_SIZE: &str = "Standard_D4ds_v4";
pub const IMAGE_PUBLISHER: &str = "GitHub";
pub const IMAGE_OFFER: &str = "GitHub-Enterprise";
pub const IMAGE_SKU: &str = "GitHub-Enterprise";
pub const IMAGE_VERSION: &str = "3.4.2";
pub const DATA_DISK_SIZE_GB: u32 = 150;
pub const DATA_DISK_LUN: u8 = 2;

// ── Network ─────────────────────────────────────────────────────────
pub const VNET_ADDRESS_SPACE: &str = "10.0.0.0/16";
pub const SUBNET_NAME: &str = "default";
pub const SUBNET_PREFIX: &str = "10.0.0.0/24";

// ── Provider polling ────────────────────────────────────────────────
pub const POLL_MSEC: u64 = 5_000;
/// 30 minutes at the default interval; VM creation from a marketplace image is slow.
pub const MAX_POLL_ATTEMPTS: u32 = 360;

/// DNS label: lowercase letter first, 3..=63 chars, no trailing hyphen.
static DNS_LABEL_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_dns_label_regex() -> &'static Regex {
    DNS_LABEL_REGEX
        .get_or_init(|| Regex::new(r"^[a-z][a-z0-9-]{1,61}[a-z0-9]$").expect("Invalid Regex"))
}

/// Immutable deployment input, passed to [`crate::descriptor::declare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    /// Linux admin user; owner of the `authorized_keys` path.
    pub admin_user: String,
    pub ssh_pub_key_path: PathBuf,
    /// Prefix of every resource name and the public DNS label.
    pub name_prefix: String,
    pub location: String,
    /// ARM base URL; also the resource the bearer token is requested for.
    pub arm_endpoint: String,
    /// `None` uses the `az` CLI default subscription.
    pub subscription_id: Option<String>,
}

impl DeployConfig {
    /// Build from required values with default prefix and location.
    pub fn new(admin_user: &str, ssh_pub_key_path: impl AsRef<Path>) -> DeployConfig {
        DeployConfig {
            admin_user: admin_user.to_string(),
            ssh_pub_key_path: ssh_pub_key_path.as_ref().to_path_buf(),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            arm_endpoint: ARM_ENDPOINT.to_string(),
            subscription_id: None,
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<DeployConfig, DeployError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<DeployConfig, DeployError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| DeployError::MissingConfig {
                key: key.to_string(),
            })
        };

        let admin_user = require(ENV_ADMIN_USER)?;
        let ssh_pub_key_path = PathBuf::from(require(ENV_SSH_PUB_KEY_PATH)?);
        let name_prefix = get(ENV_NAME_PREFIX).unwrap_or_else(|| DEFAULT_NAME_PREFIX.to_string());
        let location = get(ENV_LOCATION).unwrap_or_else(|| DEFAULT_LOCATION.to_string());
        let arm_endpoint = get(ENV_ARM_ENDPOINT)
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| ARM_ENDPOINT.to_string());
        let subscription_id = get(ENV_SUBSCRIPTION_ID);

        let config = DeployConfig {
            admin_user,
            ssh_pub_key_path,
            name_prefix,
            location,
            arm_endpoint,
            subscription_id,
        };
        config.check()?;
        log::debug!(
            "config admin_user={} prefix={} location={} endpoint={} subscription={:?}",
            config.admin_user,
            config.name_prefix,
            config.location,
            config.arm_endpoint,
            config.subscription_id
        );
        Ok(config)
    }

    fn check(&self) -> Result<(), DeployError> {
        if !get_dns_label_regex().is_match(&self.name_prefix) {
            return Err(DeployError::InvalidConfig {
                key: ENV_NAME_PREFIX.to_string(),
                message: format!("'{}' is not a valid DNS label", self.name_prefix),
            });
        }
        if self.admin_user.contains(['/', ' ']) {
            return Err(DeployError::InvalidConfig {
                key: ENV_ADMIN_USER.to_string(),
                message: format!("'{}' is not a valid user name", self.admin_user),
            });
        }
        if !self.arm_endpoint.starts_with("http://") && !self.arm_endpoint.starts_with("https://") {
            return Err(DeployError::InvalidConfig {
                key: ENV_ARM_ENDPOINT.to_string(),
                message: format!("'{}' is not an http(s) URL", self.arm_endpoint),
            });
        }
        Ok(())
    }

    /// Read the public key file verbatim.
    pub fn read_ssh_pub_key(&self) -> Result<String, DeployError> {
        log::info!("Reading SSH public key {}", self.ssh_pub_key_path.display());
        std::fs::read_to_string(&self.ssh_pub_key_path).map_err(|source| DeployError::SshKeyRead {
            path: self.ssh_pub_key_path.clone(),
            source,
        })
    }

    pub fn resource_group_name(&self) -> String {
        format!("{}-pulumi", self.name_prefix)
    }

    pub fn security_group_name(&self) -> String {
        format!("{}-nsg", self.name_prefix)
    }

    pub fn virtual_network_name(&self) -> String {
        format!("{}-network", self.name_prefix)
    }

    pub fn vm_name(&self) -> String {
        format!("{}-vm", self.name_prefix)
    }

    pub fn nic_name(&self) -> String {
        format!("{}-nic", self.name_prefix)
    }

    pub fn ip_config_name(&self) -> String {
        format!("{}-nic-config", self.name_prefix)
    }

    pub fn public_ip_name(&self) -> String {
        format!("{}-nic-publicip", self.name_prefix)
    }

    pub fn data_disk_name(&self) -> String {
        format!("{}-datadisk", self.name_prefix)
    }

    /// `authorized_keys` path of the admin user.
    pub fn authorized_keys_path(&self) -> String {
        format!("/home/{}/.ssh/authorized_keys", self.admin_user)
    }
}

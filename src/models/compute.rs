//! Microsoft.Compute virtual machine property bag.

use super::{Provisioned, PublicIpDnsSettings, PublicIpSku, Resource, SubResource};
use super::{IpVersion, PublicIpAllocationMethod};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkApiVersion {
    #[serde(rename = "2020-11-01")]
    V2020_11_01,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskCreateOption {
    FromImage,
    Empty,
    Attach,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageAccountType {
    #[serde(rename = "Premium_LRS")]
    PremiumLrs,
    #[serde(rename = "StandardSSD_LRS")]
    StandardSsdLrs,
    #[serde(rename = "Standard_LRS")]
    StandardLrs,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachingType {
    None,
    ReadOnly,
    ReadWrite,
}

/// Highest LUN a data disk may attach to.
pub const MAX_LUN: u8 = 63;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineProperties {
    pub hardware_profile: HardwareProfile,
    pub network_profile: NetworkProfile,
    pub os_profile: OsProfile,
    pub storage_profile: StorageProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl Provisioned for VirtualMachineProperties {
    fn provisioning_state(&self) -> Option<&str> {
        self.provisioning_state.as_deref()
    }
}

pub type VirtualMachine = Resource<VirtualMachineProperties>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProfile {
    pub vm_size: String,
}

// ── Network profile ─────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_api_version: Option<NetworkApiVersion>,
    #[serde(default)]
    pub network_interface_configurations: Vec<NicConfig>,
}

impl NetworkProfile {
    /// Name of the public IP of the first NIC's first IP configuration.
    pub fn public_ip_name(&self) -> Option<&str> {
        self.network_interface_configurations
            .first()?
            .properties
            .ip_configurations
            .first()?
            .properties
            .public_ip_address_configuration
            .as_ref()
            .map(|config| config.name.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NicConfig {
    pub name: String,
    pub properties: NicConfigProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NicConfigProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    pub ip_configurations: Vec<NicIpConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NicIpConfig {
    pub name: String,
    pub properties: NicIpConfigProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NicIpConfigProperties {
    /// Filled with the subnet id at apply time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<SubResource>,
    #[serde(
        default,
        rename = "publicIPAddressConfiguration",
        skip_serializing_if = "Option::is_none"
    )]
    pub public_ip_address_configuration: Option<PublicIpConfig>,
}

/// Public IP created together with the VM's NIC.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PublicIpConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<PublicIpSku>,
    pub properties: PublicIpConfigProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpConfigProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_settings: Option<PublicIpDnsSettings>,
    #[serde(rename = "publicIPAddressVersion")]
    pub public_ip_address_version: IpVersion,
    #[serde(rename = "publicIPAllocationMethod")]
    pub public_ip_allocation_method: PublicIpAllocationMethod,
}

// ── OS profile ──────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OsProfile {
    pub computer_name: String,
    pub admin_username: String,
    /// Never set by the descriptor; present so validation can reject it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux_configuration: Option<LinuxConfiguration>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinuxConfiguration {
    pub disable_password_authentication: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<SshConfiguration>,
}

impl LinuxConfiguration {
    pub fn has_ssh_keys(&self) -> bool {
        self.ssh
            .as_ref()
            .is_some_and(|ssh| !ssh.public_keys.is_empty())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SshConfiguration {
    pub public_keys: Vec<SshPublicKey>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SshPublicKey {
    pub path: String,
    pub key_data: String,
}

// ── Storage profile ─────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageProfile {
    pub image_reference: ImageReference,
    pub os_disk: OsDisk,
    #[serde(default)]
    pub data_disks: Vec<DataDisk>,
}

/// Marketplace image, pinned to one version.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDisk {
    pub storage_account_type: StorageAccountType,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OsDisk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub create_option: DiskCreateOption,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caching: Option<CachingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_disk: Option<ManagedDisk>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataDisk {
    pub name: String,
    pub lun: u8,
    pub caching: CachingType,
    pub create_option: DiskCreateOption,
    #[serde(rename = "diskSizeGB")]
    pub disk_size_gb: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_disk: Option<ManagedDisk>,
}

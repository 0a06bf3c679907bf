//! Desired-state graph of the GitHub Enterprise Server host.
//!
//! [`declare`] is the only entry point: it reads the SSH key, builds the four
//! resources and validates them. Cross-resource ids (subnet -> security
//! group, NIC -> subnet) are left empty here and filled by the engine once
//! the provider has returned them.

use crate::config::{self, DeployConfig};
use crate::error::DeployError;
use crate::models::*;
use crate::validate::validate_deployment;
use serde::Serialize;

/// Inbound allow rules: (name, description, port, priority).
pub const INBOUND_RULES: [(&str, &str, u16, u16); 5] = [
    ("git-ssh", "Git over SSH", 22, 900),
    ("web-http", "Web application access", 80, 800),
    ("admin-ssh", "Instance SSH shell access", 122, 700),
    ("web-https", "Web application and Git over https", 443, 600),
    ("management-console", "Secure web based management console", 8443, 500),
];

/// Declared resources, leaves first.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub resource_group: ResourceGroup,
    pub security_group: NetworkSecurityGroup,
    pub virtual_network: VirtualNetwork,
    pub virtual_machine: VirtualMachine,
}

/// Evaluate the descriptor for `config`.
///
/// Fails with [`DeployError::SshKeyRead`] before anything is built when the
/// key file cannot be read, and with [`DeployError::InvalidDeployment`] when
/// the graph is not well-formed.
pub fn declare(config: &DeployConfig) -> Result<Deployment, DeployError> {
    let ssh_pub_key = config.read_ssh_pub_key()?;

    let deployment = Deployment {
        resource_group: resource_group(config),
        security_group: security_group(config),
        virtual_network: virtual_network(config)?,
        virtual_machine: virtual_machine(config, ssh_pub_key),
    };
    validate_deployment(&deployment)?;

    log::info!(
        "Declared deployment '{}' ({} security rules, vm {})",
        deployment.resource_group.name,
        deployment.security_group.properties.security_rules.len(),
        deployment.virtual_machine.name
    );
    Ok(deployment)
}

fn resource_group(config: &DeployConfig) -> ResourceGroup {
    ResourceGroup::new(
        &config.resource_group_name(),
        &config.location,
        ResourceGroupProperties::default(),
    )
    .with_tag("deployment", &config.name_prefix)
}

fn security_group(config: &DeployConfig) -> NetworkSecurityGroup {
    let security_rules = INBOUND_RULES
        .iter()
        .map(|(name, description, port, priority)| {
            SecurityRule::allow_inbound(name, description, *port, *priority)
        })
        .collect();

    NetworkSecurityGroup::new(
        &config.security_group_name(),
        &config.location,
        NetworkSecurityGroupProperties {
            security_rules,
            provisioning_state: None,
        },
    )
}

fn virtual_network(config: &DeployConfig) -> Result<VirtualNetwork, DeployError> {
    let address_space =
        Ipv4::new(config::VNET_ADDRESS_SPACE).map_err(DeployError::InvalidDeployment)?;
    let subnet_prefix = Ipv4::new(config::SUBNET_PREFIX).map_err(DeployError::InvalidDeployment)?;

    Ok(VirtualNetwork::new(
        &config.virtual_network_name(),
        &config.location,
        VirtualNetworkProperties {
            address_space: AddressSpace {
                address_prefixes: vec![address_space],
            },
            subnets: vec![Subnet {
                id: None,
                name: config::SUBNET_NAME.to_string(),
                properties: SubnetProperties {
                    address_prefix: subnet_prefix,
                    network_security_group: None,
                    provisioning_state: None,
                },
            }],
            provisioning_state: None,
        },
    ))
}

fn virtual_machine(config: &DeployConfig, ssh_pub_key: String) -> VirtualMachine {
    let premium = || {
        Some(ManagedDisk {
            storage_account_type: StorageAccountType::PremiumLrs,
        })
    };

    let public_ip = PublicIpConfig {
        name: config.public_ip_name(),
        sku: Some(PublicIpSku {
            name: PublicIpSkuName::Basic,
            tier: Some(PublicIpSkuTier::Regional),
        }),
        properties: PublicIpConfigProperties {
            dns_settings: Some(PublicIpDnsSettings {
                domain_name_label: config.name_prefix.clone(),
                fqdn: None,
            }),
            public_ip_address_version: IpVersion::IPv4,
            public_ip_allocation_method: PublicIpAllocationMethod::Static,
        },
    };

    VirtualMachine::new(
        &config.vm_name(),
        &config.location,
        VirtualMachineProperties {
            hardware_profile: HardwareProfile {
                vm_size: config::VM_SIZE.to_string(),
            },
            network_profile: NetworkProfile {
                network_api_version: Some(NetworkApiVersion::V2020_11_01),
                network_interface_configurations: vec![NicConfig {
                    name: config.nic_name(),
                    properties: NicConfigProperties {
                        primary: Some(true),
                        ip_configurations: vec![NicIpConfig {
                            name: config.ip_config_name(),
                            properties: NicIpConfigProperties {
                                subnet: None,
                                public_ip_address_configuration: Some(public_ip),
                            },
                        }],
                    },
                }],
            },
            os_profile: OsProfile {
                computer_name: config.name_prefix.clone(),
                admin_username: config.admin_user.clone(),
                admin_password: None,
                linux_configuration: Some(LinuxConfiguration {
                    disable_password_authentication: true,
                    ssh: Some(SshConfiguration {
                        public_keys: vec![SshPublicKey {
                            path: config.authorized_keys_path(),
                            key_data: ssh_pub_key,
                        }],
                    }),
                }),
            },
            storage_profile: StorageProfile {
                image_reference: ImageReference {
                    publisher: config::IMAGE_PUBLISHER.to_string(),
                    offer: config::IMAGE_OFFER.to_string(),
                    sku: config::IMAGE_SKU.to_string(),
                    version: config::IMAGE_VERSION.to_string(),
                },
                os_disk: OsDisk {
                    name: None,
                    create_option: DiskCreateOption::FromImage,
                    caching: None,
                    managed_disk: premium(),
                },
                data_disks: vec![DataDisk {
                    name: config.data_disk_name(),
                    lun: config::DATA_DISK_LUN,
                    caching: CachingType::ReadWrite,
                    create_option: DiskCreateOption::Empty,
                    disk_size_gb: config::DATA_DISK_SIZE_GB,
                    managed_disk: premium(),
                }],
            },
            provisioning_state: None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const KEY: &str = "ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQ ghadmin@laptop\n";

    fn key_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("id_rsa.pub");
        std::fs::write(&path, KEY).expect("write key");
        (dir, path)
    }

    #[test]
    fn test_declare_names() {
        let (_dir, path) = key_file();
        let deployment = declare(&DeployConfig::new("ghadmin", &path)).expect("declare");

        assert_eq!(deployment.resource_group.name, "test-ghes-pulumi");
        assert_eq!(deployment.security_group.name, "test-ghes-nsg");
        assert_eq!(deployment.virtual_network.name, "test-ghes-network");
        assert_eq!(deployment.virtual_machine.name, "test-ghes-vm");
        assert_eq!(
            deployment
                .virtual_machine
                .properties
                .network_profile
                .public_ip_name(),
            Some("test-ghes-nic-publicip")
        );
    }

    #[test]
    fn test_declare_security_rules() {
        let (_dir, path) = key_file();
        let deployment = declare(&DeployConfig::new("ghadmin", &path)).expect("declare");
        let rules = &deployment.security_group.properties.security_rules;

        let ports: Vec<&str> = rules
            .iter()
            .map(|r| r.properties.destination_port_range.as_str())
            .collect();
        assert_eq!(ports, vec!["22", "80", "122", "443", "8443"]);

        let priorities: Vec<u16> = rules.iter().map(|r| r.properties.priority).collect();
        assert_eq!(priorities, vec![900, 800, 700, 600, 500]);
        assert!(rules
            .iter()
            .all(|r| r.properties.access == Access::Allow
                && r.properties.direction == SecurityRuleDirection::Inbound));
    }

    #[test]
    fn test_declare_vm_profile() {
        let (_dir, path) = key_file();
        let deployment = declare(&DeployConfig::new("ghadmin", &path)).expect("declare");
        let vm = &deployment.virtual_machine.properties;

        assert_eq!(vm.hardware_profile.vm_size, "Standard_D4ds_v4");
        assert_eq!(vm.storage_profile.image_reference.version, "3.4.2");
        assert_eq!(
            vm.storage_profile.os_disk.create_option,
            DiskCreateOption::FromImage
        );

        let disk = &vm.storage_profile.data_disks[0];
        assert_eq!(disk.lun, 2);
        assert_eq!(disk.disk_size_gb, 150);
        assert_eq!(disk.create_option, DiskCreateOption::Empty);
        assert_eq!(disk.name, "test-ghes-datadisk");

        let linux = vm.os_profile.linux_configuration.as_ref().unwrap();
        assert!(linux.disable_password_authentication);
        assert_eq!(vm.os_profile.admin_password, None);
        let key = &linux.ssh.as_ref().unwrap().public_keys[0];
        assert_eq!(key.key_data, KEY);
        assert_eq!(key.path, "/home/ghadmin/.ssh/authorized_keys");
    }

    #[test]
    fn test_declare_unreadable_key() {
        let config = DeployConfig::new("ghadmin", "/nonexistent/id_rsa.pub");
        let err = declare(&config).unwrap_err();
        assert!(matches!(err, DeployError::SshKeyRead { .. }));
    }

    #[test]
    fn test_preview_json_has_no_ids() {
        let (_dir, path) = key_file();
        let deployment = declare(&DeployConfig::new("ghadmin", &path)).expect("declare");
        let json = serde_json::to_value(&deployment).unwrap();

        assert_eq!(
            json["virtualNetwork"]["properties"]["subnets"][0]["properties"],
            serde_json::json!({ "addressPrefix": "10.0.0.0/24" })
        );
        assert!(json["virtualMachine"]["properties"]["osProfile"]
            .get("adminPassword")
            .is_none());
        assert!(json["resourceGroup"].get("id").is_none());
    }
}

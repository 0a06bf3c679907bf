//! Microsoft.Network property bags: security group, virtual network, public IP.

use super::{Ipv4, Provisioned, Resource, SubResource};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityRuleDirection {
    Inbound,
    Outbound,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityRuleProtocol {
    Tcp,
    Udp,
    Icmp,
    Esp,
    Ah,
    #[serde(rename = "*")]
    Asterisk,
}

/// Lowest and highest priority Azure accepts for a security rule.
pub const MIN_RULE_PRIORITY: u16 = 100;
pub const MAX_RULE_PRIORITY: u16 = 4096;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SecurityRule {
    pub name: String,
    pub properties: SecurityRuleProperties,
}

/// Lower `priority` is evaluated first; unique within a group.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRuleProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub access: Access,
    pub direction: SecurityRuleDirection,
    pub protocol: SecurityRuleProtocol,
    pub source_port_range: String,
    pub source_address_prefix: String,
    pub destination_port_range: String,
    pub destination_address_prefix: String,
    pub priority: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl SecurityRule {
    /// Allow inbound traffic of any protocol from anywhere to `port`.
    pub fn allow_inbound(name: &str, description: &str, port: u16, priority: u16) -> SecurityRule {
        SecurityRule {
            name: name.to_string(),
            properties: SecurityRuleProperties {
                description: Some(description.to_string()),
                access: Access::Allow,
                direction: SecurityRuleDirection::Inbound,
                protocol: SecurityRuleProtocol::Asterisk,
                source_port_range: "*".to_string(),
                source_address_prefix: "*".to_string(),
                destination_port_range: port.to_string(),
                destination_address_prefix: "*".to_string(),
                priority,
                provisioning_state: None,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSecurityGroupProperties {
    #[serde(default)]
    pub security_rules: Vec<SecurityRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl Provisioned for NetworkSecurityGroupProperties {
    fn provisioning_state(&self) -> Option<&str> {
        self.provisioning_state.as_deref()
    }
}

pub type NetworkSecurityGroup = Resource<NetworkSecurityGroupProperties>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddressSpace {
    pub address_prefixes: Vec<Ipv4>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Subnet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub properties: SubnetProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubnetProperties {
    pub address_prefix: Ipv4,
    /// Filled with the security group id at apply time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_security_group: Option<SubResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkProperties {
    pub address_space: AddressSpace,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl Provisioned for VirtualNetworkProperties {
    fn provisioning_state(&self) -> Option<&str> {
        self.provisioning_state.as_deref()
    }
}

pub type VirtualNetwork = Resource<VirtualNetworkProperties>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpVersion {
    IPv4,
    IPv6,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicIpAllocationMethod {
    Static,
    Dynamic,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicIpSkuName {
    Basic,
    Standard,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicIpSkuTier {
    Regional,
    Global,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicIpSku {
    pub name: PublicIpSkuName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<PublicIpSkuTier>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpDnsSettings {
    pub domain_name_label: String,
    /// Assigned by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
}

/// Public IP address as returned by the read API.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PublicIpAddress {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub sku: Option<PublicIpSku>,
    pub properties: PublicIpAddressProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpAddressProperties {
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub dns_settings: Option<PublicIpDnsSettings>,
    #[serde(default, rename = "publicIPAllocationMethod")]
    pub public_ip_allocation_method: Option<PublicIpAllocationMethod>,
    #[serde(default, rename = "publicIPAddressVersion")]
    pub public_ip_address_version: Option<IpVersion>,
    #[serde(default)]
    pub provisioning_state: Option<String>,
}

impl PublicIpAddress {
    pub fn fqdn(&self) -> Option<&str> {
        self.properties
            .dns_settings
            .as_ref()
            .and_then(|dns| dns.fqdn.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_rule_wire_shape() {
        let rule = SecurityRule::allow_inbound("git-ssh", "Git over SSH", 22, 900);
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "git-ssh",
                "properties": {
                    "description": "Git over SSH",
                    "access": "Allow",
                    "direction": "Inbound",
                    "protocol": "*",
                    "sourcePortRange": "*",
                    "sourceAddressPrefix": "*",
                    "destinationPortRange": "22",
                    "destinationAddressPrefix": "*",
                    "priority": 900
                }
            })
        );
    }

    #[test]
    fn test_public_ip_from_response() {
        let ip: PublicIpAddress = serde_json::from_value(serde_json::json!({
            "name": "test-ghes-nic-publicip",
            "id": "/subscriptions/0000/resourceGroups/rg/providers/Microsoft.Network/publicIPAddresses/test-ghes-nic-publicip",
            "location": "eastus",
            "sku": { "name": "Basic", "tier": "Regional" },
            "properties": {
                "provisioningState": "Succeeded",
                "ipAddress": "20.1.2.3",
                "publicIPAddressVersion": "IPv4",
                "publicIPAllocationMethod": "Static",
                "idleTimeoutInMinutes": 4,
                "dnsSettings": {
                    "domainNameLabel": "test-ghes",
                    "fqdn": "test-ghes.eastus.cloudapp.azure.com"
                }
            }
        }))
        .unwrap();
        assert_eq!(ip.properties.ip_address.as_deref(), Some("20.1.2.3"));
        assert_eq!(ip.fqdn(), Some("test-ghes.eastus.cloudapp.azure.com"));
        assert_eq!(
            ip.properties.public_ip_allocation_method,
            Some(PublicIpAllocationMethod::Static)
        );
        assert_eq!(ip.sku.and_then(|s| s.tier), Some(PublicIpSkuTier::Regional));
    }

    #[test]
    fn test_unknown_protocol_rejected() {
        let res = serde_json::from_str::<SecurityRuleProtocol>("\"Gre\"");
        assert!(res.is_err());
        let any: SecurityRuleProtocol = serde_json::from_str("\"*\"").unwrap();
        assert_eq!(any, SecurityRuleProtocol::Asterisk);
    }
}

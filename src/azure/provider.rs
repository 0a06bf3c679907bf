//! [`Provider`] backed by the ARM REST API.

use super::arm::ArmClient;
use super::credential::ArmCredential;
use crate::config::DeployConfig;
use crate::error::DeployError;
use crate::models::{
    NetworkSecurityGroup, PublicIpAddress, ResourceGroup, VirtualMachine, VirtualNetwork,
};
use crate::provider::Provider;
use async_trait::async_trait;

const RESOURCES_API_VERSION: &str = "2021-04-01";
const NETWORK_API_VERSION: &str = "2021-08-01";
const COMPUTE_API_VERSION: &str = "2021-11-01";

const RESOURCE_GROUP_TYPE: &str = "Microsoft.Resources/resourceGroups";
const NSG_TYPE: &str = "Microsoft.Network/networkSecurityGroups";
const VNET_TYPE: &str = "Microsoft.Network/virtualNetworks";
const PUBLIC_IP_TYPE: &str = "Microsoft.Network/publicIPAddresses";
const VM_TYPE: &str = "Microsoft.Compute/virtualMachines";

pub struct ArmProvider {
    client: ArmClient,
}

impl ArmProvider {
    pub fn new(client: ArmClient) -> ArmProvider {
        ArmProvider { client }
    }

    /// Credentials from the logged-in Azure CLI, scoped to the configured endpoint.
    pub fn from_config(config: &DeployConfig) -> Result<ArmProvider, DeployError> {
        let credential =
            ArmCredential::from_az_cli(&config.arm_endpoint, config.subscription_id.as_deref())?;
        Ok(ArmProvider::new(ArmClient::new(&config.arm_endpoint, credential)?))
    }
}

#[async_trait]
impl Provider for ArmProvider {
    async fn create_or_update_resource_group(
        &self,
        resource_group: &ResourceGroup,
    ) -> Result<ResourceGroup, DeployError> {
        let path = self.client.resource_group_path(&resource_group.name);
        self.client
            .put_and_wait(
                RESOURCE_GROUP_TYPE,
                &resource_group.name,
                &path,
                RESOURCES_API_VERSION,
                resource_group,
            )
            .await
    }

    async fn create_or_update_network_security_group(
        &self,
        resource_group_name: &str,
        security_group: &NetworkSecurityGroup,
    ) -> Result<NetworkSecurityGroup, DeployError> {
        let path = self
            .client
            .resource_path(resource_group_name, NSG_TYPE, &security_group.name);
        self.client
            .put_and_wait(
                NSG_TYPE,
                &security_group.name,
                &path,
                NETWORK_API_VERSION,
                security_group,
            )
            .await
    }

    async fn create_or_update_virtual_network(
        &self,
        resource_group_name: &str,
        virtual_network: &VirtualNetwork,
    ) -> Result<VirtualNetwork, DeployError> {
        let path = self
            .client
            .resource_path(resource_group_name, VNET_TYPE, &virtual_network.name);
        self.client
            .put_and_wait(
                VNET_TYPE,
                &virtual_network.name,
                &path,
                NETWORK_API_VERSION,
                virtual_network,
            )
            .await
    }

    async fn create_or_update_virtual_machine(
        &self,
        resource_group_name: &str,
        virtual_machine: &VirtualMachine,
    ) -> Result<VirtualMachine, DeployError> {
        let path = self
            .client
            .resource_path(resource_group_name, VM_TYPE, &virtual_machine.name);
        self.client
            .put_and_wait(
                VM_TYPE,
                &virtual_machine.name,
                &path,
                COMPUTE_API_VERSION,
                virtual_machine,
            )
            .await
    }

    async fn get_public_ip_address(
        &self,
        resource_group_name: &str,
        public_ip_name: &str,
    ) -> Result<PublicIpAddress, DeployError> {
        let path = self
            .client
            .resource_path(resource_group_name, PUBLIC_IP_TYPE, public_ip_name);
        log::info!("Reading {PUBLIC_IP_TYPE} {public_ip_name}");
        self.client.get(&path, NETWORK_API_VERSION).await
    }

    async fn delete_resource_group(&self, resource_group_name: &str) -> Result<(), DeployError> {
        let path = self.client.resource_group_path(resource_group_name);
        self.client
            .delete_and_wait(
                RESOURCE_GROUP_TYPE,
                resource_group_name,
                &path,
                RESOURCES_API_VERSION,
            )
            .await
    }
}

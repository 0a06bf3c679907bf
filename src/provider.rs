//! Seam between the engine and the cloud.

use crate::error::DeployError;
use crate::models::{
    NetworkSecurityGroup, PublicIpAddress, ResourceGroup, VirtualMachine, VirtualNetwork,
};
use async_trait::async_trait;

/// Create/update/read/delete operations the deployment needs.
///
/// Create calls return the resource as the provider reports it once
/// provisioning has finished, including its `id`.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn create_or_update_resource_group(
        &self,
        resource_group: &ResourceGroup,
    ) -> Result<ResourceGroup, DeployError>;

    async fn create_or_update_network_security_group(
        &self,
        resource_group_name: &str,
        security_group: &NetworkSecurityGroup,
    ) -> Result<NetworkSecurityGroup, DeployError>;

    async fn create_or_update_virtual_network(
        &self,
        resource_group_name: &str,
        virtual_network: &VirtualNetwork,
    ) -> Result<VirtualNetwork, DeployError>;

    async fn create_or_update_virtual_machine(
        &self,
        resource_group_name: &str,
        virtual_machine: &VirtualMachine,
    ) -> Result<VirtualMachine, DeployError>;

    /// Single read, no retry.
    async fn get_public_ip_address(
        &self,
        resource_group_name: &str,
        public_ip_name: &str,
    ) -> Result<PublicIpAddress, DeployError>;

    /// Delete the group and everything in it.
    async fn delete_resource_group(&self, resource_group_name: &str) -> Result<(), DeployError>;
}

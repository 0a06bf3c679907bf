//! Applies a declared [`Deployment`] through a [`Provider`].
//!
//! Each resource becomes an [`Output`] chained on the outputs it depends on:
//! resource group -> security group -> virtual network -> virtual machine ->
//! public IP lookup. Ids returned by the provider are wired into dependants
//! (subnet -> security group, NIC -> subnet) just before their creation.

mod output;

pub use output::{Output, SharedResult};

use crate::descriptor::Deployment;
use crate::error::DeployError;
use crate::models::{NetworkProfile, SubResource};
use crate::provider::Provider;
use colored::Colorize;
use serde::Serialize;
use std::sync::Arc;

/// Values published after a successful apply.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StackOutputs {
    pub resource_group_name: String,
    /// Name of the virtual machine.
    pub physical_name: String,
    pub dns: Option<String>,
    pub ip: String,
}

/// Create or update every resource, then read back the public endpoint.
///
/// The first failure aborts the apply; nothing is rolled back.
pub async fn up(provider: Arc<dyn Provider>, deployment: Deployment) -> SharedResult<StackOutputs> {
    let Deployment {
        resource_group,
        security_group,
        virtual_network,
        virtual_machine,
    } = deployment;
    log::info!("#Start up() '{}'", resource_group.name.on_blue());

    let p = provider.clone();
    let rg = Output::new(async move { p.create_or_update_resource_group(&resource_group).await });

    let p = provider.clone();
    let nsg = rg.apply(move |rg| async move {
        let mut security_group = security_group;
        security_group.location = rg.location.clone();
        p.create_or_update_network_security_group(&rg.name, &security_group)
            .await
    });

    let p = provider.clone();
    let vnet = rg.zip(&nsg).apply(move |(rg, nsg)| async move {
        let nsg_id = nsg.id.clone().ok_or_else(|| missing_id(&nsg.name))?;
        let mut virtual_network = virtual_network;
        virtual_network.location = rg.location.clone();
        for subnet in virtual_network.properties.subnets.iter_mut() {
            subnet.properties.network_security_group = Some(SubResource { id: nsg_id.clone() });
        }
        p.create_or_update_virtual_network(&rg.name, &virtual_network)
            .await
    });

    let p = provider.clone();
    let vm = rg.zip(&vnet).apply(move |(rg, vnet)| async move {
        let subnet = vnet
            .properties
            .subnets
            .first()
            .ok_or_else(|| missing_id(&vnet.name))?;
        let subnet_id = subnet.id.clone().ok_or_else(|| missing_id(&subnet.name))?;

        let mut virtual_machine = virtual_machine;
        virtual_machine.location = rg.location.clone();
        let nics = &mut virtual_machine
            .properties
            .network_profile
            .network_interface_configurations;
        for ip_config in nics
            .iter_mut()
            .flat_map(|nic| nic.properties.ip_configurations.iter_mut())
        {
            ip_config.properties.subnet = Some(SubResource {
                id: subnet_id.clone(),
            });
        }
        p.create_or_update_virtual_machine(&rg.name, &virtual_machine)
            .await
    });

    let resource_group_name = rg.map(|rg| rg.name);
    let physical_name = vm.map(|vm| vm.name);
    let network_profile = vm.map(|vm| vm.properties.network_profile);

    let p = provider.clone();
    let endpoint = resource_group_name
        .zip(&network_profile)
        .apply(move |(rg_name, profile)| async move {
            lookup_public_ip(&*p, &rg_name, &profile).await
        });

    let (resource_group_name, physical_name, (dns, ip)) = futures::try_join!(
        resource_group_name.resolve(),
        physical_name.resolve(),
        endpoint.resolve()
    )?;

    log::info!(
        "#End up() '{}' vm={} ip={}",
        resource_group_name.green(),
        physical_name,
        ip
    );
    Ok(StackOutputs {
        resource_group_name,
        physical_name,
        dns,
        ip,
    })
}

/// Delete the resource group; everything beneath it goes with it.
pub async fn destroy(provider: &dyn Provider, resource_group_name: &str) -> Result<(), DeployError> {
    log::warn!("#Start destroy() '{}'", resource_group_name.on_red());
    provider.delete_resource_group(resource_group_name).await
}

fn missing_id(name: &str) -> DeployError {
    DeployError::Lookup {
        resource: name.to_string(),
        message: "provider returned no id".to_string(),
    }
}

/// One read of the public IP named in the VM's returned network profile.
///
/// Returns `(fqdn, address)`; no retry.
async fn lookup_public_ip(
    provider: &dyn Provider,
    resource_group_name: &str,
    profile: &NetworkProfile,
) -> Result<(Option<String>, String), DeployError> {
    let name = profile.public_ip_name().ok_or_else(|| DeployError::Lookup {
        resource: "public IP".to_string(),
        message: "network profile has no public IP configuration".to_string(),
    })?;
    log::info!("Looking up public IP {}", name.green());

    let public_ip = provider
        .get_public_ip_address(resource_group_name, name)
        .await
        .map_err(|e| DeployError::Lookup {
            resource: name.to_string(),
            message: e.to_string(),
        })?;

    let address = public_ip
        .properties
        .ip_address
        .clone()
        .ok_or_else(|| DeployError::Lookup {
            resource: name.to_string(),
            message: "no address allocated".to_string(),
        })?;
    Ok((public_ip.fqdn().map(str::to_string), address))
}

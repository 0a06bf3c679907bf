//! Typed ARM property bags for every declared resource.
//!
//! Field names and enum values follow the Azure REST schema so the structs
//! serialize directly into request bodies:
//! - [`Ipv4`] - CIDR blocks
//! - [`Resource`] / [`ResourceGroup`] - common envelope and root scope
//! - [`network`] - security group, virtual network, public IP
//! - [`compute`] - virtual machine profiles and disks

mod compute;
mod ipv4;
mod network;
mod resource;

pub use compute::*;
pub use ipv4::{get_cidr_mask, Ipv4, MAX_LENGTH};
pub use network::*;
pub use resource::{
    Provisioned, Resource, ResourceGroup, ResourceGroupProperties, SubResource,
};

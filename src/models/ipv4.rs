//! IPv4 CIDR block used for address spaces and subnet prefixes.
//!
//! Serialized as the `"10.0.0.0/24"` string form Azure expects.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum prefix length for IPv4 (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Convert a CIDR prefix length to a subnet mask.
///
/// # Examples
/// ```
/// use ghes_azure_deploy::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, String> {
    if len > MAX_LENGTH {
        Err(format!("Network length /{len} is too long"))
    } else {
        let right_len = MAX_LENGTH - len;
        let mask = (u32::MAX as u64 >> right_len) << right_len;
        Ok(mask as u32)
    }
}

/// IPv4 address with prefix length.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Ipv4 {
    pub addr: Ipv4Addr,
    /// Prefix length (0-32).
    pub mask: u8,
}

impl Ipv4 {
    /// Parse `"a.b.c.d/len"`.
    pub fn new(addr_cidr: &str) -> Result<Ipv4, String> {
        let addr_cidr = addr_cidr.trim();
        let (addr, mask) = addr_cidr
            .split_once('/')
            .ok_or_else(|| format!("Invalid address/mask: {addr_cidr}"))?;
        let addr = Ipv4Addr::from_str(addr).map_err(|_| format!("Invalid address {addr}"))?;
        let mask = u8::from_str(mask).map_err(|_| format!("Invalid subnet mask {mask}"))?;
        if mask > MAX_LENGTH {
            return Err(format!("Network length /{mask} is too long"));
        }
        Ok(Ipv4 { addr, mask })
    }

    fn mask_bits(&self) -> u32 {
        // mask is bounded by construction
        get_cidr_mask(self.mask.min(MAX_LENGTH)).unwrap_or(u32::MAX)
    }

    /// Lowest (network) address of the block.
    pub fn lo(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) & self.mask_bits())
    }

    /// Highest (broadcast) address of the block.
    pub fn hi(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) | !self.mask_bits())
    }

    /// True when the address has no host bits set.
    pub fn is_network_address(&self) -> bool {
        self.addr == self.lo()
    }

    /// True when `other` lies entirely inside this block.
    pub fn contains(&self, other: &Ipv4) -> bool {
        other.mask >= self.mask && self.lo() <= other.lo() && other.hi() <= self.hi()
    }

    /// True when the two blocks share at least one address.
    pub fn overlaps(&self, other: &Ipv4) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }
}

impl Serialize for Ipv4 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Ipv4 {
    fn deserialize<D>(deserializer: D) -> Result<Ipv4, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ipv4::new(&s).map_err(de::Error::custom)
    }
}

impl fmt::Display for Ipv4 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}

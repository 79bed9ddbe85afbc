//! IPv4 address block and CIDR arithmetic.
//!
//! Provides [`AddressBlock`] for a normalized network/prefix pair, along with
//! the numeric helpers the strategies and the tunnel subnetter build on.

use crate::error::CidrError;
use regex::Regex;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::OnceLock;

/// Maximum length for an IPv4 subnet mask (32 bits).
pub const MAX_LENGTH: u8 = 32;

/// Inferred covering blocks broader than this prefix are narrowed by grouping.
pub const COVERING_FLOOR: u8 = 8;

static CIDR_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_cidr_regex() -> &'static Regex {
    CIDR_REGEX.get_or_init(|| {
        Regex::new(r"^([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})\.([0-9]{1,3})/([0-9]{1,2})$")
            .expect("Invalid Regex")
    })
}

/// Convert a dotted-quad address to its 32-bit value.
pub fn address_to_numeric(addr: Ipv4Addr) -> u32 {
    u32::from(addr)
}

/// Convert a 32-bit value back to a dotted-quad address.
pub fn numeric_to_address(num: u32) -> Ipv4Addr {
    Ipv4Addr::from(num)
}

/// Convert a CIDR prefix length to a subnet mask as u32.
///
/// # Examples
/// ```
/// use site_address_plan::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8) -> Result<u32, CidrError> {
    if len > MAX_LENGTH {
        Err(CidrError::InvalidPrefix(format!("/{len}")))
    } else {
        let right_len = MAX_LENGTH - len;
        let all_bits = u32::MAX as u64;
        let mask = (all_bits >> right_len) << right_len;
        Ok(mask as u32)
    }
}

/// Number of addresses in a block of the given prefix length.
pub fn block_size(len: u8) -> u64 {
    1u64 << (MAX_LENGTH - len.min(MAX_LENGTH))
}

/// Usable host addresses for a prefix length.
///
/// /31 is a point-to-point link with both addresses usable, /32 a host route.
pub fn usable_host_count(len: u8) -> u64 {
    match len {
        l if l >= MAX_LENGTH => 1,
        31 => 2,
        l => block_size(l) - 2,
    }
}

/// Smallest prefix length whose block holds at least `count` addresses.
pub fn prefix_for_addresses(count: u64) -> Option<u8> {
    if count == 0 || count > block_size(0) {
        return None;
    }
    let bits = 64 - (count - 1).leading_zeros();
    Some(MAX_LENGTH - bits as u8)
}

/// Parse `a.b.c.d/p` into a normalized network number and prefix.
///
/// Host bits are cleared, so `10.0.1.7/24` yields the value of `10.0.1.0`.
pub fn parse(cidr: &str) -> Result<(u32, u8), CidrError> {
    let cidr = cidr.trim();
    let caps = get_cidr_regex()
        .captures(cidr)
        .ok_or_else(|| CidrError::InvalidFormat(cidr.to_string()))?;

    let mut octets = [0u8; 4];
    for (i, octet) in octets.iter_mut().enumerate() {
        let text = &caps[i + 1];
        // no leading zeros
        if text.len() > 1 && text.starts_with('0') {
            return Err(CidrError::InvalidOctet(cidr.to_string()));
        }
        *octet = text
            .parse::<u8>()
            .map_err(|_| CidrError::InvalidOctet(cidr.to_string()))?;
    }
    let prefix: u8 = caps[5]
        .parse()
        .map_err(|_| CidrError::InvalidPrefix(cidr.to_string()))?;
    if prefix > MAX_LENGTH {
        return Err(CidrError::InvalidPrefix(cidr.to_string()));
    }

    let network = u32::from_be_bytes(octets) & get_cidr_mask(prefix)?;
    Ok((network, prefix))
}

/// Parse a bare dotted-quad address.
pub fn parse_address(addr: &str) -> Result<Ipv4Addr, CidrError> {
    Ipv4Addr::from_str(addr.trim()).map_err(|_| CidrError::InvalidAddress(addr.to_string()))
}

/// Gateway and host range of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubnetDetails {
    pub gateway: Ipv4Addr,
    pub host_min: Ipv4Addr,
    pub host_max: Ipv4Addr,
    pub broadcast: Ipv4Addr,
}

/// Full calculator view of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetInfo {
    pub network: Ipv4Addr,
    pub broadcast: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub wildcard: Ipv4Addr,
    pub prefix_length: u8,
    pub num_addresses: u64,
    pub num_hosts: u64,
    pub first_host: Ipv4Addr,
    pub last_host: Ipv4Addr,
    pub is_private: bool,
}

/// A normalized IPv4 CIDR block.
///
/// The network address never carries host bits and the prefix is always 0-32.
#[derive(Eq, Ord, PartialEq, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct AddressBlock {
    network: Ipv4Addr,
    prefix: u8,
}

impl AddressBlock {
    /// Create a block from a CIDR string (e.g. "10.0.0.0/24").
    pub fn new(cidr: &str) -> Result<AddressBlock, CidrError> {
        let (network, prefix) = parse(cidr)?;
        Ok(AddressBlock {
            network: Ipv4Addr::from(network),
            prefix,
        })
    }

    /// Create a block from a numeric address and prefix, clearing host bits.
    pub fn from_numeric(addr: u32, prefix: u8) -> Result<AddressBlock, CidrError> {
        let mask = get_cidr_mask(prefix)?;
        Ok(AddressBlock {
            network: Ipv4Addr::from(addr & mask),
            prefix,
        })
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    fn mask(&self) -> u32 {
        // prefix is validated on construction
        get_cidr_mask(self.prefix).unwrap_or(0)
    }

    /// Lowest (network) address as u32.
    pub fn lo(&self) -> u32 {
        u32::from(self.network)
    }

    /// Highest (broadcast) address as u32.
    pub fn hi(&self) -> u32 {
        self.lo() | !self.mask()
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.hi())
    }

    /// Number of addresses in the block.
    pub fn size(&self) -> u64 {
        block_size(self.prefix)
    }

    pub fn usable_hosts(&self) -> u64 {
        usable_host_count(self.prefix)
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let n = u32::from(addr);
        self.lo() <= n && n <= self.hi()
    }

    /// True when `other` lies completely inside this block.
    pub fn contains_block(&self, other: &AddressBlock) -> bool {
        self.lo() <= other.lo() && other.hi() <= self.hi()
    }

    pub fn overlaps(&self, other: &AddressBlock) -> bool {
        self.lo() <= other.hi() && other.lo() <= self.hi()
    }

    /// The block of the same size directly after this one, if it fits in 32 bits.
    pub fn next_block(&self) -> Option<AddressBlock> {
        let next = (self.hi() as u64) + 1;
        if next > u32::MAX as u64 {
            return None;
        }
        Some(AddressBlock {
            network: Ipv4Addr::from(next as u32),
            prefix: self.prefix,
        })
    }

    /// Gateway and host range.
    ///
    /// Up to /30 the gateway is network+1 and hosts run from network+2 to
    /// broadcast-1. /31 and /32 have no network/broadcast reservation, so the
    /// gateway is the network address and the host range is the block itself.
    pub fn details(&self) -> SubnetDetails {
        let lo = self.lo();
        let hi = self.hi();
        if self.prefix >= 31 {
            return SubnetDetails {
                gateway: Ipv4Addr::from(lo),
                host_min: Ipv4Addr::from(lo),
                host_max: Ipv4Addr::from(hi),
                broadcast: Ipv4Addr::from(hi),
            };
        }
        SubnetDetails {
            gateway: Ipv4Addr::from(lo + 1),
            host_min: Ipv4Addr::from(lo + 2),
            host_max: Ipv4Addr::from(hi - 1),
            broadcast: Ipv4Addr::from(hi),
        }
    }

    pub fn gateway(&self) -> Ipv4Addr {
        self.details().gateway
    }

    /// Subnet calculator output.
    pub fn info(&self) -> SubnetInfo {
        let details = self.details();
        let first_host = if self.prefix >= 31 {
            details.host_min
        } else {
            details.gateway
        };
        SubnetInfo {
            network: self.network,
            broadcast: details.broadcast,
            netmask: Ipv4Addr::from(self.mask()),
            wildcard: Ipv4Addr::from(!self.mask()),
            prefix_length: self.prefix,
            num_addresses: self.size(),
            num_hosts: self.usable_hosts(),
            first_host,
            last_host: details.host_max,
            is_private: self.network.is_private() && details.broadcast.is_private(),
        }
    }
}

impl FromStr for AddressBlock {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AddressBlock::new(s)
    }
}

impl std::fmt::Display for AddressBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

impl Serialize for AddressBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AddressBlock {
    fn deserialize<D>(deserializer: D) -> Result<AddressBlock, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        AddressBlock::new(&s).map_err(de::Error::custom)
    }
}

/// Smallest block containing the whole range `lo..=hi`.
///
/// The prefix is the number of leading bits both bounds share.
pub fn covering_range(lo: u32, hi: u32) -> AddressBlock {
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    let common = (lo ^ hi).leading_zeros() as u8;
    let mask = get_cidr_mask(common).unwrap_or(0);
    AddressBlock {
        network: Ipv4Addr::from(lo & mask),
        prefix: common,
    }
}

/// Smallest block covering every input block.
///
/// When that block would be broader than `floor` the inputs are grouped by
/// their /16 and the covering block of the largest group is returned instead.
/// Equal-sized groups resolve to the one with the lowest base address.
pub fn covering_block(blocks: &[AddressBlock], floor: u8) -> Option<AddressBlock> {
    let lo = blocks.iter().map(|b| b.lo()).min()?;
    let hi = blocks.iter().map(|b| b.hi()).max()?;
    let exact = covering_range(lo, hi);
    if exact.prefix >= floor {
        return Some(exact);
    }

    let mut groups: BTreeMap<u32, Vec<&AddressBlock>> = BTreeMap::new();
    for block in blocks {
        groups.entry(block.lo() & 0xFFFF_0000).or_default().push(block);
    }
    let mut largest: Option<&Vec<&AddressBlock>> = None;
    for group in groups.values() {
        if largest.map_or(true, |l| group.len() > l.len()) {
            largest = Some(group);
        }
    }
    let group = largest?;
    log::debug!(
        "covering block {exact} broader than /{floor}, narrowed to a group of {} of {} blocks",
        group.len(),
        blocks.len()
    );
    let lo = group.iter().map(|b| b.lo()).min()?;
    let hi = group.iter().map(|b| b.hi()).max()?;
    Some(covering_range(lo, hi))
}

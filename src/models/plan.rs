//! Address plan and tunnel plan values.
//!
//! A plan is never edited in place. Every recompute or manual edit produces a
//! new [`AddressPlan`] and the caller swaps it in.

use super::AddressBlock;
use crate::processing::OverlapConflict;
use crate::strategy::AddressingMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Subnet assignment of one (site, VLAN) pair.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AddressPlanEntry {
    pub site_id: String,
    pub vlan_key: String,
    pub site_name: String,
    pub vlan_name: String,
    pub vlan_id: u32,
    pub hosts_needed: u32,
    /// `None` for a manual placeholder that has not been filled in yet.
    pub subnet: Option<AddressBlock>,
    pub gateway: Option<Ipv4Addr>,
    pub mode: AddressingMode,
    /// Entered by hand; survives recomputation.
    pub manual: bool,
}

impl AddressPlanEntry {
    pub fn key(&self) -> (&str, &str) {
        (&self.site_id, &self.vlan_key)
    }

    /// Human readable "site / vlan" label.
    pub fn label(&self) -> String {
        format!("{} / {}", self.site_name, self.vlan_name)
    }

    /// Set the subnet and derive its gateway.
    pub fn assign(&mut self, subnet: AddressBlock) {
        self.gateway = Some(subnet.gateway());
        self.subnet = Some(subnet);
    }

    /// True when the assigned block holds the requested hosts.
    pub fn fits(&self) -> bool {
        self.subnet
            .map(|s| s.usable_hosts() >= self.hosts_needed as u64)
            .unwrap_or(false)
    }
}

/// Result of one planning run.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressPlan {
    pub entries: Vec<AddressPlanEntry>,
    /// Solver parent of the last VLSM group, else the inferred covering block.
    pub parent: Option<AddressBlock>,
    /// Labels of pairs the solver found no space for.
    pub unallocated: Vec<String>,
    pub overlaps: Vec<OverlapConflict>,
}

impl AddressPlan {
    pub fn entry(&self, site_id: &str, vlan_key: &str) -> Option<&AddressPlanEntry> {
        self.entries
            .iter()
            .find(|e| e.site_id == site_id && e.vlan_key == vlan_key)
    }

    pub fn entries_for_site<'a>(
        &'a self,
        site_id: &'a str,
    ) -> impl Iterator<Item = &'a AddressPlanEntry> + 'a {
        self.entries.iter().filter(move |e| e.site_id == site_id)
    }

    /// Every assigned block, in plan order.
    pub fn allocated_blocks(&self) -> Vec<AddressBlock> {
        self.entries.iter().filter_map(|e| e.subnet).collect()
    }

    /// Manual placeholders still waiting for a subnet.
    pub fn pending_manual(&self) -> usize {
        self.entries.iter().filter(|e| e.subnet.is_none()).count()
    }

    pub fn is_clean(&self) -> bool {
        self.overlaps.is_empty() && self.unallocated.is_empty() && self.pending_manual() == 0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TunnelType {
    #[default]
    Wireguard,
    Ipsec,
    Gre,
    Vxlan,
}

impl fmt::Display for TunnelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TunnelType::Wireguard => "wireguard",
            TunnelType::Ipsec => "ipsec",
            TunnelType::Gre => "gre",
            TunnelType::Vxlan => "vxlan",
        };
        write!(f, "{name}")
    }
}

/// A point-to-point link between two sites.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TunnelPlanEntry {
    pub site_a: String,
    pub site_b: String,
    pub name: String,
    pub subnet: AddressBlock,
    pub address_a: Ipv4Addr,
    pub address_b: Ipv4Addr,
    pub tunnel_type: TunnelType,
    pub manual: bool,
}

impl TunnelPlanEntry {
    pub fn label(&self) -> String {
        format!("tunnel {}", self.name)
    }
}

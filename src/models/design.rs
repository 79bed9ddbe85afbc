//! The design document: everything the planner needs as input.

use super::{AddressBlock, Site, TunnelType, VlanConfig};
use crate::strategy::AddressingMode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Input of a planning run, as loaded from a design file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Design {
    pub supernet: AddressBlock,
    #[serde(default)]
    pub sites: Vec<Site>,
    #[serde(default)]
    pub vlans: VlanConfig,
    #[serde(default)]
    pub addressing: AddressingConfig,
    #[serde(default)]
    pub tunnels: TunnelConfig,
}

impl Design {
    pub fn new(supernet: AddressBlock) -> Design {
        Design {
            supernet,
            sites: Vec::new(),
            vlans: VlanConfig::default(),
            addressing: AddressingConfig::default(),
            tunnels: TunnelConfig::default(),
        }
    }

    pub fn site(&self, site_id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == site_id)
    }
}

/// Strategy selection and numeric strategy parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AddressingConfig {
    pub mode: AddressingMode,
    /// site id -> strategy. Sites not listed use `mode`.
    pub per_site: HashMap<String, AddressingMode>,
    /// Subnet prefix for the VLAN-aligned and site-in-octet strategies.
    pub vlan_aligned_prefix: u8,
    pub sequential_fixed_prefix: u8,
}

impl Default for AddressingConfig {
    fn default() -> Self {
        AddressingConfig {
            mode: AddressingMode::Vlsm,
            per_site: HashMap::new(),
            vlan_aligned_prefix: 24,
            sequential_fixed_prefix: 24,
        }
    }
}

impl AddressingConfig {
    pub fn mode_for(&self, site_id: &str) -> AddressingMode {
        self.per_site.get(site_id).copied().unwrap_or(self.mode)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TunnelTopology {
    #[default]
    None,
    FullMesh,
    HubSpoke,
    Manual,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AllocPosition {
    Start,
    #[default]
    End,
}

/// Where tunnel slots come from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum TunnelAllocation {
    /// A free aligned block carved out of the design supernet.
    FromSupernet {
        #[serde(default)]
        position: AllocPosition,
    },
    /// An explicit block outside the address plan.
    Separate { base: AddressBlock },
}

impl Default for TunnelAllocation {
    fn default() -> Self {
        TunnelAllocation::FromSupernet {
            position: AllocPosition::End,
        }
    }
}

/// A tunnel entered by hand. Strings are validated when the tunnel is accepted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ManualTunnel {
    pub site_a: String,
    pub site_b: String,
    pub subnet: String,
    #[serde(default)]
    pub address_a: Option<String>,
    #[serde(default)]
    pub address_b: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TunnelConfig {
    pub topology: TunnelTopology,
    pub tunnel_type: TunnelType,
    /// Hub site id for hub-spoke. Defaults to the first site.
    pub hub: Option<String>,
    pub allocation: TunnelAllocation,
    pub p2p_prefix: u8,
    pub manual: Vec<ManualTunnel>,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        TunnelConfig {
            topology: TunnelTopology::None,
            tunnel_type: TunnelType::Wireguard,
            hub: None,
            allocation: TunnelAllocation::default(),
            p2p_prefix: 30,
            manual: Vec::new(),
        }
    }
}

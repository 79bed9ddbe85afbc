//! Allocation strategies.
//!
//! Each strategy turns one partition of the design (sites sharing a strategy
//! and an effective supernet) into plan entries. Four are computed locally;
//! VLSM is delegated to the external solver and comes back as a
//! [`Allocation::Delegated`] job for the orchestrator to await.

mod manual;
mod sequential;
mod site_in_octet;
mod vlan_aligned;
pub mod vlsm;

use crate::models::{
    AddressBlock, AddressPlanEntry, AddressingConfig, Site, VlanNumbering, VlanRequirement,
};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use vlsm::VlsmJob;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AddressingMode {
    /// Best-fit allocation by the external solver.
    #[default]
    Vlsm,
    /// One /16 per site, VLAN tag in the third octet.
    VlanAligned,
    /// Site index in the second octet, VLAN tag in the third.
    SiteInOctet,
    /// Equal blocks packed back to back.
    SequentialFixed,
    /// Every subnet entered by hand.
    Manual,
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddressingMode::Vlsm => "vlsm",
            AddressingMode::VlanAligned => "vlan-aligned",
            AddressingMode::SiteInOctet => "site-in-octet",
            AddressingMode::SequentialFixed => "sequential-fixed",
            AddressingMode::Manual => "manual",
        };
        write!(f, "{name}")
    }
}

/// One partition of the design handed to a strategy.
#[derive(Debug, Clone)]
pub struct StrategyInput<'a> {
    pub supernet: AddressBlock,
    /// Sites of this partition, in design order.
    pub sites: Vec<&'a Site>,
    /// Requirements of those sites, site-then-VLAN order.
    pub requirements: Vec<&'a VlanRequirement>,
    pub addressing: &'a AddressingConfig,
    pub numbering: &'a VlanNumbering,
}

impl<'a> StrategyInput<'a> {
    pub fn requirements_for<'s>(
        &'s self,
        site_id: &'s str,
    ) -> impl Iterator<Item = &'a VlanRequirement> + 's {
        self.requirements
            .iter()
            .copied()
            .filter(move |r| r.site_id == site_id)
    }
}

/// Output of a strategy.
#[derive(Debug)]
pub enum Allocation {
    Ready(Vec<AddressPlanEntry>),
    Delegated(VlsmJob),
}

impl AddressingMode {
    /// Capacity and constraint messages for a partition. Empty means go.
    pub fn validate(self, input: &StrategyInput) -> Vec<String> {
        match self {
            AddressingMode::Vlsm => vlsm::validate(input),
            AddressingMode::VlanAligned => vlan_aligned::validate(input),
            AddressingMode::SiteInOctet => site_in_octet::validate(input),
            AddressingMode::SequentialFixed => sequential::validate(input),
            AddressingMode::Manual => Vec::new(),
        }
    }

    /// Allocate a partition. Call only after [`AddressingMode::validate`] passed.
    pub fn allocate(self, input: &StrategyInput) -> Allocation {
        match self {
            AddressingMode::Vlsm => Allocation::Delegated(vlsm::prepare(input)),
            AddressingMode::VlanAligned => Allocation::Ready(vlan_aligned::build(input)),
            AddressingMode::SiteInOctet => Allocation::Ready(site_in_octet::build(input)),
            AddressingMode::SequentialFixed => Allocation::Ready(sequential::build(input)),
            AddressingMode::Manual => Allocation::Ready(manual::build(input)),
        }
    }
}

/// Unassigned entry for a requirement.
pub(crate) fn new_entry(req: &VlanRequirement, mode: AddressingMode) -> AddressPlanEntry {
    AddressPlanEntry {
        site_id: req.site_id.clone(),
        vlan_key: req.vlan_key.clone(),
        site_name: req.site_name.clone(),
        vlan_name: req.name.clone(),
        vlan_id: req.vlan_id,
        hosts_needed: req.hosts,
        subnet: None,
        gateway: None,
        mode,
        manual: false,
    }
}

/// Entry with `subnet` assigned.
pub(crate) fn assigned_entry(
    req: &VlanRequirement,
    mode: AddressingMode,
    subnet: AddressBlock,
) -> AddressPlanEntry {
    let mut entry = new_entry(req, mode);
    entry.assign(subnet);
    entry
}

/// Check a configured subnet prefix against its allowed range.
pub(crate) fn check_prefix_range(name: &str, prefix: u8, min: u8, max: u8) -> Option<String> {
    if prefix < min || prefix > max {
        Some(format!(
            "{name} subnet prefix /{prefix} is out of range (/{min} to /{max})"
        ))
    } else {
        None
    }
}

/// First requirement whose tag does not fit in one octet.
pub(crate) fn check_tag_octet(input: &StrategyInput) -> Option<String> {
    input.requirements.iter().find(|r| r.vlan_id > 255).map(|r| {
        format!(
            "VLAN IDs must be 0-255 for 3rd-octet mapping. VLAN '{}' at site '{}' resolves to {}",
            r.name, r.site_name, r.vlan_id
        )
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::VlanRequirement;

    pub fn sites(n: usize) -> Vec<Site> {
        (0..n)
            .map(|i| Site::new(&format!("s{i}"), &format!("Site{i}")))
            .collect()
    }

    /// `tags` replicated over every site, 50 hosts each.
    pub fn requirements(sites: &[Site], tags: &[u32], site_offset: u32) -> Vec<VlanRequirement> {
        let mut reqs = Vec::new();
        for (i, site) in sites.iter().enumerate() {
            for tag in tags {
                reqs.push(VlanRequirement {
                    site_id: site.id.clone(),
                    site_name: site.name.clone(),
                    site_index: i,
                    vlan_key: format!("v{tag}"),
                    vlan_id: tag + i as u32 * site_offset,
                    name: format!("Vlan{tag}"),
                    purpose: String::new(),
                    hosts: 50,
                });
            }
        }
        reqs
    }

    pub fn input<'a>(
        supernet: &str,
        sites: &'a [Site],
        reqs: &'a [VlanRequirement],
        addressing: &'a AddressingConfig,
        numbering: &'a VlanNumbering,
    ) -> StrategyInput<'a> {
        StrategyInput {
            supernet: AddressBlock::new(supernet).unwrap(),
            sites: sites.iter().collect(),
            requirements: reqs.iter().collect(),
            addressing,
            numbering,
        }
    }
}

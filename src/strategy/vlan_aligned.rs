//! VLAN-aligned addressing: the VLAN tag is the third octet.
//!
//! With the same tags on every site each site gets its own /16 out of the
//! supernet (site position × 2^16). With per-site numbering the tags are
//! already unique, so all sites share the first /16.

use super::{assigned_entry, check_prefix_range, check_tag_octet, AddressingMode, StrategyInput};
use crate::models::{AddressBlock, AddressPlanEntry, NumberingScheme};
use std::collections::HashSet;

pub(super) fn validate(input: &StrategyInput) -> Vec<String> {
    let mut errors = Vec::new();
    let prefix = input.supernet.prefix();
    let per_site = input.numbering.scheme == NumberingScheme::PerSite;

    if let Some(e) = check_prefix_range("VLAN-aligned", input.addressing.vlan_aligned_prefix, 24, 28)
    {
        errors.push(e);
    }

    if prefix > 16 {
        errors.push(format!(
            "VLAN-aligned mode requires a supernet of /16 or larger, {} is /{prefix}",
            input.supernet
        ));
    }

    if !per_site {
        let available: u64 = if prefix <= 16 { 1 << (16 - prefix) } else { 0 };
        if input.sites.len() as u64 > available {
            errors.push(format!(
                "With same VLAN IDs per site, supernet /{prefix} provides {available} /16 block(s), but {} sites are defined. Use a larger supernet or switch to unique-per-site numbering.",
                input.sites.len()
            ));
        }
    }

    if let Some(e) = check_tag_octet(input) {
        errors.push(e);
        return errors;
    }

    if per_site {
        let mut used = HashSet::new();
        for req in &input.requirements {
            if !used.insert(req.vlan_id) {
                errors.push(format!(
                    "Duplicate 3rd-octet value {} across sites. Adjust VLAN IDs or site offset to avoid collisions.",
                    req.vlan_id
                ));
                break;
            }
        }
    }

    errors
}

pub(super) fn build(input: &StrategyInput) -> Vec<AddressPlanEntry> {
    let base16 = input.supernet.lo() & 0xFFFF_0000;
    let subnet_prefix = input.addressing.vlan_aligned_prefix;
    let per_site = input.numbering.scheme == NumberingScheme::PerSite;
    let mut entries = Vec::new();

    for (pos, site) in input.sites.iter().enumerate() {
        let site_base = if per_site {
            base16
        } else {
            base16.wrapping_add((pos as u32) << 16)
        };
        for req in input.requirements_for(&site.id) {
            let subnet_num = (site_base & 0xFFFF_0000) | ((req.vlan_id & 0xFF) << 8);
            match AddressBlock::from_numeric(subnet_num, subnet_prefix) {
                Ok(subnet) => entries.push(assigned_entry(req, AddressingMode::VlanAligned, subnet)),
                Err(e) => log::error!("vlan-aligned: {e}"),
            }
        }
    }

    entries
}

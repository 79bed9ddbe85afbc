//! Sequential fixed-size addressing.
//!
//! Packs every (site, VLAN) pair into equal blocks, back to back from the
//! supernet base, in site-then-VLAN order.

use super::{assigned_entry, check_prefix_range, AddressingMode, StrategyInput};
use crate::models::{block_size, AddressBlock, AddressPlanEntry};

pub(super) fn validate(input: &StrategyInput) -> Vec<String> {
    let mut errors = Vec::new();
    let super_prefix = input.supernet.prefix();
    let sub_prefix = input.addressing.sequential_fixed_prefix;

    if let Some(e) = check_prefix_range("Sequential-fixed", sub_prefix, 22, 28) {
        errors.push(e);
    }

    if sub_prefix <= super_prefix {
        errors.push(format!(
            "Subnet prefix /{sub_prefix} must be larger than supernet /{super_prefix}"
        ));
        return errors;
    }

    let needed = input.requirements.len() as u64;
    let available = 1u64 << (sub_prefix - super_prefix).min(32);
    if needed > available {
        errors.push(format!(
            "Need {needed} /{sub_prefix} subnets but supernet /{super_prefix} only contains {available}"
        ));
    }

    errors
}

pub(super) fn build(input: &StrategyInput) -> Vec<AddressPlanEntry> {
    let sub_prefix = input.addressing.sequential_fixed_prefix;
    let step = block_size(sub_prefix);
    let base = input.supernet.lo() as u64;
    let mut offset = 0u64;
    let mut entries = Vec::new();

    for site in &input.sites {
        for req in input.requirements_for(&site.id) {
            let subnet_num = (base + offset) as u32;
            match AddressBlock::from_numeric(subnet_num, sub_prefix) {
                Ok(subnet) => {
                    entries.push(assigned_entry(req, AddressingMode::SequentialFixed, subnet))
                }
                Err(e) => log::error!("sequential-fixed: {e}"),
            }
            offset += step;
        }
    }

    entries
}

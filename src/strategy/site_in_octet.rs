//! Site-in-octet addressing: `{first}.{site + 1}.{vlan}.0/{prefix}`.

use super::{assigned_entry, check_prefix_range, check_tag_octet, AddressingMode, StrategyInput};
use crate::models::{AddressBlock, AddressPlanEntry};

/// Second-octet values 1-254 are available for sites.
pub const MAX_SITES: usize = 254;

pub(super) fn validate(input: &StrategyInput) -> Vec<String> {
    let mut errors = Vec::new();
    let prefix = input.supernet.prefix();

    if let Some(e) = check_prefix_range("Site-in-octet", input.addressing.vlan_aligned_prefix, 24, 28)
    {
        errors.push(e);
    }

    if prefix > 8 {
        errors.push(format!(
            "Site-in-octet mode requires a supernet of /8 or larger, {} is /{prefix}",
            input.supernet
        ));
    }

    if input.sites.len() > MAX_SITES {
        errors.push(format!(
            "Maximum {MAX_SITES} sites supported (2nd octet 1-254), but {} defined",
            input.sites.len()
        ));
    }

    if let Some(e) = check_tag_octet(input) {
        errors.push(e);
    }

    errors
}

pub(super) fn build(input: &StrategyInput) -> Vec<AddressPlanEntry> {
    let first_octet = input.supernet.network().octets()[0] as u32;
    let subnet_prefix = input.addressing.vlan_aligned_prefix;
    let mut entries = Vec::new();

    for (pos, site) in input.sites.iter().enumerate() {
        let site_octet = (pos as u32 + 1) & 0xFF;
        for req in input.requirements_for(&site.id) {
            let subnet_num = (first_octet << 24) | (site_octet << 16) | ((req.vlan_id & 0xFF) << 8);
            match AddressBlock::from_numeric(subnet_num, subnet_prefix) {
                Ok(subnet) => entries.push(assigned_entry(req, AddressingMode::SiteInOctet, subnet)),
                Err(e) => log::error!("site-in-octet: {e}"),
            }
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::models::{AddressingConfig, VlanNumbering};

    #[test]
    fn test_site_in_second_octet() {
        let sites = fixtures::sites(3);
        let reqs = fixtures::requirements(&sites, &[10, 30], 0);
        let cfg = AddressingConfig {
            vlan_aligned_prefix: 26,
            ..Default::default()
        };
        let numbering = VlanNumbering::default();
        let input = fixtures::input("10.0.0.0/8", &sites, &reqs, &cfg, &numbering);

        assert!(validate(&input).is_empty());
        let entries = build(&input);
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0].subnet.unwrap().to_string(), "10.1.10.0/26");
        assert_eq!(entries[3].subnet.unwrap().to_string(), "10.2.30.0/26");
        assert_eq!(entries[5].subnet.unwrap().to_string(), "10.3.30.0/26");
        assert_eq!(entries[5].gateway.unwrap().to_string(), "10.3.30.1");
    }

    #[test]
    fn test_requires_slash8() {
        let sites = fixtures::sites(1);
        let reqs = fixtures::requirements(&sites, &[10], 0);
        let cfg = AddressingConfig::default();
        let numbering = VlanNumbering::default();
        let input = fixtures::input("10.0.0.0/16", &sites, &reqs, &cfg, &numbering);

        let errors = validate(&input);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("/8 or larger"));
    }

    #[test]
    fn test_tag_beyond_octet() {
        let sites = fixtures::sites(3);
        let reqs = fixtures::requirements(&sites, &[60], 100);
        let cfg = AddressingConfig::default();
        let numbering = VlanNumbering::default();
        let input = fixtures::input("10.0.0.0/8", &sites, &reqs, &cfg, &numbering);

        let errors = validate(&input);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("resolves to 260"));
    }
}

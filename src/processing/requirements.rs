//! Resolution of VLAN input into per-site requirements.
//!
//! Applies per-site skips, host-count and name overrides, and per-site VLAN
//! numbering, producing one [`VlanRequirement`] per (site, VLAN) pair in
//! site-then-VLAN order.

use crate::models::{Design, VlanMode, VlanRequirement, MAX_VLAN_ID};
use std::collections::HashSet;

/// Every (site, VLAN) pair that needs a subnet.
pub fn resolve_requirements(design: &Design) -> Vec<VlanRequirement> {
    let vlans = &design.vlans;
    let mut requirements = Vec::new();

    for (site_index, site) in design.sites.iter().enumerate() {
        match vlans.mode {
            VlanMode::Template => {
                for tpl in &vlans.templates {
                    let ovr = vlans.override_for(&site.id, &tpl.id);
                    if ovr.map(|o| o.skip).unwrap_or(false) {
                        log::debug!("skip template '{}' at site '{}'", tpl.name, site.name);
                        continue;
                    }
                    requirements.push(VlanRequirement {
                        site_id: site.id.clone(),
                        site_name: site.name.clone(),
                        site_index,
                        vlan_key: tpl.id.clone(),
                        vlan_id: vlans.numbering.effective_vlan_id(tpl.vlan_id, site_index),
                        name: ovr
                            .and_then(|o| o.name.clone())
                            .unwrap_or_else(|| tpl.name.clone()),
                        purpose: tpl.purpose.clone(),
                        hosts: ovr.and_then(|o| o.hosts_needed).unwrap_or(tpl.hosts_needed),
                    });
                }
            }
            VlanMode::Manual => {
                for vlan in vlans.per_site.get(&site.id).into_iter().flatten() {
                    requirements.push(VlanRequirement {
                        site_id: site.id.clone(),
                        site_name: site.name.clone(),
                        site_index,
                        vlan_key: vlan.id.clone(),
                        vlan_id: vlan.vlan_id as u32,
                        name: vlan.name.clone(),
                        purpose: vlan.purpose.clone(),
                        hosts: vlan.hosts_needed,
                    });
                }
            }
        }
    }

    requirements
}

/// Constraint messages that apply whatever strategy is chosen.
pub fn validate_requirements(requirements: &[VlanRequirement]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for req in requirements {
        if req.vlan_id > MAX_VLAN_ID {
            errors.push(format!(
                "VLAN '{}' at site '{}' resolves to tag {} (must be 0-{MAX_VLAN_ID})",
                req.name, req.site_name, req.vlan_id
            ));
        }
        if !seen.insert((req.site_id.as_str(), req.vlan_key.as_str())) {
            errors.push(format!(
                "VLAN '{}' is defined twice at site '{}'",
                req.vlan_key, req.site_name
            ));
        }
    }

    errors
}

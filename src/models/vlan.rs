//! VLAN definitions, per-site overrides and numbering.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Highest assignable 802.1Q VLAN tag.
pub const MAX_VLAN_ID: u32 = 4094;

/// A VLAN as entered by the user, either as a template or for a single site.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VlanDefinition {
    pub id: String,
    pub vlan_id: u16,
    pub name: String,
    #[serde(default)]
    pub purpose: String,
    pub hosts_needed: u32,
}

impl VlanDefinition {
    pub fn new(id: &str, vlan_id: u16, name: &str, hosts_needed: u32) -> VlanDefinition {
        VlanDefinition {
            id: id.to_string(),
            vlan_id,
            name: name.to_string(),
            purpose: String::new(),
            hosts_needed,
        }
    }
}

/// Per-site adjustment of one template.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteOverride {
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub hosts_needed: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum VlanMode {
    /// Templates replicated on every site.
    #[default]
    Template,
    /// VLANs defined independently per site.
    Manual,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NumberingScheme {
    /// Every site reuses the template tags.
    #[default]
    Same,
    /// Tags are shifted by `site_offset` per site index.
    PerSite,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct VlanNumbering {
    pub scheme: NumberingScheme,
    pub start_id: u16,
    pub step: u16,
    pub site_offset: u16,
}

impl Default for VlanNumbering {
    fn default() -> Self {
        VlanNumbering {
            scheme: NumberingScheme::Same,
            start_id: 10,
            step: 10,
            site_offset: 100,
        }
    }
}

impl VlanNumbering {
    /// Tag a template resolves to at a given site index.
    ///
    /// Returned wider than u16 so callers can report tags that overflow.
    pub fn effective_vlan_id(&self, base: u16, site_index: usize) -> u32 {
        match self.scheme {
            NumberingScheme::Same => base as u32,
            NumberingScheme::PerSite => base as u32 + site_index as u32 * self.site_offset as u32,
        }
    }

    /// Suggested tag for the next template after `existing` ones.
    pub fn next_template_id(&self, existing: usize) -> u32 {
        self.start_id as u32 + existing as u32 * self.step as u32
    }
}

/// All VLAN input of a design.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct VlanConfig {
    pub mode: VlanMode,
    pub templates: Vec<VlanDefinition>,
    /// site id -> template id -> override
    pub overrides: HashMap<String, HashMap<String, SiteOverride>>,
    /// site id -> VLANs of that site (manual mode)
    pub per_site: HashMap<String, Vec<VlanDefinition>>,
    pub numbering: VlanNumbering,
}

impl VlanConfig {
    pub fn override_for(&self, site_id: &str, template_id: &str) -> Option<&SiteOverride> {
        self.overrides.get(site_id)?.get(template_id)
    }
}

/// One (site, VLAN) pair that needs a subnet, after overrides and numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanRequirement {
    pub site_id: String,
    pub site_name: String,
    /// Position of the site in the design.
    pub site_index: usize,
    /// Identity of the VLAN definition this came from.
    pub vlan_key: String,
    /// Effective tag after per-site numbering.
    pub vlan_id: u32,
    pub name: String,
    pub purpose: String,
    pub hosts: u32,
}

/// Named set of VLAN templates.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VlanPreset {
    pub id: String,
    pub name: String,
    pub templates: Vec<VlanDefinition>,
}

fn preset(id: &str, name: &str, rows: &[(u16, &str, &str, u32)]) -> VlanPreset {
    VlanPreset {
        id: id.to_string(),
        name: name.to_string(),
        templates: rows
            .iter()
            .map(|(vlan_id, name, purpose, hosts)| VlanDefinition {
                id: format!("{id}-{vlan_id}"),
                vlan_id: *vlan_id,
                name: name.to_string(),
                purpose: purpose.to_string(),
                hosts_needed: *hosts,
            })
            .collect(),
    }
}

/// Presets shipped with the planner.
pub fn builtin_presets() -> Vec<VlanPreset> {
    vec![
        preset(
            "preset-office",
            "Office",
            &[
                (10, "Management", "Network management", 10),
                (20, "Users", "End-user workstations", 100),
                (30, "Voice", "VoIP phones", 50),
                (40, "Printers", "Printers & peripherals", 10),
                (50, "Guest", "Guest Wi-Fi", 30),
            ],
        ),
        preset(
            "preset-datacenter",
            "Data Center",
            &[
                (10, "Management", "Out-of-band management", 20),
                (20, "Servers", "Production servers", 200),
                (30, "Storage", "SAN / NAS traffic", 30),
                (40, "Backup", "Backup network", 20),
                (50, "DMZ", "Internet-facing services", 20),
            ],
        ),
        preset(
            "preset-branch",
            "Branch",
            &[
                (10, "Management", "Network management", 5),
                (20, "Users", "End-user devices", 30),
                (30, "Guest", "Guest access", 10),
            ],
        ),
    ]
}

//! Domain models for the address planner.
//!
//! - [`AddressBlock`] - normalized IPv4 CIDR block and its arithmetic
//! - [`Site`] and the VLAN types - what the user designs
//! - [`AddressPlan`] and [`TunnelPlanEntry`] - what the planner produces
//! - [`Design`] - the input document tying it together

mod design;
mod ipv4;
mod plan;
mod site;
mod vlan;

// Re-export public types
pub use design::{
    AddressingConfig, AllocPosition, Design, ManualTunnel, TunnelAllocation, TunnelConfig,
    TunnelTopology,
};
pub use ipv4::{
    address_to_numeric, block_size, covering_block, covering_range, get_cidr_mask,
    numeric_to_address, parse, parse_address, prefix_for_addresses, usable_host_count,
    AddressBlock, SubnetDetails, SubnetInfo, COVERING_FLOOR, MAX_LENGTH,
};
pub use plan::{AddressPlan, AddressPlanEntry, TunnelPlanEntry, TunnelType};
pub use site::Site;
pub use vlan::{
    builtin_presets, NumberingScheme, SiteOverride, VlanConfig, VlanDefinition, VlanMode,
    VlanNumbering, VlanPreset, VlanRequirement, MAX_VLAN_ID,
};

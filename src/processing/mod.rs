//! Planning logic.
//!
//! - [`requirements`] - VLAN input resolved into (site, VLAN) requirements
//! - [`orchestrator`] - per-site strategies merged into one plan
//! - [`overlap`] - overlapping block detection
//! - [`tunnel`] - point-to-point tunnel planning
//! - [`summary`] - per-site summary routes

pub mod orchestrator;
pub mod overlap;
pub mod requirements;
pub mod summary;
pub mod tunnel;

// Re-export public functions
pub use orchestrator::{compute_address_plan, partition_sites, set_manual_subnet, Partition};
pub use overlap::{
    check_candidate, find_overlaps, log_overlaps, ranges_overlap, tunnel_overlaps,
    validate_overlaps, LabeledRange, OverlapConflict,
};
pub use requirements::{resolve_requirements, validate_requirements};
pub use summary::{compute_site_summaries, SiteSummaryRoute};
pub use tunnel::{
    accept_manual_tunnel, build_tunnel_plan, infer_tunnel_block, plan_tunnels, required_slots,
    slot_count, tunnel_slots, TunnelPlan, TunnelSlot,
};

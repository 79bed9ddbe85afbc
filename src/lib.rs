//! IPv4 address space planning for multi-site networks.
//!
//! A [`models::Design`] (supernet, sites, VLANs, strategy choice, tunnel
//! topology) goes in; an [`models::AddressPlan`] with per-VLAN subnets and
//! gateways, a tunnel plan, overlap reports and per-site summary routes come
//! out.

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod processing;
pub mod session;
pub mod solver;
pub mod strategy;

use error::{PlanError, TunnelError};
use models::{AddressPlan, Design};
use processing::{
    build_tunnel_plan, compute_address_plan, compute_site_summaries, tunnel_overlaps,
    OverlapConflict, SiteSummaryRoute, TunnelPlan,
};
use solver::VlsmSolver;

/// Everything one planning run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanReport {
    pub plan: AddressPlan,
    pub tunnels: TunnelPlan,
    /// Set when the tunnel plan could not be built at all.
    pub tunnel_error: Option<TunnelError>,
    /// Overlaps involving a tunnel. Plan-only overlaps stay on `plan`.
    pub tunnel_overlaps: Vec<OverlapConflict>,
    pub summaries: Vec<SiteSummaryRoute>,
}

/// Compute the address plan, then tunnels and summaries on top of it.
///
/// Only the address plan can fail the run. Tunnel problems are reported on
/// the returned report.
pub async fn build_report<S>(
    design: &Design,
    solver: &S,
    previous: Option<&AddressPlan>,
) -> Result<PlanReport, PlanError>
where
    S: VlsmSolver + ?Sized,
{
    let plan = compute_address_plan(design, solver, previous).await?;

    let (tunnels, tunnel_error) = match build_tunnel_plan(design, &plan) {
        Ok(t) => (t, None),
        Err(e) => {
            log::warn!("tunnel plan failed: {e}");
            (TunnelPlan::default(), Some(e))
        }
    };

    let tunnel_overlaps: Vec<OverlapConflict> = tunnel_overlaps(&plan, &tunnels.entries)
        .into_iter()
        .filter(|c| !plan.overlaps.contains(c))
        .collect();
    if !tunnel_overlaps.is_empty() {
        log::warn!("{} tunnel overlap(s)", tunnel_overlaps.len());
    }

    let summaries = compute_site_summaries(design, &plan);

    Ok(PlanReport {
        plan,
        tunnels,
        tunnel_error,
        tunnel_overlaps,
        summaries,
    })
}

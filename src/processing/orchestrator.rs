//! Per-site strategy orchestration.
//!
//! Splits the design into partitions of sites sharing a strategy and an
//! effective supernet, runs each partition's strategy, awaits the VLSM solver
//! group by group, then merges everything into one [`AddressPlan`].

use super::overlap::{entry_ranges, find_overlaps, log_overlaps};
use super::requirements::{resolve_requirements, validate_requirements};
use crate::error::PlanError;
use crate::models::{
    covering_block, AddressBlock, AddressPlan, AddressPlanEntry, Design, Site, VlanRequirement,
    COVERING_FLOOR,
};
use crate::solver::VlsmSolver;
use crate::strategy::{assigned_entry, AddressingMode, Allocation, StrategyInput};
use std::collections::HashMap;

/// Sites sharing one strategy and one effective supernet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<'a> {
    pub mode: AddressingMode,
    pub supernet: AddressBlock,
    pub sites: Vec<&'a Site>,
}

/// Group sites by (strategy, effective supernet), in order of first appearance.
pub fn partition_sites(design: &Design) -> Vec<Partition<'_>> {
    let mut partitions: Vec<Partition> = Vec::new();
    for site in &design.sites {
        let mode = design.addressing.mode_for(&site.id);
        let supernet = site.effective_supernet(design.supernet);
        match partitions
            .iter_mut()
            .find(|p| p.mode == mode && p.supernet == supernet)
        {
            Some(p) => p.sites.push(site),
            None => partitions.push(Partition {
                mode,
                supernet,
                sites: vec![site],
            }),
        }
    }
    partitions
}

fn strategy_input<'a>(
    design: &'a Design,
    partition: &Partition<'a>,
    requirements: &'a [VlanRequirement],
) -> StrategyInput<'a> {
    StrategyInput {
        supernet: partition.supernet,
        sites: partition.sites.clone(),
        requirements: requirements
            .iter()
            .filter(|r| partition.sites.iter().any(|s| s.id == r.site_id))
            .collect(),
        addressing: &design.addressing,
        numbering: &design.vlans.numbering,
    }
}

/// Compute a fresh address plan for `design`.
///
/// Every constraint message of every partition is collected before anything
/// is allocated; any message aborts the run with [`PlanError::Constraint`].
/// Manual entries of `previous` whose (site, VLAN) key still exists keep their
/// subnet whatever strategy now covers the site; those pairs are never handed
/// to a strategy, so they take no space there. A solver failure aborts the run
/// and leaves `previous` as it was.
pub async fn compute_address_plan<S>(
    design: &Design,
    solver: &S,
    previous: Option<&AddressPlan>,
) -> Result<AddressPlan, PlanError>
where
    S: VlsmSolver + ?Sized,
{
    let requirements = resolve_requirements(design);
    let partitions = partition_sites(design);
    log::debug!(
        "{} requirement(s) over {} site(s) in {} partition(s)",
        requirements.len(),
        design.sites.len(),
        partitions.len()
    );

    let mut errors = validate_requirements(&requirements);
    let mut inputs: Vec<(AddressingMode, StrategyInput)> = partitions
        .iter()
        .map(|p| (p.mode, strategy_input(design, p, &requirements)))
        .collect();
    let pinned = previous.map(pin_manual).unwrap_or_default();
    let mut entries: Vec<AddressPlanEntry> = Vec::new();
    for (mode, input) in inputs.iter_mut() {
        let mode = *mode;
        input.requirements.retain(|req| {
            match pinned.get(&(req.site_id.as_str(), req.vlan_key.as_str())) {
                Some(&subnet) => {
                    log::debug!("keeping manual {subnet} for {} / {}", req.site_name, req.name);
                    let mut entry = assigned_entry(req, mode, subnet);
                    entry.manual = true;
                    entries.push(entry);
                    false
                }
                None => true,
            }
        });
    }
    for (mode, input) in &inputs {
        let found = mode.validate(input);
        if inputs.len() > 1 {
            errors.extend(
                found
                    .into_iter()
                    .map(|e| format!("{mode} in {}: {e}", input.supernet)),
            );
        } else {
            errors.extend(found);
        }
    }
    if !errors.is_empty() {
        log::warn!("address plan blocked by {} constraint(s)", errors.len());
        return Err(PlanError::Constraint(errors));
    }

    let mut unallocated = Vec::new();
    let mut vlsm_parent: Option<Option<AddressBlock>> = None;

    for (mode, input) in &inputs {
        match mode.allocate(input) {
            Allocation::Ready(ready) => {
                log::debug!("{mode} in {}: {} entries", input.supernet, ready.len());
                entries.extend(ready);
            }
            Allocation::Delegated(job) => {
                if job.is_empty() {
                    continue;
                }
                log::info!(
                    "VLSM: solving {} requirement(s) in {}",
                    job.request.requirements.len(),
                    job.supernet
                );
                let response = solver.solve(&job.request).await?;
                let merged = job.merge(response)?;
                entries.extend(merged.entries);
                unallocated.extend(merged.unallocated);
                vlsm_parent = Some(merged.parent);
            }
        }
    }

    // site-then-VLAN order, whichever strategy produced the entry
    let order: HashMap<(&str, &str), usize> = requirements
        .iter()
        .enumerate()
        .map(|(i, r)| ((r.site_id.as_str(), r.vlan_key.as_str()), i))
        .collect();
    entries.sort_by_key(|e| order.get(&e.key()).copied().unwrap_or(usize::MAX));

    let parent = match vlsm_parent {
        Some(parent) => parent,
        None => {
            let blocks: Vec<AddressBlock> = entries.iter().filter_map(|e| e.subnet).collect();
            covering_block(&blocks, COVERING_FLOOR)
        }
    };

    let overlaps = find_overlaps(&entry_ranges(&entries));
    log_overlaps(&overlaps);

    let plan = AddressPlan {
        entries,
        parent,
        unallocated,
        overlaps,
    };
    log::info!(
        "Address plan computed: {} entries, {} pending manual, {} unallocated",
        plan.entries.len(),
        plan.pending_manual(),
        plan.unallocated.len()
    );
    Ok(plan)
}

/// Filled manual subnets of `previous`, by (site, VLAN) key.
fn pin_manual(previous: &AddressPlan) -> HashMap<(&str, &str), AddressBlock> {
    previous
        .entries
        .iter()
        .filter(|e| e.manual)
        .filter_map(|e| e.subnet.map(|subnet| (e.key(), subnet)))
        .collect()
}

/// New plan with one entry set by hand and overlaps re-evaluated.
pub fn set_manual_subnet(
    plan: &AddressPlan,
    site_id: &str,
    vlan_key: &str,
    cidr: &str,
) -> Result<AddressPlan, PlanError> {
    let subnet = AddressBlock::new(cidr)?;
    let mut next = plan.clone();
    let entry = next
        .entries
        .iter_mut()
        .find(|e| e.site_id == site_id && e.vlan_key == vlan_key)
        .ok_or_else(|| PlanError::UnknownEntry {
            site: site_id.to_string(),
            vlan: vlan_key.to_string(),
        })?;
    entry.assign(subnet);
    entry.manual = true;
    log::info!("manual subnet {subnet} set for {}", entry.label());

    next.overlaps = find_overlaps(&entry_ranges(&next.entries));
    log_overlaps(&next.overlaps);
    Ok(next)
}

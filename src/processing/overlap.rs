//! Overlapping block detection.
//!
//! Runs over the complete plan (every site, every strategy, tunnels too) and
//! reports each colliding pair. Never fails: a clean plan yields an empty list.

use crate::error::CidrError;
use crate::models::{AddressBlock, AddressPlan, AddressPlanEntry, TunnelPlanEntry};
use serde::Serialize;
use std::fmt;

/// A block together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledRange {
    pub label: String,
    pub block: AddressBlock,
}

impl LabeledRange {
    pub fn new(label: impl Into<String>, block: AddressBlock) -> LabeledRange {
        LabeledRange {
            label: label.into(),
            block,
        }
    }
}

/// Two ranges sharing at least one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapConflict {
    pub first: LabeledRange,
    pub second: LabeledRange,
}

impl fmt::Display for OverlapConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) overlaps {} ({})",
            self.first.label, self.first.block, self.second.label, self.second.block
        )
    }
}

/// Closed-interval intersection test on numeric bounds.
pub fn ranges_overlap(a_lo: u32, a_hi: u32, b_lo: u32, b_hi: u32) -> bool {
    a_lo <= b_hi && b_lo <= a_hi
}

/// Find every overlapping pair, in input order.
///
/// Quadratic, which is fine for the tens of subnets in one design.
pub fn find_overlaps(ranges: &[LabeledRange]) -> Vec<OverlapConflict> {
    let mut conflicts = Vec::new();
    for (i, a) in ranges.iter().enumerate() {
        for b in &ranges[i + 1..] {
            if ranges_overlap(a.block.lo(), a.block.hi(), b.block.lo(), b.block.hi()) {
                conflicts.push(OverlapConflict {
                    first: a.clone(),
                    second: b.clone(),
                });
            }
        }
    }
    conflicts
}

/// Conflicts between one candidate and an existing set.
pub fn check_candidate(candidate: &LabeledRange, existing: &[LabeledRange]) -> Vec<OverlapConflict> {
    existing
        .iter()
        .filter(|e| candidate.block.overlaps(&e.block))
        .map(|e| OverlapConflict {
            first: candidate.clone(),
            second: e.clone(),
        })
        .collect()
}

/// Validate raw CIDR strings, labelling each by itself.
pub fn validate_overlaps(cidrs: &[&str]) -> Result<Vec<String>, CidrError> {
    let ranges = cidrs
        .iter()
        .map(|c| AddressBlock::new(c).map(|b| LabeledRange::new(c.trim(), b)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(find_overlaps(&ranges)
        .iter()
        .map(|c| c.to_string())
        .collect())
}

/// Ranges of every assigned entry.
pub fn entry_ranges(entries: &[AddressPlanEntry]) -> Vec<LabeledRange> {
    entries
        .iter()
        .filter_map(|e| e.subnet.map(|s| LabeledRange::new(e.label(), s)))
        .collect()
}

pub fn plan_ranges(plan: &AddressPlan) -> Vec<LabeledRange> {
    entry_ranges(&plan.entries)
}

pub fn tunnel_ranges(tunnels: &[TunnelPlanEntry]) -> Vec<LabeledRange> {
    tunnels
        .iter()
        .map(|t| LabeledRange::new(t.label(), t.subnet))
        .collect()
}

/// Overlaps across the address plan and the tunnel plan together.
pub fn tunnel_overlaps(plan: &AddressPlan, tunnels: &[TunnelPlanEntry]) -> Vec<OverlapConflict> {
    let mut ranges = plan_ranges(plan);
    ranges.extend(tunnel_ranges(tunnels));
    find_overlaps(&ranges)
}

/// Log overlap conflicts as warnings.
pub fn log_overlaps(conflicts: &[OverlapConflict]) {
    if conflicts.is_empty() {
        log::info!("No overlapping subnets found.");
        return;
    }

    log::warn!("Found {} overlapping subnet pair(s):", conflicts.len());
    for conflict in conflicts {
        log::warn!("  {conflict}");
    }
}

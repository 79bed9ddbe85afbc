//! Delegated VLSM: requests for the external solver and merging its answer.
//!
//! Requirements are sent under opaque correlation keys (`req-<n>`) instead of
//! display names, so renamed or look-alike sites and VLANs cannot be confused
//! when allocations come back.

use super::{assigned_entry, AddressingMode, StrategyInput};
use crate::error::PlanError;
use crate::models::{AddressBlock, AddressPlanEntry, VlanRequirement};
use crate::solver::{VlsmAllocation, VlsmRequest, VlsmRequirement, VlsmResponse};
use std::collections::HashMap;

/// A prepared solver call for one supernet group.
#[derive(Debug, Clone)]
pub struct VlsmJob {
    pub supernet: AddressBlock,
    pub request: VlsmRequest,
    /// Requirements in plan order, paired with their correlation key.
    keyed: Vec<(String, VlanRequirement)>,
}

/// What came back from one solver call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VlsmMerge {
    pub parent: Option<AddressBlock>,
    pub entries: Vec<AddressPlanEntry>,
    pub unallocated: Vec<String>,
}

pub(super) fn validate(input: &StrategyInput) -> Vec<String> {
    let mut errors = Vec::new();
    if input.supernet.prefix() > 30 {
        errors.push(format!(
            "VLSM needs a supernet of /30 or larger, {} is too small",
            input.supernet
        ));
    }
    errors
}

pub(super) fn prepare(input: &StrategyInput) -> VlsmJob {
    let keyed: Vec<(String, VlanRequirement)> = input
        .requirements
        .iter()
        .enumerate()
        .map(|(n, req)| (format!("req-{n}"), (*req).clone()))
        .collect();

    let request = VlsmRequest {
        cidr: input.supernet.to_string(),
        requirements: keyed
            .iter()
            .map(|(key, req)| VlsmRequirement {
                name: key.clone(),
                hosts: req.hosts,
            })
            .collect(),
    };

    VlsmJob {
        supernet: input.supernet,
        request,
        keyed,
    }
}

impl VlsmJob {
    pub fn is_empty(&self) -> bool {
        self.keyed.is_empty()
    }

    /// Map allocations back onto requirements by correlation key.
    ///
    /// A requirement without a subnet in the response is left out of the
    /// entries and listed as unallocated. A subnet that does not parse fails
    /// the whole merge.
    pub fn merge(&self, response: VlsmResponse) -> Result<VlsmMerge, PlanError> {
        let by_key: HashMap<&str, &VlsmAllocation> = response
            .allocations
            .iter()
            .map(|a| (a.name.as_str(), a))
            .collect();

        let parent = match AddressBlock::new(&response.parent) {
            Ok(p) => Some(p),
            Err(e) => {
                log::warn!("VLSM parent '{}' ignored: {e}", response.parent);
                None
            }
        };

        let mut merged = VlsmMerge {
            parent,
            ..Default::default()
        };

        for (key, req) in &self.keyed {
            let label = format!("{} / {}", req.site_name, req.name);
            let Some(subnet) = by_key.get(key.as_str()).and_then(|a| a.subnet.as_deref()) else {
                let reason = by_key
                    .get(key.as_str())
                    .and_then(|a| a.error.clone())
                    .unwrap_or_else(|| "no allocation returned".to_string());
                log::warn!("VLSM: no space for {label} ({} hosts): {reason}", req.hosts);
                merged.unallocated.push(label);
                continue;
            };
            let block = AddressBlock::new(subnet).map_err(|e| {
                PlanError::Solver(format!("solver returned invalid subnet for {label}: {e}"))
            })?;
            merged
                .entries
                .push(assigned_entry(req, AddressingMode::Vlsm, block));
        }

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures;
    use super::*;
    use crate::models::{AddressingConfig, VlanNumbering};

    fn allocation(name: &str, subnet: Option<&str>) -> VlsmAllocation {
        VlsmAllocation {
            name: name.to_string(),
            hosts_requested: 50,
            hosts_available: 62,
            subnet: subnet.map(|s| s.to_string()),
            error: subnet.is_none().then(|| "Not enough space".to_string()),
        }
    }

    #[test]
    fn test_prepare_uses_correlation_keys() {
        let sites = fixtures::sites(2);
        let reqs = fixtures::requirements(&sites, &[10], 0);
        let cfg = AddressingConfig::default();
        let numbering = VlanNumbering::default();
        let input = fixtures::input("10.0.0.0/24", &sites, &reqs, &cfg, &numbering);

        let job = prepare(&input);
        assert_eq!(job.request.cidr, "10.0.0.0/24");
        let names: Vec<&str> = job.request.requirements.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["req-0", "req-1"]);
        assert_eq!(job.request.requirements[1].hosts, 50);
    }

    #[test]
    fn test_merge_out_of_order_and_missing() {
        let sites = fixtures::sites(3);
        let reqs = fixtures::requirements(&sites, &[10], 0);
        let cfg = AddressingConfig::default();
        let numbering = VlanNumbering::default();
        let input = fixtures::input("10.0.0.0/24", &sites, &reqs, &cfg, &numbering);
        let job = prepare(&input);

        let response = VlsmResponse {
            parent: "10.0.0.0/24".to_string(),
            allocations: vec![
                allocation("req-2", Some("10.0.0.64/26")),
                allocation("req-0", Some("10.0.0.0/26")),
                allocation("req-1", None),
            ],
            remaining: vec![],
        };
        let merged = job.merge(response).unwrap();
        assert_eq!(merged.parent, Some(AddressBlock::new("10.0.0.0/24").unwrap()));
        assert_eq!(merged.entries.len(), 2);
        assert_eq!(merged.entries[0].site_id, "s0");
        assert_eq!(merged.entries[0].subnet.unwrap().to_string(), "10.0.0.0/26");
        assert_eq!(merged.entries[1].site_id, "s2");
        assert_eq!(merged.entries[1].gateway.unwrap().to_string(), "10.0.0.65");
        assert_eq!(merged.unallocated, vec!["Site1 / Vlan10".to_string()]);
    }

    #[test]
    fn test_merge_rejects_garbage_subnet() {
        let sites = fixtures::sites(1);
        let reqs = fixtures::requirements(&sites, &[10], 0);
        let cfg = AddressingConfig::default();
        let numbering = VlanNumbering::default();
        let input = fixtures::input("10.0.0.0/24", &sites, &reqs, &cfg, &numbering);
        let job = prepare(&input);

        let response = VlsmResponse {
            parent: "10.0.0.0/24".to_string(),
            allocations: vec![allocation("req-0", Some("10.0.0.0/99"))],
            remaining: vec![],
        };
        assert!(matches!(job.merge(response), Err(PlanError::Solver(_))));
    }

    #[test]
    fn test_merge_zero_host_allocation() {
        let sites = fixtures::sites(2);
        let mut reqs = fixtures::requirements(&sites, &[10], 0);
        reqs[1].hosts = 0;
        let cfg = AddressingConfig::default();
        let numbering = VlanNumbering::default();
        let input = fixtures::input("10.0.0.0/24", &sites, &reqs, &cfg, &numbering);
        let job = prepare(&input);

        let response: VlsmResponse = serde_json::from_str(
            r#"{"parent": "10.0.0.0/24", "allocations": [
                {"name": "req-0", "hosts_requested": 50, "subnet": "10.0.0.0/26", "hosts_available": 62},
                {"name": "req-1", "hosts_requested": 0, "subnet": "10.0.0.64/32", "hosts_available": -1}
            ]}"#,
        )
        .unwrap();
        let merged = job.merge(response).unwrap();
        assert_eq!(merged.entries.len(), 2);
        assert_eq!(merged.entries[1].subnet.unwrap().to_string(), "10.0.0.64/32");
        assert!(merged.unallocated.is_empty());
    }
}

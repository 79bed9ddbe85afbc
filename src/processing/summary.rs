//! Per-site summary routes.

use crate::models::{covering_block, AddressBlock, AddressPlan, Design};
use serde::Serialize;

/// The single route a site could advertise for all its subnets.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SiteSummaryRoute {
    pub site_id: String,
    pub summary_route: Option<AddressBlock>,
    pub subnet_count: usize,
    /// True when the summary contains nothing but this site's subnets.
    pub can_summarize: bool,
    pub message: String,
}

/// One summary per design site, in design order.
pub fn compute_site_summaries(design: &Design, plan: &AddressPlan) -> Vec<SiteSummaryRoute> {
    design
        .sites
        .iter()
        .map(|site| {
            let blocks: Vec<AddressBlock> = plan
                .entries_for_site(&site.id)
                .filter_map(|e| e.subnet)
                .collect();
            let Some(summary) = covering_block(&blocks, 0) else {
                return SiteSummaryRoute {
                    site_id: site.id.clone(),
                    summary_route: None,
                    subnet_count: 0,
                    can_summarize: false,
                    message: "No subnets allocated".to_string(),
                };
            };

            let allocated: u64 = blocks.iter().map(|b| b.size()).sum();
            let unused = summary.size().saturating_sub(allocated);
            let count = blocks.len();
            let message = if unused == 0 {
                format!("Clean summary: {summary} covers all {count} subnets")
            } else {
                format!("{summary} covers all {count} subnets but includes {unused} unused addresses")
            };
            SiteSummaryRoute {
                site_id: site.id.clone(),
                summary_route: Some(summary),
                subnet_count: count,
                can_summarize: unused == 0,
                message,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AddressPlanEntry, Site};
    use crate::strategy::AddressingMode;

    fn entry(site: &str, vlan: &str, cidr: &str) -> AddressPlanEntry {
        let mut e = AddressPlanEntry {
            site_id: site.to_string(),
            vlan_key: vlan.to_string(),
            site_name: site.to_string(),
            vlan_name: vlan.to_string(),
            vlan_id: 10,
            hosts_needed: 10,
            subnet: None,
            gateway: None,
            mode: AddressingMode::Manual,
            manual: true,
        };
        e.assign(AddressBlock::new(cidr).unwrap());
        e
    }

    #[test]
    fn test_site_summaries() {
        let mut design = Design::new(AddressBlock::new("10.0.0.0/16").unwrap());
        design.sites = vec![Site::new("a", "A"), Site::new("b", "B"), Site::new("c", "C")];
        let plan = AddressPlan {
            entries: vec![
                entry("a", "users", "10.0.0.0/25"),
                entry("a", "voice", "10.0.0.128/25"),
                entry("b", "users", "10.0.1.0/26"),
                entry("b", "voice", "10.0.1.128/26"),
            ],
            ..Default::default()
        };

        let summaries = compute_site_summaries(&design, &plan);
        assert_eq!(summaries.len(), 3);

        assert!(summaries[0].can_summarize);
        assert_eq!(summaries[0].message, "Clean summary: 10.0.0.0/24 covers all 2 subnets");

        assert!(!summaries[1].can_summarize);
        assert_eq!(
            summaries[1].message,
            "10.0.1.0/24 covers all 2 subnets but includes 128 unused addresses"
        );

        assert_eq!(summaries[2].summary_route, None);
        assert_eq!(summaries[2].message, "No subnets allocated");
    }
}

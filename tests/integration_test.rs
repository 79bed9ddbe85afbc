//! Integration tests for site-address-plan
//!
//! These tests run complete designs from file through planning, tunnels,
//! summaries and CSV export.

use async_trait::async_trait;
use site_address_plan::{
    build_report,
    config::load_design,
    error::{PlanError, SolverError},
    models::AddressBlock,
    output::plan_csv,
    processing::{compute_address_plan, set_manual_subnet, validate_overlaps},
    session::PlanSlot,
    solver::{OfflineSolver, VlsmAllocation, VlsmRequest, VlsmResponse, VlsmSolver},
    strategy::AddressingMode,
};

/// Answers every requirement with consecutive /26 blocks from the parent.
struct SlashTwentySixSolver;

#[async_trait]
impl VlsmSolver for SlashTwentySixSolver {
    async fn solve(&self, request: &VlsmRequest) -> Result<VlsmResponse, SolverError> {
        let parent = AddressBlock::new(&request.cidr).map_err(|e| SolverError(e.to_string()))?;
        let allocations = request
            .requirements
            .iter()
            .enumerate()
            .map(|(i, r)| VlsmAllocation {
                name: r.name.clone(),
                hosts_requested: r.hosts,
                hosts_available: 62,
                subnet: AddressBlock::from_numeric(parent.lo() + i as u32 * 64, 26)
                    .ok()
                    .map(|b| b.to_string()),
                error: None,
            })
            .rev()
            .collect();
        Ok(VlsmResponse {
            parent: request.cidr.clone(),
            allocations,
            remaining: vec![],
        })
    }
}

#[tokio::test]
async fn test_sequential_design_end_to_end() {
    let design = load_design("tests/data/design_sequential.json").expect("Failed to load design");
    let report = build_report(&design, &OfflineSolver, None)
        .await
        .expect("Failed to build report");

    let plan = &report.plan;
    assert_eq!(plan.entries.len(), 2);
    assert_eq!(plan.entries[0].subnet.unwrap().to_string(), "10.0.0.0/25");
    assert_eq!(plan.entries[0].gateway.unwrap().to_string(), "10.0.0.1");
    assert_eq!(plan.entries[1].subnet.unwrap().to_string(), "10.0.0.128/25");
    assert_eq!(plan.entries[1].gateway.unwrap().to_string(), "10.0.0.129");
    assert!(plan.overlaps.is_empty(), "Should have no overlaps");
    assert!(plan.is_clean());

    // full mesh of two sites, /30 at the end of the supernet
    assert_eq!(report.tunnels.entries.len(), 1);
    assert_eq!(report.tunnels.base.unwrap().to_string(), "10.0.255.252/30");
    let tunnel = &report.tunnels.entries[0];
    assert_eq!(tunnel.name, "wireguard-HQ-Branch");
    assert_eq!(tunnel.address_a.to_string(), "10.0.255.253");
    assert_eq!(tunnel.address_b.to_string(), "10.0.255.254");
    assert!(report.tunnel_overlaps.is_empty());
    assert_eq!(report.tunnel_error, None);

    assert_eq!(report.summaries.len(), 2);
    assert_eq!(
        report.summaries[0].message,
        "Clean summary: 10.0.0.0/25 covers all 1 subnets"
    );

    let csv = plan_csv(plan, &report.tunnels.entries);
    assert!(csv.contains(r#""10.0.0.128/25""#));
    assert!(csv.contains(r#""wireguard-HQ-Branch""#));
}

#[tokio::test]
async fn test_mixed_strategies() {
    let design = load_design("tests/data/design_mixed.json").expect("Failed to load design");
    let report = build_report(&design, &OfflineSolver, None)
        .await
        .expect("Failed to build report");
    let plan = &report.plan;

    let subnets: Vec<(String, AddressingMode, Option<String>)> = plan
        .entries
        .iter()
        .map(|e| (e.label(), e.mode, e.subnet.map(|s| s.to_string())))
        .collect();
    assert_eq!(
        subnets,
        vec![
            ("HQ / Management".to_string(), AddressingMode::SiteInOctet, Some("10.1.10.0/24".to_string())),
            ("HQ / Users".to_string(), AddressingMode::SiteInOctet, Some("10.1.20.0/24".to_string())),
            ("DC / Management".to_string(), AddressingMode::VlanAligned, Some("10.20.10.0/24".to_string())),
            ("DC / Users".to_string(), AddressingMode::VlanAligned, Some("10.20.20.0/24".to_string())),
            ("Lab / Management".to_string(), AddressingMode::Manual, None),
        ]
    );
    assert_eq!(plan.parent.unwrap().to_string(), "10.0.0.0/11");
    assert_eq!(plan.pending_manual(), 1);

    let names: Vec<&str> = report.tunnels.entries.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["ipsec-DC-HQ", "ipsec-DC-Lab"]);
    assert_eq!(report.tunnels.entries[1].subnet.to_string(), "172.16.0.4/30");

    assert_eq!(report.summaries[2].message, "No subnets allocated");
    assert!(!report.summaries[0].can_summarize);
}

#[tokio::test]
async fn test_manual_edit_and_recompute() {
    let design = load_design("tests/data/design_mixed.json").expect("Failed to load design");
    let slot = PlanSlot::new();

    let ticket = slot.begin();
    let plan = compute_address_plan(&design, &OfflineSolver, None)
        .await
        .expect("Failed to compute plan");
    assert!(slot.commit(ticket, plan));

    let current = slot.current().expect("plan committed");
    let edited = set_manual_subnet(&current, "lab", "mgmt", "10.1.10.128/25")
        .expect("Failed to set manual subnet");
    assert_eq!(edited.overlaps.len(), 1, "manual subnet collides with HQ");
    assert!(current.overlaps.is_empty(), "previous plan unchanged");

    let recomputed = compute_address_plan(&design, &OfflineSolver, Some(&edited))
        .await
        .expect("Failed to recompute");
    let lab = recomputed.entry("lab", "mgmt").expect("lab entry");
    assert!(lab.manual);
    assert_eq!(lab.subnet.unwrap().to_string(), "10.1.10.128/25");
    assert_eq!(recomputed.overlaps.len(), 1);
}

#[tokio::test]
async fn test_vlsm_without_solver_fails_cleanly() {
    let mut design = load_design("tests/data/design_sequential.json").expect("Failed to load design");
    design.addressing.mode = AddressingMode::Vlsm;

    let err = build_report(&design, &OfflineSolver, None).await.unwrap_err();
    assert!(matches!(err, PlanError::Solver(_)));

    let report = build_report(&design, &SlashTwentySixSolver, None)
        .await
        .expect("Failed to build report");
    let subnets: Vec<String> = report
        .plan
        .allocated_blocks()
        .iter()
        .map(|b| b.to_string())
        .collect();
    assert_eq!(subnets, vec!["10.0.0.0/26", "10.0.0.64/26"]);
    assert_eq!(report.plan.parent.unwrap().to_string(), "10.0.0.0/16");
}

#[test]
fn test_validate_overlaps_strings() {
    let found = validate_overlaps(&["10.0.0.0/24", "10.0.0.128/25"]).unwrap();
    assert_eq!(found.len(), 1);
    let found = validate_overlaps(&["10.0.0.0/24", "10.0.1.0/24"]).unwrap();
    assert!(found.is_empty());
}

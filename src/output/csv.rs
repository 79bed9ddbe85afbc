//! CSV export of the address plan and tunnel plan.

use crate::models::{AddressPlan, TunnelPlanEntry};
use std::fmt::Write;

use super::terminal::format_field;

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Render the plan as CSV, one row per (site, VLAN) followed by one row per tunnel.
///
/// The first line is a `#` comment carrying the export time in UTC.
pub fn plan_csv(plan: &AddressPlan, tunnels: &[TunnelPlanEntry]) -> String {
    log::info!(
        "#Start plan_csv() entries={} tunnels={}",
        plan.entries.len(),
        tunnels.len()
    );
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# address plan exported {}",
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );
    let _ = writeln!(
        out,
        r#"    "site", "vlan_id",        "vlan_name",        "subnet",        "gateway","hosts","manual""#
    );

    for e in &plan.entries {
        let _ = writeln!(
            out,
            "{site},{vlan_id},{vlan_name},{subnet},{gateway},{hosts},{manual}",
            site = format_field(&e.site_name, 10),
            vlan_id = format_field(e.vlan_id, 10),
            vlan_name = format_field(&e.vlan_name, 18),
            subnet = format_field(opt(e.subnet), 18),
            gateway = format_field(opt(e.gateway), 17),
            hosts = format_field(e.hosts_needed, 7),
            manual = format_field(e.manual, 8),
        );
    }

    if !tunnels.is_empty() {
        let _ = writeln!(
            out,
            r#"    "site_a",   "site_b",                     "name",        "subnet",      "address_a",      "address_b",   "type""#
        );
        for t in tunnels {
            let _ = writeln!(
                out,
                "{a},{b},{name},{subnet},{addr_a},{addr_b},{kind}",
                a = format_field(&t.site_a, 10),
                b = format_field(&t.site_b, 10),
                name = format_field(&t.name, 26),
                subnet = format_field(t.subnet, 18),
                addr_a = format_field(t.address_a, 17),
                addr_b = format_field(t.address_b, 17),
                kind = format_field(t.tunnel_type, 10),
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AddressBlock, AddressPlanEntry, TunnelType};
    use crate::strategy::AddressingMode;
    use std::net::Ipv4Addr;

    #[test]
    fn test_plan_csv() {
        let mut entry = AddressPlanEntry {
            site_id: "hq".to_string(),
            vlan_key: "users".to_string(),
            site_name: "HQ".to_string(),
            vlan_name: "Users".to_string(),
            vlan_id: 10,
            hosts_needed: 50,
            subnet: None,
            gateway: None,
            mode: AddressingMode::SequentialFixed,
            manual: false,
        };
        entry.assign(AddressBlock::new("10.0.0.0/25").unwrap());
        let pending = AddressPlanEntry {
            vlan_key: "voice".to_string(),
            vlan_name: "Voice".to_string(),
            subnet: None,
            gateway: None,
            ..entry.clone()
        };
        let plan = AddressPlan {
            entries: vec![entry, pending],
            ..Default::default()
        };
        let tunnel = TunnelPlanEntry {
            site_a: "hq".to_string(),
            site_b: "br".to_string(),
            name: "gre-HQ-BR".to_string(),
            subnet: AddressBlock::new("172.16.0.0/30").unwrap(),
            address_a: Ipv4Addr::new(172, 16, 0, 1),
            address_b: Ipv4Addr::new(172, 16, 0, 2),
            tunnel_type: TunnelType::Gre,
            manual: false,
        };

        let csv = plan_csv(&plan, &[tunnel]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("# address plan exported "));
        assert_eq!(
            lines[2],
            r#"      "HQ",      "10",           "Users",     "10.0.0.0/25",       "10.0.0.1",   "50", "false""#
        );
        assert!(lines[3].contains(r#""Voice""#));
        assert!(lines[3].contains(r#""""#));
        assert!(lines[5].ends_with(r#""gre""#));
    }
}

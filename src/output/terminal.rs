//! Terminal output.
//!
//! Provides formatting helpers and the coloured plan report.

use crate::PlanReport;
use colored::Colorize;

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A quoted, right-aligned string
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    let quoted = format!("\"{value_str}\"");
    let quoted_len = quoted.len();

    if quoted_len >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Print the full report to stdout.
pub fn print_report(report: &PlanReport) {
    let plan = &report.plan;
    log::info!("#Start print_report() entries={}", plan.entries.len());

    println!("{}", "Address plan".bold());
    if let Some(parent) = plan.parent {
        println!("  parent block: {}", parent.to_string().cyan());
    }
    println!(
        "  {:<16} {:>5} {:<16} {:<18} {:<15} {:>7} {:>7}  {}",
        "site", "vlan", "name", "subnet", "gateway", "hosts", "usable", "mode"
    );
    for e in &plan.entries {
        let subnet = match e.subnet {
            Some(s) => s.to_string().normal(),
            None => "pending".yellow(),
        };
        let usable = or_dash(e.subnet.map(|s| s.usable_hosts()));
        let mode = if e.manual {
            format!("{} (manual)", e.mode)
        } else {
            e.mode.to_string()
        };
        let row = format!(
            "  {:<16} {:>5} {:<16} {:<18} {:<15} {:>7} {:>7}  {}",
            e.site_name,
            e.vlan_id,
            e.vlan_name,
            subnet,
            or_dash(e.gateway),
            e.hosts_needed,
            usable,
            mode
        );
        if e.subnet.is_some() && !e.fits() {
            println!("{}", row.red());
        } else {
            println!("{row}");
        }
    }

    if !plan.unallocated.is_empty() {
        println!("{}", "Unallocated".yellow().bold());
        for label in &plan.unallocated {
            println!("  {label}");
        }
    }

    if plan.overlaps.is_empty() && report.tunnel_overlaps.is_empty() {
        println!("{}", "No overlapping subnets".green());
    } else {
        println!("{}", "Overlapping subnets".red().bold());
        for conflict in plan.overlaps.iter().chain(&report.tunnel_overlaps) {
            println!("  {}", conflict.to_string().red());
        }
    }

    if !report.tunnels.entries.is_empty() {
        println!("{}", "Tunnels".bold());
        if let Some(base) = report.tunnels.base {
            println!("  block: {}", base.to_string().cyan());
        }
        for t in &report.tunnels.entries {
            println!(
                "  {:<36} {:<18} {:<15} {:<15}{}",
                t.name,
                t.subnet.to_string(),
                t.address_a.to_string(),
                t.address_b.to_string(),
                if t.manual { " manual" } else { "" }
            );
        }
    }
    for rejected in &report.tunnels.rejected {
        println!("  {}", rejected.to_string().red());
    }
    if let Some(err) = &report.tunnel_error {
        println!("{} {}", "Tunnels:".bold(), err.to_string().red());
    }

    if !report.summaries.is_empty() {
        println!("{}", "Summary routes".bold());
        for s in &report.summaries {
            let line = format!("  {:<16} {}", s.site_id, s.message);
            if s.can_summarize {
                println!("{}", line.green());
            } else {
                println!("{line}");
            }
        }
    }
}

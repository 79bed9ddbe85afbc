//! Point-to-point tunnel planning.
//!
//! Cuts a tunnel block into /30 or /31 slots and hands them out to site pairs
//! of a full-mesh or hub-spoke topology. Manual tunnels are checked against the
//! address plan and the tunnels accepted so far.

use super::overlap::{check_candidate, plan_ranges, tunnel_ranges, LabeledRange};
use crate::error::TunnelError;
use crate::models::{
    block_size, parse_address, prefix_for_addresses, AddressBlock, AddressPlan, AllocPosition,
    Design, ManualTunnel, Site, TunnelAllocation, TunnelConfig, TunnelPlanEntry, TunnelTopology,
};
use itertools::Itertools;
use std::net::Ipv4Addr;

/// One point-to-point block and its two endpoint addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TunnelSlot {
    pub subnet: AddressBlock,
    pub address_a: Ipv4Addr,
    pub address_b: Ipv4Addr,
}

/// Tunnels of a design plus the block they were cut from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TunnelPlan {
    pub base: Option<AddressBlock>,
    pub entries: Vec<TunnelPlanEntry>,
    /// Manual tunnels that failed validation.
    pub rejected: Vec<TunnelError>,
}

/// Links needed for `sites` sites.
pub fn required_slots(topology: TunnelTopology, sites: usize) -> usize {
    match topology {
        TunnelTopology::FullMesh => sites * sites.saturating_sub(1) / 2,
        TunnelTopology::HubSpoke => sites.saturating_sub(1),
        TunnelTopology::None | TunnelTopology::Manual => 0,
    }
}

fn check_p2p_prefix(prefix: u8) -> Result<(), TunnelError> {
    match prefix {
        30 | 31 => Ok(()),
        other => Err(TunnelError::InvalidPointToPointPrefix(other)),
    }
}

/// Number of `prefix` slots in `base`.
pub fn slot_count(base: AddressBlock, prefix: u8) -> u64 {
    if prefix < base.prefix() {
        return 0;
    }
    base.size() / block_size(prefix)
}

fn slot_at(net: u32, prefix: u8) -> Result<TunnelSlot, TunnelError> {
    let subnet = AddressBlock::from_numeric(net, prefix)?;
    let (a, b) = if prefix == 31 {
        (net, net + 1)
    } else {
        (net + 1, net + 2)
    };
    Ok(TunnelSlot {
        subnet,
        address_a: Ipv4Addr::from(a),
        address_b: Ipv4Addr::from(b),
    })
}

/// Lazily walk the slots of `base`, lowest first.
pub fn slots(
    base: AddressBlock,
    prefix: u8,
) -> Result<impl Iterator<Item = TunnelSlot>, TunnelError> {
    check_p2p_prefix(prefix)?;
    let step = block_size(prefix);
    let lo = base.lo() as u64;
    Ok((0..slot_count(base, prefix))
        .filter_map(move |i| slot_at((lo + i * step) as u32, prefix).ok()))
}

/// Every slot of `base`.
///
/// # Examples
/// ```
/// use site_address_plan::models::AddressBlock;
/// use site_address_plan::processing::tunnel_slots;
/// let base = AddressBlock::new("172.16.0.0/29").unwrap();
/// let slots = tunnel_slots(base, 30).unwrap();
/// assert_eq!(slots[1].subnet.to_string(), "172.16.0.4/30");
/// assert_eq!(slots[1].address_b.to_string(), "172.16.0.6");
/// ```
pub fn tunnel_slots(base: AddressBlock, prefix: u8) -> Result<Vec<TunnelSlot>, TunnelError> {
    Ok(slots(base, prefix)?.collect())
}

/// Ordered site pairs of a topology.
pub fn site_pairs<'a>(
    sites: &'a [Site],
    topology: TunnelTopology,
    hub: Option<&str>,
) -> Result<Vec<(&'a Site, &'a Site)>, TunnelError> {
    match topology {
        TunnelTopology::FullMesh => Ok(sites.iter().tuple_combinations().collect()),
        TunnelTopology::HubSpoke => {
            let hub_site = match hub {
                Some(id) => sites
                    .iter()
                    .find(|s| s.id == id)
                    .ok_or_else(|| TunnelError::UnknownHub(id.to_string()))?,
                None => match sites.first() {
                    Some(s) => s,
                    None => return Ok(Vec::new()),
                },
            };
            Ok(sites
                .iter()
                .filter(|s| s.id != hub_site.id)
                .map(|s| (hub_site, s))
                .collect())
        }
        TunnelTopology::None | TunnelTopology::Manual => Ok(Vec::new()),
    }
}

fn tunnel_name(config: &TunnelConfig, a: &Site, b: &Site) -> String {
    format!("{}-{}-{}", config.tunnel_type, a.name, b.name)
}

/// Generate the tunnels of a full-mesh or hub-spoke topology out of `base`.
///
/// Fails with [`TunnelError::BlockTooSmall`] rather than handing out fewer
/// tunnels than the topology needs.
pub fn plan_tunnels(
    sites: &[Site],
    base: AddressBlock,
    config: &TunnelConfig,
) -> Result<Vec<TunnelPlanEntry>, TunnelError> {
    let pairs = site_pairs(sites, config.topology, config.hub.as_deref())?;
    if pairs.is_empty() {
        return Ok(Vec::new());
    }
    check_p2p_prefix(config.p2p_prefix)?;

    let available = slot_count(base, config.p2p_prefix) as usize;
    if available < pairs.len() {
        return Err(TunnelError::BlockTooSmall {
            block: base.to_string(),
            available,
            required: pairs.len(),
        });
    }

    let entries: Vec<TunnelPlanEntry> = pairs
        .into_iter()
        .zip(slots(base, config.p2p_prefix)?)
        .map(|((a, b), slot)| TunnelPlanEntry {
            site_a: a.id.clone(),
            site_b: b.id.clone(),
            name: tunnel_name(config, a, b),
            subnet: slot.subnet,
            address_a: slot.address_a,
            address_b: slot.address_b,
            tunnel_type: config.tunnel_type,
            manual: false,
        })
        .collect();
    log::info!("{} tunnel(s) planned in {base}", entries.len());
    Ok(entries)
}

/// Find an aligned block in `supernet` that holds `required` slots and does
/// not touch any `occupied` block.
///
/// `Start` returns the lowest such block, `End` the highest.
pub fn infer_tunnel_block(
    supernet: AddressBlock,
    required: usize,
    p2p_prefix: u8,
    position: AllocPosition,
    occupied: &[AddressBlock],
) -> Result<AddressBlock, TunnelError> {
    check_p2p_prefix(p2p_prefix)?;
    let no_block = || TunnelError::NoFreeBlock {
        supernet: supernet.to_string(),
        required,
    };

    let need = required.max(1) as u64 * block_size(p2p_prefix);
    let prefix = prefix_for_addresses(need).ok_or_else(no_block)?;
    if prefix < supernet.prefix() {
        return Err(no_block());
    }
    let size = block_size(prefix);
    let lo = supernet.lo() as u64;
    let end = lo + supernet.size();

    match position {
        AllocPosition::Start => {
            let mut cursor = lo;
            while cursor + size <= end {
                let candidate = AddressBlock::from_numeric(cursor as u32, prefix)?;
                match occupied
                    .iter()
                    .filter(|o| o.overlaps(&candidate))
                    .map(|o| o.hi() as u64)
                    .max()
                {
                    None => return Ok(candidate),
                    Some(hi) => cursor = (hi + 1).div_ceil(size) * size,
                }
            }
        }
        AllocPosition::End => {
            let mut cursor = end - size;
            loop {
                let candidate = AddressBlock::from_numeric(cursor as u32, prefix)?;
                match occupied
                    .iter()
                    .filter(|o| o.overlaps(&candidate))
                    .map(|o| o.lo() as u64)
                    .min()
                {
                    None => return Ok(candidate),
                    Some(olo) => {
                        let below = olo / size * size;
                        if below < lo + size {
                            break;
                        }
                        cursor = below - size;
                    }
                }
            }
        }
    }

    Err(no_block())
}

/// Block the generated tunnels come from.
pub fn tunnel_base(design: &Design, plan: &AddressPlan) -> Result<AddressBlock, TunnelError> {
    let config = &design.tunnels;
    match config.allocation {
        TunnelAllocation::Separate { base } => Ok(base),
        TunnelAllocation::FromSupernet { position } => {
            let required = required_slots(config.topology, design.sites.len());
            if required == 0 {
                return Err(TunnelError::MissingBase);
            }
            let block = infer_tunnel_block(
                design.supernet,
                required,
                config.p2p_prefix,
                position,
                &plan.allocated_blocks(),
            )?;
            log::debug!("tunnel block {block} inferred from {}", design.supernet);
            Ok(block)
        }
    }
}

/// Validate a hand-entered tunnel.
///
/// Format problems fail fast. Everything else is collected into
/// [`TunnelError::Rejected`].
pub fn accept_manual_tunnel(
    design: &Design,
    plan: &AddressPlan,
    accepted: &[TunnelPlanEntry],
    manual: &ManualTunnel,
) -> Result<TunnelPlanEntry, TunnelError> {
    let subnet = AddressBlock::new(&manual.subnet)?;
    check_p2p_prefix(subnet.prefix())?;
    let site_a = design
        .site(&manual.site_a)
        .ok_or_else(|| TunnelError::UnknownSite(manual.site_a.clone()))?;
    let site_b = design
        .site(&manual.site_b)
        .ok_or_else(|| TunnelError::UnknownSite(manual.site_b.clone()))?;

    let slot = slot_at(subnet.lo(), subnet.prefix())?;
    let address_a = match &manual.address_a {
        Some(a) => parse_address(a)?,
        None => slot.address_a,
    };
    let address_b = match &manual.address_b {
        Some(b) => parse_address(b)?,
        None => slot.address_b,
    };

    let mut errors = Vec::new();
    if site_a.id == site_b.id {
        errors.push(format!("tunnel endpoints are the same site '{}'", site_a.name));
    }
    for addr in [address_a, address_b] {
        if !subnet.contains(addr) {
            errors.push(format!("{addr} is outside {subnet}"));
        } else if subnet.prefix() == 30 && (addr == subnet.network() || addr == subnet.broadcast())
        {
            errors.push(format!("{addr} is not a usable host address in {subnet}"));
        }
    }
    if address_a == address_b {
        errors.push(format!("both endpoints use {address_a}"));
    }

    let name = tunnel_name(&design.tunnels, site_a, site_b);
    let mut existing = plan_ranges(plan);
    existing.extend(tunnel_ranges(accepted));
    let candidate = LabeledRange::new(format!("tunnel {name}"), subnet);
    errors.extend(
        check_candidate(&candidate, &existing)
            .iter()
            .map(|c| c.to_string()),
    );

    if !errors.is_empty() {
        return Err(TunnelError::Rejected(errors));
    }

    Ok(TunnelPlanEntry {
        site_a: site_a.id.clone(),
        site_b: site_b.id.clone(),
        name,
        subnet,
        address_a,
        address_b,
        tunnel_type: design.tunnels.tunnel_type,
        manual: true,
    })
}

/// Tunnels for the configured topology.
pub fn build_tunnel_plan(design: &Design, plan: &AddressPlan) -> Result<TunnelPlan, TunnelError> {
    let config = &design.tunnels;
    match config.topology {
        TunnelTopology::None => Ok(TunnelPlan::default()),
        TunnelTopology::Manual => {
            let mut result = TunnelPlan::default();
            for manual in &config.manual {
                match accept_manual_tunnel(design, plan, &result.entries, manual) {
                    Ok(entry) => result.entries.push(entry),
                    Err(e) => {
                        log::warn!(
                            "manual tunnel {} <-> {} rejected: {e}",
                            manual.site_a,
                            manual.site_b
                        );
                        result.rejected.push(e);
                    }
                }
            }
            Ok(result)
        }
        TunnelTopology::FullMesh | TunnelTopology::HubSpoke => {
            if required_slots(config.topology, design.sites.len()) == 0 {
                return Ok(TunnelPlan::default());
            }
            let base = tunnel_base(design, plan)?;
            Ok(TunnelPlan {
                base: Some(base),
                entries: plan_tunnels(&design.sites, base, config)?,
                rejected: Vec::new(),
            })
        }
    }
}

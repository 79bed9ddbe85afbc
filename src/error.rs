//! Error types for the planning engine.
//!
//! Format errors ([`CidrError`]) are raised before any allocation happens.
//! Capacity and constraint problems are collected into [`PlanError::Constraint`]
//! so the caller can show every message at once. Overlaps are not errors at all,
//! they are reported on the plan itself.

use thiserror::Error;

/// Malformed CIDR or address input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CidrError {
    #[error("Invalid CIDR format: '{0}' (expected a.b.c.d/prefix)")]
    InvalidFormat(String),

    #[error("Invalid octet in '{0}' (must be 0-255)")]
    InvalidOctet(String),

    #[error("Invalid prefix length in '{0}' (must be 0-32)")]
    InvalidPrefix(String),

    #[error("Invalid IPv4 address: '{0}'")]
    InvalidAddress(String),
}

/// Failure of a plan computation. The previous plan stays untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("address plan blocked: {}", .0.join("; "))]
    Constraint(Vec<String>),

    #[error(transparent)]
    Cidr(#[from] CidrError),

    #[error("VLSM calculation failed: {0}")]
    Solver(String),

    #[error("no plan entry for site '{site}' / vlan '{vlan}'")]
    UnknownEntry { site: String, vlan: String },
}

/// Failure of tunnel planning.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TunnelError {
    #[error("tunnel block {block} too small: {available} slot(s) available, {required} required")]
    BlockTooSmall {
        block: String,
        available: usize,
        required: usize,
    },

    #[error("point-to-point prefix must be /30 or /31, got /{0}")]
    InvalidPointToPointPrefix(u8),

    #[error("hub site '{0}' is not part of the design")]
    UnknownHub(String),

    #[error("site '{0}' is not part of the design")]
    UnknownSite(String),

    #[error("no tunnel address block available")]
    MissingBase,

    #[error("no free block in {supernet} for {required} tunnel slot(s)")]
    NoFreeBlock { supernet: String, required: usize },

    #[error("tunnel rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),

    #[error(transparent)]
    Cidr(#[from] CidrError),
}

/// Transport or remote failure of the external VLSM solver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct SolverError(pub String);

impl From<reqwest::Error> for SolverError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SolverError(format!("VLSM solver timed out: {e}"))
        } else {
            SolverError(format!("VLSM solver request failed: {e}"))
        }
    }
}

impl From<SolverError> for PlanError {
    fn from(e: SolverError) -> Self {
        PlanError::Solver(e.0)
    }
}

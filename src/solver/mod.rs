//! External VLSM solver interface.
//!
//! The best-fit allocator runs as a remote service. This module holds its
//! wire types, the [`VlsmSolver`] seam and the HTTP client behind it.

mod http;

use crate::error::SolverError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpVlsmSolver;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VlsmRequirement {
    /// Correlation key, echoed back on the matching allocation.
    pub name: String,
    pub hosts: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VlsmRequest {
    pub cidr: String,
    pub requirements: Vec<VlsmRequirement>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VlsmAllocation {
    pub name: String,
    #[serde(default)]
    pub hosts_requested: u32,
    /// Negative for a zero-host /32 (`2^0 - 2`).
    #[serde(default)]
    pub hosts_available: i64,
    /// Absent when the solver found no space.
    #[serde(default)]
    pub subnet: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VlsmResponse {
    pub parent: String,
    pub allocations: Vec<VlsmAllocation>,
    #[serde(default)]
    pub remaining: Vec<String>,
}

/// Best-fit allocator for one parent block.
#[async_trait]
pub trait VlsmSolver: Send + Sync {
    async fn solve(&self, request: &VlsmRequest) -> Result<VlsmResponse, SolverError>;
}

/// Stand-in used when no solver endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineSolver;

#[async_trait]
impl VlsmSolver for OfflineSolver {
    async fn solve(&self, request: &VlsmRequest) -> Result<VlsmResponse, SolverError> {
        log::warn!("VLSM requested for {} but no solver is configured", request.cidr);
        Err(SolverError(
            "no VLSM solver configured (set VLSM_SOLVER_URL)".to_string(),
        ))
    }
}

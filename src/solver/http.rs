//! HTTP client for the remote VLSM tool endpoint.

use super::{VlsmRequest, VlsmResponse, VlsmSolver};
use crate::error::SolverError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Path of the VLSM tool below the API base URL.
const VLSM_PATH: &str = "tools/vlsm/";

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Posts requests to `<base>/tools/vlsm/`.
#[derive(Debug, Clone)]
pub struct HttpVlsmSolver {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpVlsmSolver {
    /// Build a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<HttpVlsmSolver, SolverError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpVlsmSolver {
            client,
            endpoint: vlsm_endpoint(base_url),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn vlsm_endpoint(base_url: &str) -> String {
    format!("{}/{VLSM_PATH}", base_url.trim_end_matches('/'))
}

#[async_trait]
impl VlsmSolver for HttpVlsmSolver {
    async fn solve(&self, request: &VlsmRequest) -> Result<VlsmResponse, SolverError> {
        log::debug!(
            "POST {} cidr={} requirements={}",
            self.endpoint,
            request.cidr,
            request.requirements.len()
        );
        let response = self.client.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.detail)
                .unwrap_or_else(|| status.to_string());
            log::warn!("VLSM solver returned {status}: {detail}");
            return Err(SolverError(detail));
        }

        let body = response.text().await?;
        let mut deserializer = serde_json::Deserializer::from_str(&body);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
            log::error!("RESPONSE START:\n\n{body}\n\nRESPONSE END\n");
            SolverError(format!(
                "Error parsing VLSM response: path={} error={}",
                e.path(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vlsm_endpoint() {
        assert_eq!(
            vlsm_endpoint("http://localhost:8000/api/"),
            "http://localhost:8000/api/tools/vlsm/"
        );
        assert_eq!(
            vlsm_endpoint("http://localhost:8000/api"),
            "http://localhost:8000/api/tools/vlsm/"
        );
    }

    #[test]
    fn test_new_client() {
        let solver = HttpVlsmSolver::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        assert_eq!(solver.endpoint(), "http://127.0.0.1:9/tools/vlsm/");
    }

    #[tokio::test]
    async fn test_unreachable_solver_is_an_error() {
        let solver =
            HttpVlsmSolver::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let request = VlsmRequest {
            cidr: "10.0.0.0/24".to_string(),
            requirements: vec![],
        };
        assert!(solver.solve(&request).await.is_err());
    }
}

//! Design-file loading and environment settings.

use crate::models::Design;
use std::error::Error;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DESIGN_FILE: &str = "design.json";
pub const DEFAULT_SOLVER_TIMEOUT_SECS: u64 = 30;

/// How the binary prints its report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Csv,
}

impl OutputFormat {
    fn parse(value: &str) -> Result<OutputFormat, Box<dyn Error>> {
        match value.trim().to_ascii_lowercase().as_str() {
            "terminal" | "" => Ok(OutputFormat::Terminal),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("PLAN_OUTPUT must be 'terminal' or 'csv', got '{other}'").into()),
        }
    }
}

/// Runtime settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub design_file: String,
    /// Base URL of the API serving `tools/vlsm/`. `None` runs offline.
    pub solver_url: Option<String>,
    pub solver_timeout: Duration,
    pub output: OutputFormat,
}

impl Settings {
    /// Read `DESIGN_FILE`, `VLSM_SOLVER_URL`, `VLSM_TIMEOUT_SECS` and
    /// `PLAN_OUTPUT`. A design file given in `args` wins over `DESIGN_FILE`.
    pub fn from_env(args: &[String]) -> Result<Settings, Box<dyn Error>> {
        Settings::from_lookup(args, |key| std::env::var(key).ok())
    }

    fn from_lookup<F>(args: &[String], lookup: F) -> Result<Settings, Box<dyn Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let design_file = args
            .first()
            .cloned()
            .or_else(|| lookup("DESIGN_FILE"))
            .unwrap_or_else(|| DEFAULT_DESIGN_FILE.to_string());

        let solver_url = lookup("VLSM_SOLVER_URL").filter(|u| !u.trim().is_empty());

        let timeout_secs = match lookup("VLSM_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("VLSM_TIMEOUT_SECS '{v}': {e}"))?,
            None => DEFAULT_SOLVER_TIMEOUT_SECS,
        };

        let output = match lookup("PLAN_OUTPUT") {
            Some(v) => OutputFormat::parse(&v)?,
            None => OutputFormat::default(),
        };

        Ok(Settings {
            design_file,
            solver_url,
            solver_timeout: Duration::from_secs(timeout_secs),
            output,
        })
    }
}

/// Parse a design document, reporting the JSON path of any error.
pub fn parse_design(json: &str) -> Result<Design, Box<dyn Error>> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    let design: Design = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        format!(
            "Error parsing design: path={} error={}",
            e.path(),
            e.inner()
        )
    })?;
    Ok(design)
}

/// Read and parse a design file.
pub fn load_design(path: &str) -> Result<Design, Box<dyn Error>> {
    if !Path::new(path).exists() {
        return Err(format!("Design file does not exist: {path}").into());
    }
    log::info!("Reading design file: {path}");
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading design file {path}: {e}"))?;
    let design = parse_design(&json)?;
    log::info!(
        "Design loaded: supernet {} with {} site(s)",
        design.supernet,
        design.sites.len()
    );
    Ok(design)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(args: &[&str], env: &[(&str, &str)]) -> Result<Settings, Box<dyn Error>> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        Settings::from_lookup(&args, |key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[], &[]).unwrap();
        assert_eq!(s.design_file, DEFAULT_DESIGN_FILE);
        assert_eq!(s.solver_url, None);
        assert_eq!(s.solver_timeout, Duration::from_secs(30));
        assert_eq!(s.output, OutputFormat::Terminal);
    }

    #[test]
    fn test_argument_overrides_env() {
        let env = [
            ("DESIGN_FILE", "from_env.json"),
            ("VLSM_SOLVER_URL", "http://localhost:8000/api"),
            ("VLSM_TIMEOUT_SECS", "5"),
            ("PLAN_OUTPUT", "CSV"),
        ];
        let s = settings(&["cli.json"], &env).unwrap();
        assert_eq!(s.design_file, "cli.json");
        assert_eq!(s.solver_url.as_deref(), Some("http://localhost:8000/api"));
        assert_eq!(s.solver_timeout, Duration::from_secs(5));
        assert_eq!(s.output, OutputFormat::Csv);

        let s = settings(&[], &env).unwrap();
        assert_eq!(s.design_file, "from_env.json");
    }

    #[test]
    fn test_bad_values() {
        assert!(settings(&[], &[("VLSM_TIMEOUT_SECS", "soon")]).is_err());
        assert!(settings(&[], &[("PLAN_OUTPUT", "xml")]).is_err());
    }

    #[test]
    fn test_parse_design_error_path() {
        let err = parse_design(r#"{"supernet":"10.0.0.0/16","sites":[{"id":"a","name":"A","supernet":"10.0.0.0/40"}]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("sites[0].supernet"), "{err}");
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_design("tests/data/does_not_exist.json").is_err());
    }

    #[test]
    fn test_load_design_file() {
        let design = load_design("tests/data/design_sequential.json").unwrap();
        assert_eq!(design.sites.len(), 2);
    }
}

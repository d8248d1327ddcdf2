//! Run configuration: YAML file, then environment, then command line flags
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Path of the YAML configuration file
pub const CONFIG_ENV: &str = "UNIPOL_CONFIG";
/// Comma-separated policy selection, overriding the configuration file
pub const POLICIES_ENV: &str = "UNIPOL_POLICIES";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Policies to monitor; every registered policy when absent
    pub policies: Option<Vec<String>>,
    /// Global infra (topology) description
    pub infra: Option<PathBuf>,
    /// Newline-delimited JSON log documents; stdin when absent
    pub input: Option<PathBuf>,
    /// Fact output; stdout when absent
    pub output: Option<PathBuf>,
    /// Where to write run statistics as JSON
    pub stats: Option<PathBuf>,
    pub log_level: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            policies: None,
            infra: None,
            input: None,
            output: None,
            stats: None,
            log_level: "info".to_string(),
        }
    }
}

impl RunConfig {
    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(text).context("invalid run configuration")
    }

    /// Load `path`, or the file named by `UNIPOL_CONFIG`, or the defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        };
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Self::from_yaml_str(&text).with_context(|| format!("in {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(POLICIES_ENV) {
            self.policies = Some(parse_policy_list(&value));
        }
    }

    pub fn policy_set(&self) -> Option<BTreeSet<String>> {
        self.policies.as_ref().map(|p| p.iter().cloned().collect())
    }
}

pub fn parse_policy_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

//! Global infra: node and subnet membership of a testnet run
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PreprocessError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubnetType {
    System,
    Application,
    VerifiedApplication,
}

impl SubnetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "System",
            Self::Application => "Application",
            Self::VerifiedApplication => "VerifiedApplication",
        }
    }
}

impl fmt::Display for SubnetType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node and the subnet it was assigned to when the run started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMembership {
    pub node_id: String,
    pub address: String,
    pub subnet_id: String,
}

/// Topology queries needed by the topology-dependent event kinds
pub trait GlobalInfra: fmt::Debug {
    /// Every subnet that existed at the start of the run, with its type
    fn original_subnet_types(&self) -> Vec<(String, SubnetType)>;

    /// Every node assigned to a subnet at the start of the run
    fn original_membership(&self) -> Vec<NodeMembership>;

    /// Network address of a node, assigned or not
    fn node_address(&self, node_id: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub subnet_type: SubnetType,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

/// Topology snapshot loaded from a YAML (or JSON) description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticInfra {
    #[serde(default)]
    pub subnets: Vec<SubnetSpec>,
    /// Nodes registered but not assigned to any subnet at start
    #[serde(default)]
    pub unassigned_nodes: Vec<NodeSpec>,
}

impl StaticInfra {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| PreprocessError::Infra(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PreprocessError::Infra(format!("{}: {}", path.display(), e)))?;
        let infra = Self::from_yaml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            subnets = infra.subnets.len(),
            "loaded global infra"
        );
        Ok(infra)
    }

    /// Every known node, assigned ones first
    fn nodes(&self) -> impl Iterator<Item = &NodeSpec> {
        self.subnets
            .iter()
            .flat_map(|s| s.nodes.iter())
            .chain(self.unassigned_nodes.iter())
    }
}

impl GlobalInfra for StaticInfra {
    fn original_subnet_types(&self) -> Vec<(String, SubnetType)> {
        self.subnets
            .iter()
            .map(|s| (s.id.clone(), s.subnet_type))
            .collect()
    }

    fn original_membership(&self) -> Vec<NodeMembership> {
        self.subnets
            .iter()
            .flat_map(|s| {
                s.nodes.iter().map(move |n| NodeMembership {
                    node_id: n.id.clone(),
                    address: n.address.clone(),
                    subnet_id: s.id.clone(),
                })
            })
            .collect()
    }

    fn node_address(&self, node_id: &str) -> Option<String> {
        self.nodes()
            .find(|n| n.id == node_id)
            .map(|n| n.address.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPOLOGY: &str = r#"
subnets:
  - id: nns
    type: system
    nodes:
      - id: node-a
        address: "2001:db8::a"
      - id: node-b
        address: "2001:db8::b"
  - id: app
    type: application
    nodes:
      - id: node-c
        address: "2001:db8::c"
unassigned_nodes:
  - id: node-d
    address: "2001:db8::d"
"#;

    #[test]
    fn test_load_topology() {
        let infra = StaticInfra::from_yaml_str(TOPOLOGY).unwrap();
        assert_eq!(
            infra.original_subnet_types(),
            vec![
                ("nns".to_string(), SubnetType::System),
                ("app".to_string(), SubnetType::Application),
            ]
        );
        assert_eq!(infra.original_membership().len(), 3);
    }

    #[test]
    fn test_node_queries() {
        let infra = StaticInfra::from_yaml_str(TOPOLOGY).unwrap();
        assert_eq!(infra.node_address("node-d").as_deref(), Some("2001:db8::d"));
        assert_eq!(infra.node_address("node-z"), None);
        assert_eq!(infra.node_address("node-c").as_deref(), Some("2001:db8::c"));
    }

    #[test]
    fn test_invalid_topology() {
        let err = StaticInfra::from_yaml_str("subnets: [{id: x, type: galaxy}]").unwrap_err();
        assert!(matches!(err, PreprocessError::Infra(_)));
    }
}

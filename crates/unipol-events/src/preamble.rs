//! Preamble events: synthetic facts describing the initial topology
use unipol_core::{fact, Event, GlobalInfra};

use crate::vocabulary::PreambleKind;

/// Timestamp of every preamble fact
pub const PREAMBLE_TIMESTAMP: i64 = 0;

#[derive(Debug, Clone, Copy)]
pub enum PreambleEvent<'a> {
    OriginalSubnetType(&'a dyn GlobalInfra),
    OriginallyInSubnet(&'a dyn GlobalInfra),
}

impl<'a> PreambleEvent<'a> {
    pub fn new(kind: PreambleKind, infra: &'a dyn GlobalInfra) -> Self {
        match kind {
            PreambleKind::OriginalSubnetType => Self::OriginalSubnetType(infra),
            PreambleKind::OriginallyInSubnet => Self::OriginallyInSubnet(infra),
        }
    }

    pub fn kind(&self) -> PreambleKind {
        match self {
            Self::OriginalSubnetType(_) => PreambleKind::OriginalSubnetType,
            Self::OriginallyInSubnet(_) => PreambleKind::OriginallyInSubnet,
        }
    }
}

impl Event for PreambleEvent<'_> {
    fn predicate(&self) -> &'static str {
        self.kind().name()
    }

    fn compile(&self) -> Vec<String> {
        let pred = self.predicate();
        match self {
            Self::OriginalSubnetType(infra) => infra
                .original_subnet_types()
                .iter()
                .map(|(subnet, subnet_type)| {
                    fact(
                        PREAMBLE_TIMESTAMP,
                        pred,
                        &[subnet.into(), subnet_type.as_str().into()],
                    )
                })
                .collect(),
            Self::OriginallyInSubnet(infra) => infra
                .original_membership()
                .iter()
                .map(|m| {
                    fact(
                        PREAMBLE_TIMESTAMP,
                        pred,
                        &[(&m.node_id).into(), (&m.address).into(), (&m.subnet_id).into()],
                    )
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unipol_core::StaticInfra;

    #[test]
    fn test_preamble_facts() {
        let infra = StaticInfra::from_yaml_str(
            r#"
subnets:
  - id: nns
    type: system
    nodes:
      - { id: node-a, address: "10.0.0.1" }
      - { id: node-b, address: "10.0.0.2" }
  - id: app
    type: verified_application
"#,
        )
        .unwrap();

        let types = PreambleEvent::new(PreambleKind::OriginalSubnetType, &infra);
        assert_eq!(
            types.compile(),
            vec![
                r#"@0 original_subnet_type("nns", "System")"#,
                r#"@0 original_subnet_type("app", "VerifiedApplication")"#,
            ]
        );

        let members = PreambleEvent::new(PreambleKind::OriginallyInSubnet, &infra);
        assert_eq!(members.predicate(), "originally_in_subnet");
        assert_eq!(
            members.compile(),
            vec![
                r#"@0 originally_in_subnet("node-a", "10.0.0.1", "nns")"#,
                r#"@0 originally_in_subnet("node-b", "10.0.0.2", "nns")"#,
            ]
        );
    }
}

//! Closed predicate vocabulary
//!
//! Every dispatchable name maps to exactly one kind through an immutable
//! registry; the kinds themselves are matched exhaustively when events are
//! built.
use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Body predicates policies may depend on
pub const LOG_EVENTS: &[&str] = &[
    "log",
    "reboot",
    "reboot_intent",
    "p2p__node_added",
    "p2p__node_removed",
    "deliver_batch",
    "consensus_finalized",
    "move_block_proposal",
    "ControlPlane__spawn_accept_task__tls_server_handshake_failed",
    "registry__node_added_to_subnet",
    "registry__node_removed_from_subnet",
    "CUP_share_proposed",
    "replica_diverged",
    "finalized",
];

pub const PREAMBLE_EVENTS: &[&str] = &["original_subnet_type", "originally_in_subnet"];

/// Predicates that can only be rendered with global infra
pub const GLOBAL_INFRA_BASED_EVENTS: &[&str] = &[
    "original_subnet_type",
    "originally_in_subnet",
    "registry__node_added_to_subnet",
    "registry__node_removed_from_subnet",
];

pub fn requires_infra(predicate: &str) -> bool {
    GLOBAL_INFRA_BASED_EVENTS.contains(&predicate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Log,
    Reboot,
    RebootIntent,
    P2pNodeAdded,
    P2pNodeRemoved,
    ValidatedBlockProposalAdded,
    ValidatedBlockProposalMoved,
    DeliverBatch,
    ConsensusFinalized,
    MoveBlockProposal,
    TlsServerHandshakeFailed,
    RegistrySubnetCreated,
    RegistrySubnetUpdated,
    RegistryNodeAddedToSubnet,
    RegistryNodeRemovedFromSubnet,
    ReplicaDiverged,
    CupShareProposed,
    Finalized,
}

impl BodyKind {
    pub const ALL: [BodyKind; 18] = [
        Self::Log,
        Self::Reboot,
        Self::RebootIntent,
        Self::P2pNodeAdded,
        Self::P2pNodeRemoved,
        Self::ValidatedBlockProposalAdded,
        Self::ValidatedBlockProposalMoved,
        Self::DeliverBatch,
        Self::ConsensusFinalized,
        Self::MoveBlockProposal,
        Self::TlsServerHandshakeFailed,
        Self::RegistrySubnetCreated,
        Self::RegistrySubnetUpdated,
        Self::RegistryNodeAddedToSubnet,
        Self::RegistryNodeRemovedFromSubnet,
        Self::ReplicaDiverged,
        Self::CupShareProposed,
        Self::Finalized,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Reboot => "reboot",
            Self::RebootIntent => "reboot_intent",
            Self::P2pNodeAdded => "p2p__node_added",
            Self::P2pNodeRemoved => "p2p__node_removed",
            Self::ValidatedBlockProposalAdded => "validated_BlockProposal_Added",
            Self::ValidatedBlockProposalMoved => "validated_BlockProposal_Moved",
            Self::DeliverBatch => "deliver_batch",
            Self::ConsensusFinalized => "consensus_finalized",
            Self::MoveBlockProposal => "move_block_proposal",
            Self::TlsServerHandshakeFailed => {
                "ControlPlane__spawn_accept_task__tls_server_handshake_failed"
            }
            Self::RegistrySubnetCreated => "registry__subnet_created",
            Self::RegistrySubnetUpdated => "registry__subnet_updated",
            Self::RegistryNodeAddedToSubnet => "registry__node_added_to_subnet",
            Self::RegistryNodeRemovedFromSubnet => "registry__node_removed_from_subnet",
            Self::ReplicaDiverged => "replica_diverged",
            Self::CupShareProposed => "CUP_share_proposed",
            Self::Finalized => "finalized",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        BODY_KINDS.get(name).copied()
    }

    pub fn requires_infra(&self) -> bool {
        requires_infra(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreambleKind {
    OriginalSubnetType,
    OriginallyInSubnet,
}

impl PreambleKind {
    pub const ALL: [PreambleKind; 2] = [Self::OriginalSubnetType, Self::OriginallyInSubnet];

    pub fn name(&self) -> &'static str {
        match self {
            Self::OriginalSubnetType => "original_subnet_type",
            Self::OriginallyInSubnet => "originally_in_subnet",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        PREAMBLE_KINDS.get(name).copied()
    }
}

static BODY_KINDS: Lazy<HashMap<&'static str, BodyKind>> =
    Lazy::new(|| BodyKind::ALL.iter().map(|k| (k.name(), *k)).collect());

static PREAMBLE_KINDS: Lazy<HashMap<&'static str, PreambleKind>> =
    Lazy::new(|| PreambleKind::ALL.iter().map(|k| (k.name(), *k)).collect());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_log_event_is_dispatchable() {
        for name in LOG_EVENTS {
            assert!(BodyKind::from_name(name).is_some(), "{} has no kind", name);
        }
    }

    #[test]
    fn test_names_round_trip_through_registry() {
        for kind in BodyKind::ALL {
            assert_eq!(BodyKind::from_name(kind.name()), Some(kind));
        }
        for kind in PreambleKind::ALL {
            assert_eq!(PreambleKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(BODY_KINDS.len(), BodyKind::ALL.len());
    }

    #[test]
    fn test_dispatchable_names_outside_vocabulary() {
        let extra: Vec<&str> = BodyKind::ALL
            .iter()
            .map(|k| k.name())
            .filter(|n| !LOG_EVENTS.contains(n))
            .collect();
        assert_eq!(
            extra,
            vec![
                "validated_BlockProposal_Added",
                "validated_BlockProposal_Moved",
                "registry__subnet_created",
                "registry__subnet_updated",
            ]
        );
    }

    #[test]
    fn test_unknown_names() {
        assert_eq!(BodyKind::from_name("original_subnet_type"), None);
        assert_eq!(PreambleKind::from_name("log"), None);
        assert_eq!(BodyKind::from_name("Log"), None);
    }

    #[test]
    fn test_infra_based_kinds() {
        assert!(BodyKind::RegistryNodeAddedToSubnet.requires_infra());
        assert!(BodyKind::RegistryNodeRemovedFromSubnet.requires_infra());
        assert!(!BodyKind::Finalized.requires_infra());
        for kind in PreambleKind::ALL {
            assert!(requires_infra(kind.name()));
        }
    }
}

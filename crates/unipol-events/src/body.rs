//! Body events: facts derived from a single log document
use regex::Captures;
use unipol_core::{fact, Arg, Event, GlobalInfra, LogDoc, PreprocessError, Result};

use crate::patterns;
use crate::vocabulary::BodyKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipVerb {
    Added,
    Removed,
}

impl MembershipVerb {
    fn p2p_phrase(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }

    fn registry_phrase(&self) -> &'static str {
        match self {
            Self::Added => "added to",
            Self::Removed => "removed from",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalVerb {
    Added,
    Moved,
}

impl ProposalVerb {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Moved => "Moved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubnetVerb {
    Created,
    Updated,
}

impl SubnetVerb {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

/// One body predicate bound to the document it is evaluated on
#[derive(Debug, Clone, Copy)]
pub enum BodyEvent<'a> {
    GenericLog(&'a LogDoc),
    Reboot(&'a LogDoc),
    RebootIntent(&'a LogDoc),
    NodeMembership {
        doc: &'a LogDoc,
        verb: MembershipVerb,
    },
    ValidatedBlockProposal {
        doc: &'a LogDoc,
        verb: ProposalVerb,
    },
    DeliverBatch(&'a LogDoc),
    ConsensusFinalized(&'a LogDoc),
    MoveBlockProposal(&'a LogDoc),
    TlsServerHandshakeFailed(&'a LogDoc),
    RegistrySubnet {
        doc: &'a LogDoc,
        verb: SubnetVerb,
    },
    RegistryNode {
        doc: &'a LogDoc,
        verb: MembershipVerb,
        infra: &'a dyn GlobalInfra,
    },
    CupShareProposed(&'a LogDoc),
    ReplicaDiverged(&'a LogDoc),
    Finalized(&'a LogDoc),
}

impl<'a> BodyEvent<'a> {
    /// Bind `kind` to a document. Topology-dependent kinds need `infra`.
    pub fn new(kind: BodyKind, doc: &'a LogDoc, infra: Option<&'a dyn GlobalInfra>) -> Result<Self> {
        let event = match kind {
            BodyKind::Log => Self::GenericLog(doc),
            BodyKind::Reboot => Self::Reboot(doc),
            BodyKind::RebootIntent => Self::RebootIntent(doc),
            BodyKind::P2pNodeAdded => Self::NodeMembership {
                doc,
                verb: MembershipVerb::Added,
            },
            BodyKind::P2pNodeRemoved => Self::NodeMembership {
                doc,
                verb: MembershipVerb::Removed,
            },
            BodyKind::ValidatedBlockProposalAdded => Self::ValidatedBlockProposal {
                doc,
                verb: ProposalVerb::Added,
            },
            BodyKind::ValidatedBlockProposalMoved => Self::ValidatedBlockProposal {
                doc,
                verb: ProposalVerb::Moved,
            },
            BodyKind::DeliverBatch => Self::DeliverBatch(doc),
            BodyKind::ConsensusFinalized => Self::ConsensusFinalized(doc),
            BodyKind::MoveBlockProposal => Self::MoveBlockProposal(doc),
            BodyKind::TlsServerHandshakeFailed => Self::TlsServerHandshakeFailed(doc),
            BodyKind::RegistrySubnetCreated => Self::RegistrySubnet {
                doc,
                verb: SubnetVerb::Created,
            },
            BodyKind::RegistrySubnetUpdated => Self::RegistrySubnet {
                doc,
                verb: SubnetVerb::Updated,
            },
            BodyKind::RegistryNodeAddedToSubnet | BodyKind::RegistryNodeRemovedFromSubnet => {
                let infra =
                    infra.ok_or_else(|| PreprocessError::MissingInfra(kind.name().to_string()))?;
                let verb = if kind == BodyKind::RegistryNodeAddedToSubnet {
                    MembershipVerb::Added
                } else {
                    MembershipVerb::Removed
                };
                Self::RegistryNode { doc, verb, infra }
            }
            BodyKind::ReplicaDiverged => Self::ReplicaDiverged(doc),
            BodyKind::CupShareProposed => Self::CupShareProposed(doc),
            BodyKind::Finalized => Self::Finalized(doc),
        };
        Ok(event)
    }

    pub fn kind(&self) -> BodyKind {
        match self {
            Self::GenericLog(_) => BodyKind::Log,
            Self::Reboot(_) => BodyKind::Reboot,
            Self::RebootIntent(_) => BodyKind::RebootIntent,
            Self::NodeMembership { verb: MembershipVerb::Added, .. } => BodyKind::P2pNodeAdded,
            Self::NodeMembership { verb: MembershipVerb::Removed, .. } => BodyKind::P2pNodeRemoved,
            Self::ValidatedBlockProposal { verb: ProposalVerb::Added, .. } => {
                BodyKind::ValidatedBlockProposalAdded
            }
            Self::ValidatedBlockProposal { verb: ProposalVerb::Moved, .. } => {
                BodyKind::ValidatedBlockProposalMoved
            }
            Self::DeliverBatch(_) => BodyKind::DeliverBatch,
            Self::ConsensusFinalized(_) => BodyKind::ConsensusFinalized,
            Self::MoveBlockProposal(_) => BodyKind::MoveBlockProposal,
            Self::TlsServerHandshakeFailed(_) => BodyKind::TlsServerHandshakeFailed,
            Self::RegistrySubnet { verb: SubnetVerb::Created, .. } => BodyKind::RegistrySubnetCreated,
            Self::RegistrySubnet { verb: SubnetVerb::Updated, .. } => BodyKind::RegistrySubnetUpdated,
            Self::RegistryNode { verb: MembershipVerb::Added, .. } => {
                BodyKind::RegistryNodeAddedToSubnet
            }
            Self::RegistryNode { verb: MembershipVerb::Removed, .. } => {
                BodyKind::RegistryNodeRemovedFromSubnet
            }
            Self::CupShareProposed(_) => BodyKind::CupShareProposed,
            Self::ReplicaDiverged(_) => BodyKind::ReplicaDiverged,
            Self::Finalized(_) => BodyKind::Finalized,
        }
    }

    fn doc(&self) -> &'a LogDoc {
        match *self {
            Self::GenericLog(doc)
            | Self::Reboot(doc)
            | Self::RebootIntent(doc)
            | Self::NodeMembership { doc, .. }
            | Self::ValidatedBlockProposal { doc, .. }
            | Self::DeliverBatch(doc)
            | Self::ConsensusFinalized(doc)
            | Self::MoveBlockProposal(doc)
            | Self::TlsServerHandshakeFailed(doc)
            | Self::RegistrySubnet { doc, .. }
            | Self::RegistryNode { doc, .. }
            | Self::CupShareProposed(doc)
            | Self::ReplicaDiverged(doc)
            | Self::Finalized(doc) => doc,
        }
    }

    fn emit(&self, args: &[Arg<'_>]) -> Option<String> {
        Some(fact(self.doc().timestamp, self.predicate(), args))
    }

    fn render(&self) -> Option<String> {
        let doc = self.doc();
        let msg = doc.message.as_str();
        let host = doc.host.as_str();
        let subnet = doc.subnet.as_deref().unwrap_or_default();

        match *self {
            Self::GenericLog(_) => self.emit(&[
                host.into(),
                doc.component.as_str().into(),
                doc.level.as_str().into(),
                msg.into(),
            ]),
            Self::Reboot(_) => {
                if !patterns::REBOOT.is_match(msg) {
                    return None;
                }
                self.emit(&[host.into()])
            }
            Self::RebootIntent(_) => {
                if !patterns::REBOOT_INTENT.is_match(msg) {
                    return None;
                }
                self.emit(&[host.into()])
            }
            Self::NodeMembership { verb, .. } => {
                if !doc.component.starts_with("p2p") {
                    return None;
                }
                let caps = patterns::P2P_NODE.captures(msg)?;
                if &caps["verb"] != verb.p2p_phrase() {
                    return None;
                }
                self.emit(&[host.into(), subnet.into(), caps["node"].into()])
            }
            Self::ValidatedBlockProposal { verb, .. } => {
                let caps = patterns::VALIDATED_BLOCK_PROPOSAL.captures(msg)?;
                if &caps["verb"] != verb.as_str() {
                    return None;
                }
                self.emit(&[host.into(), caps["hash"].into()])
            }
            Self::DeliverBatch(_) => {
                let caps = patterns::DELIVER_BATCH.captures(msg)?;
                let height = height(&caps, doc)?;
                self.emit(&[host.into(), height.into()])
            }
            Self::ConsensusFinalized(_) => {
                let caps = patterns::CONSENSUS_FINALIZED.captures(msg)?;
                let height = height(&caps, doc)?;
                self.emit(&[host.into(), height.into(), caps["hash"].into()])
            }
            Self::MoveBlockProposal(_) => {
                let caps = patterns::MOVE_BLOCK_PROPOSAL.captures(msg)?;
                self.emit(&[host.into(), caps["hash"].into()])
            }
            Self::TlsServerHandshakeFailed(_) => {
                if !doc.component.starts_with("ControlPlane") {
                    return None;
                }
                let caps = patterns::TLS_HANDSHAKE_FAILED.captures(msg)?;
                self.emit(&[host.into(), caps["peer"].into()])
            }
            Self::RegistrySubnet { verb, .. } => {
                if !doc.component.starts_with("registry") {
                    return None;
                }
                let caps = patterns::REGISTRY_SUBNET.captures(msg)?;
                if &caps["verb"] != verb.as_str() {
                    return None;
                }
                let subnet_type = caps.name("type").map(|m| m.as_str()).unwrap_or_default();
                self.emit(&[caps["subnet"].into(), subnet_type.into()])
            }
            Self::RegistryNode { verb, infra, .. } => {
                if !doc.component.starts_with("registry") {
                    return None;
                }
                let caps = patterns::REGISTRY_NODE.captures(msg)?;
                if &caps["verb"] != verb.registry_phrase() {
                    return None;
                }
                let node = &caps["node"];
                let address = infra.node_address(node).unwrap_or_else(|| {
                    tracing::warn!(node, "node has no known address in global infra");
                    String::new()
                });
                self.emit(&[node.into(), address.as_str().into(), caps["subnet"].into()])
            }
            Self::CupShareProposed(_) => {
                let caps = patterns::CUP_SHARE_PROPOSED.captures(msg)?;
                let height = height(&caps, doc)?;
                self.emit(&[host.into(), height.into()])
            }
            Self::ReplicaDiverged(_) => {
                let caps = patterns::REPLICA_DIVERGED.captures(msg)?;
                let height = height(&caps, doc)?;
                self.emit(&[host.into(), height.into()])
            }
            Self::Finalized(_) => {
                let caps = patterns::FINALIZED.captures(msg)?;
                let height = height(&caps, doc)?;
                let version = doc.field_str("replica_version").unwrap_or_default();
                self.emit(&[
                    host.into(),
                    subnet.into(),
                    height.into(),
                    caps["hash"].into(),
                    version.into(),
                ])
            }
        }
    }
}

fn height(caps: &Captures<'_>, doc: &LogDoc) -> Option<i64> {
    match caps["height"].parse() {
        Ok(height) => Some(height),
        Err(err) => {
            tracing::warn!(host = %doc.host, ts = doc.timestamp, %err, "height out of range");
            None
        }
    }
}

impl Event for BodyEvent<'_> {
    fn predicate(&self) -> &'static str {
        self.kind().name()
    }

    fn compile(&self) -> Vec<String> {
        self.render().into_iter().collect()
    }
}

//! Message patterns recognised by the body event kinds
use once_cell::sync::Lazy;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid event pattern {}: {}", pattern, e))
}

pub static REBOOT: Lazy<Regex> =
    Lazy::new(|| compile(r"^Started (?:IC replica|ic-replica\.service)"));

pub static REBOOT_INTENT: Lazy<Regex> = Lazy::new(|| compile(r"^Rebooting node\b"));

pub static P2P_NODE: Lazy<Regex> =
    Lazy::new(|| compile(r"^Node (?P<node>\S+) (?P<verb>added|removed)\b"));

pub static VALIDATED_BLOCK_PROPOSAL: Lazy<Regex> = Lazy::new(|| {
    compile(r"^(?P<verb>Added|Moved) BlockProposal (?P<hash>[0-9a-fA-F]+) (?:to|in) validated pool")
});

pub static DELIVER_BATCH: Lazy<Regex> =
    Lazy::new(|| compile(r"^Delivering batch (?:at|for) height (?P<height>\d+)"));

pub static CONSENSUS_FINALIZED: Lazy<Regex> = Lazy::new(|| {
    compile(r"^Consensus finalized height: (?P<height>\d+), hash: (?P<hash>[0-9a-fA-F]+)")
});

pub static MOVE_BLOCK_PROPOSAL: Lazy<Regex> =
    Lazy::new(|| compile(r"^Moving block proposal (?P<hash>[0-9a-fA-F]+)"));

pub static TLS_HANDSHAKE_FAILED: Lazy<Regex> = Lazy::new(|| {
    compile(r"^TLS server handshake failed\b.*?\bpeer(?:_addr)?[=:]\s*(?P<peer>[^\s,]+)")
});

pub static REGISTRY_SUBNET: Lazy<Regex> = Lazy::new(|| {
    compile(r"^Subnet (?P<subnet>\S+) (?P<verb>created|updated)(?: with type (?P<type>\w+))?")
});

pub static REGISTRY_NODE: Lazy<Regex> = Lazy::new(|| {
    compile(r"^Node (?P<node>\S+) (?P<verb>added to|removed from) subnet (?P<subnet>\S+)")
});

pub static CUP_SHARE_PROPOSED: Lazy<Regex> =
    Lazy::new(|| compile(r"^Proposing a CatchUpPackageShare at height (?P<height>\d+)"));

pub static REPLICA_DIVERGED: Lazy<Regex> =
    Lazy::new(|| compile(r"^Replica diverged at height (?P<height>\d+)"));

pub static FINALIZED: Lazy<Regex> = Lazy::new(|| {
    compile(r"^Finalized height (?P<height>\d+) with hash (?P<hash>[0-9a-fA-F]+)")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        for pattern in [
            &REBOOT,
            &REBOOT_INTENT,
            &P2P_NODE,
            &VALIDATED_BLOCK_PROPOSAL,
            &DELIVER_BATCH,
            &CONSENSUS_FINALIZED,
            &MOVE_BLOCK_PROPOSAL,
            &TLS_HANDSHAKE_FAILED,
            &REGISTRY_SUBNET,
            &REGISTRY_NODE,
            &CUP_SHARE_PROPOSED,
            &REPLICA_DIVERGED,
            &FINALIZED,
        ] {
            assert!(!pattern.as_str().is_empty());
        }
    }

    #[test]
    fn test_tls_peer_capture() {
        let caps = TLS_HANDSHAKE_FAILED
            .captures("TLS server handshake failed: BadCertificate, peer_addr=[2001:db8::7]:4100")
            .unwrap();
        assert_eq!(&caps["peer"], "[2001:db8::7]:4100");
    }

    #[test]
    fn test_registry_node_does_not_match_p2p_message() {
        assert!(REGISTRY_NODE.captures("Node abc added").is_none());
        assert!(P2P_NODE.captures("Node abc added to subnet xyz").is_some());
    }
}

//! Static policy registry
//!
//! Each monitored policy declares the preamble predicates and the body
//! predicates its formula is written against. Everything else in this crate
//! is derived from this table.
use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use serde::Serialize;
use unipol_core::{PreprocessError, Result};
use unipol_events::requires_infra;

/// Predicate dependencies of one policy
#[derive(Debug, Clone, Serialize)]
pub struct PolicySpec {
    pub preambles: &'static [&'static str],
    pub dependencies: &'static [&'static str],
}

impl PolicySpec {
    /// Preambles and dependencies together
    pub fn predicates(&self) -> impl Iterator<Item = &'static str> {
        self.preambles.iter().chain(self.dependencies.iter()).copied()
    }

    pub fn requires_infra(&self) -> bool {
        self.predicates().any(requires_infra)
    }
}

// artifact_pool_latency (original_subnet_type; p2p membership, registry subnet
// changes, validated block proposals) is not registered: its violations are
// not actionable.
static POLICIES: Lazy<BTreeMap<&'static str, PolicySpec>> = Lazy::new(|| {
    let mut m = BTreeMap::new();
    m.insert(
        "unauthorized_connections",
        PolicySpec {
            preambles: &["originally_in_subnet"],
            dependencies: &[
                "ControlPlane__spawn_accept_task__tls_server_handshake_failed",
                "registry__node_added_to_subnet",
                "registry__node_removed_from_subnet",
            ],
        },
    );
    m.insert(
        "reboot_count",
        PolicySpec {
            preambles: &[],
            dependencies: &["reboot", "reboot_intent"],
        },
    );
    m.insert(
        "finalization_consistency",
        PolicySpec {
            preambles: &[],
            dependencies: &["finalized"],
        },
    );
    m.insert(
        "finalized_height",
        PolicySpec {
            preambles: &[],
            dependencies: &["finalized"],
        },
    );
    m.insert(
        "clean_logs",
        PolicySpec {
            preambles: &[],
            dependencies: &["log"],
        },
    );
    m
});

pub fn policy(name: &str) -> Option<&'static PolicySpec> {
    Lazy::force(&POLICIES).get(name)
}

/// Every registered policy, ascending
pub fn supported_policies() -> Vec<String> {
    POLICIES.keys().map(|k| k.to_string()).collect()
}

/// Registered policies that can run without global infra
pub fn supported_policies_without_infra() -> Vec<String> {
    POLICIES
        .iter()
        .filter(|(_, spec)| !spec.requires_infra())
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Fail with every requested name missing from the registry
pub fn check_supported(policies: &BTreeSet<String>) -> Result<()> {
    let unknown: Vec<String> = policies
        .iter()
        .filter(|p| !POLICIES.contains_key(p.as_str()))
        .cloned()
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(PreprocessError::UnsupportedPolicy(unknown))
    }
}

fn union(
    policies: &BTreeSet<String>,
    select: impl Fn(&PolicySpec) -> &'static [&'static str],
) -> Result<BTreeSet<String>> {
    check_supported(policies)?;
    Ok(policies
        .iter()
        .filter_map(|p| policy(p))
        .flat_map(|spec| select(spec).iter())
        .map(|pred| pred.to_string())
        .collect())
}

/// Union of the preambles of `policies`
pub fn required_preambles(policies: &BTreeSet<String>) -> Result<BTreeSet<String>> {
    union(policies, |spec| spec.preambles)
}

/// Union of the body predicates of `policies`
pub fn required_predicates(policies: &BTreeSet<String>) -> Result<BTreeSet<String>> {
    union(policies, |spec| spec.dependencies)
}

/// Whether global infra is needed; `None` selects every policy
pub fn is_infra_required(policies: Option<&BTreeSet<String>>) -> Result<bool> {
    let Some(policies) = policies else {
        return Ok(true);
    };
    check_supported(policies)?;
    Ok(policies
        .iter()
        .filter_map(|p| policy(p))
        .any(PolicySpec::requires_infra))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_supported_policies_sorted_and_complete() {
        let supported = supported_policies();
        let mut sorted = supported.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(supported, sorted);
        assert_eq!(
            supported,
            vec![
                "clean_logs",
                "finalization_consistency",
                "finalized_height",
                "reboot_count",
                "unauthorized_connections",
            ]
        );
    }

    #[test]
    fn test_infra_requirement() {
        assert!(is_infra_required(None).unwrap());
        assert!(!is_infra_required(Some(&set(&["reboot_count"]))).unwrap());
        assert!(is_infra_required(Some(&set(&["unauthorized_connections"]))).unwrap());
        assert!(is_infra_required(Some(&set(&["clean_logs", "unauthorized_connections"]))).unwrap());
        assert!(!is_infra_required(Some(&set(&[]))).unwrap());
    }

    #[test]
    fn test_infra_requirement_rejects_unknown_policy() {
        let err = is_infra_required(Some(&set(&["reboot_count", "nonsense"]))).unwrap_err();
        assert!(matches!(err, PreprocessError::UnsupportedPolicy(ref p) if p == &["nonsense"]));
    }

    #[test]
    fn test_policies_without_infra() {
        assert_eq!(
            supported_policies_without_infra(),
            vec!["clean_logs", "finalization_consistency", "finalized_height", "reboot_count"]
        );
    }

    #[test]
    fn test_required_sets_are_unions_for_every_subset() {
        let all = supported_policies();
        for mask in 0u32..(1 << all.len()) {
            let selected: BTreeSet<String> = all
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, p)| p.clone())
                .collect();

            let mut preambles = BTreeSet::new();
            let mut predicates = BTreeSet::new();
            for p in &selected {
                let spec = policy(p).unwrap();
                preambles.extend(spec.preambles.iter().map(|s| s.to_string()));
                predicates.extend(spec.dependencies.iter().map(|s| s.to_string()));
            }

            assert_eq!(required_preambles(&selected).unwrap(), preambles);
            assert_eq!(required_predicates(&selected).unwrap(), predicates);
        }
    }

    #[test]
    fn test_shared_dependencies_are_deduplicated() {
        let preds = required_predicates(&set(&["finalized_height", "finalization_consistency"])).unwrap();
        assert_eq!(preds, set(&["finalized"]));
    }

    #[test]
    fn test_every_dependency_is_dispatchable() {
        for name in supported_policies() {
            let spec = policy(&name).unwrap();
            for pred in spec.dependencies {
                assert!(unipol_events::BodyKind::from_name(pred).is_some(), "{}", pred);
            }
            for pred in spec.preambles {
                assert!(unipol_events::PreambleKind::from_name(pred).is_some(), "{}", pred);
            }
        }
    }
}

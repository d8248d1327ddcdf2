//! Universal pre-processor: requires only the events needed by the selected policies
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::sync::Arc;

use tracing::info;
use unipol_core::{
    Facts, GlobalInfra, LogDoc, OutcomeHandler, PreProcessor, PreprocessError, Result, NORMAL,
};
use unipol_events::DeclarativePreProcessor;

use crate::registry;

pub const UNIVERSAL_NAME: &str = "unipol";

#[derive(Debug)]
pub struct UniversalPreProcessor {
    dispatcher: DeclarativePreProcessor,
}

impl UniversalPreProcessor {
    /// Resolve `policies` (every registered policy when `None`) into a
    /// dispatcher. Fails on unregistered policies, and when the resolved
    /// predicates need global infra that was not supplied.
    pub fn new(infra: Option<Arc<dyn GlobalInfra>>, policies: Option<BTreeSet<String>>) -> Result<Self> {
        let policies = policies.unwrap_or_else(|| registry::supported_policies().into_iter().collect());
        registry::check_supported(&policies)?;

        let required_preamble_events = registry::required_preambles(&policies)?;
        let required_predicates = registry::required_predicates(&policies)?;

        info!(
            policies = %policies.iter().cloned().collect::<Vec<_>>().join(", "),
            predicates = required_predicates.len(),
            preambles = required_preamble_events.len(),
            "Creating UniversalPreProcessor"
        );

        let formulas = policies.iter().map(|p| (p.clone(), NORMAL)).collect();
        let dispatcher = DeclarativePreProcessor::new(UNIVERSAL_NAME, required_predicates, infra)
            .with_preamble_events(required_preamble_events)
            .with_formulas(formulas);
        dispatcher.validate()?;

        Ok(Self { dispatcher })
    }

    /// Assign a non-default outcome contract to a selected policy
    pub fn with_outcome(mut self, policy: &str, outcome: OutcomeHandler) -> Result<Self> {
        match self.dispatcher.formulas_mut().get_mut(policy) {
            Some(slot) => *slot = outcome,
            None => return Err(PreprocessError::UnsupportedPolicy(vec![policy.to_string()])),
        }
        Ok(self)
    }

    pub fn dispatcher(&self) -> &DeclarativePreProcessor {
        &self.dispatcher
    }

    pub fn supported_policies() -> Vec<String> {
        registry::supported_policies()
    }

    pub fn supported_policies_without_infra() -> Vec<String> {
        registry::supported_policies_without_infra()
    }

    pub fn is_infra_required(policies: Option<&BTreeSet<String>>) -> Result<bool> {
        registry::is_infra_required(policies)
    }
}

impl PreProcessor for UniversalPreProcessor {
    type Doc = LogDoc;

    fn name(&self) -> &str {
        self.dispatcher.name()
    }

    fn formulas(&self) -> &BTreeMap<String, OutcomeHandler> {
        self.dispatcher.formulas()
    }

    fn preamble(&self) -> Facts<'_> {
        self.dispatcher.preamble()
    }

    fn process_log_entry(&self, doc: Rc<LogDoc>) -> Facts<'_> {
        self.dispatcher.process_log_entry(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unipol_core::StaticInfra;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn infra() -> Arc<dyn GlobalInfra> {
        Arc::new(StaticInfra::default())
    }

    #[test]
    fn test_all_policies_need_infra() {
        let err = UniversalPreProcessor::new(None, None).unwrap_err();
        assert!(matches!(err, PreprocessError::MissingInfra(_)));

        let pre = UniversalPreProcessor::new(Some(infra()), None).unwrap();
        assert_eq!(pre.name(), UNIVERSAL_NAME);
        assert_eq!(
            pre.formulas().keys().cloned().collect::<Vec<_>>(),
            UniversalPreProcessor::supported_policies()
        );
        assert_eq!(
            pre.dispatcher().required_preamble_events(),
            &set(&["originally_in_subnet"])
        );
    }

    #[test]
    fn test_selection_without_infra() {
        let pre = UniversalPreProcessor::new(None, Some(set(&["reboot_count", "clean_logs"]))).unwrap();
        assert_eq!(
            pre.dispatcher().required_predicates(),
            &set(&["log", "reboot", "reboot_intent"])
        );
        assert!(pre.dispatcher().required_preamble_events().is_empty());
        assert!(pre.formulas().values().all(OutcomeHandler::is_normal));
    }

    #[test]
    fn test_missing_infra_fails_fast() {
        let err = UniversalPreProcessor::new(None, Some(set(&["unauthorized_connections"]))).unwrap_err();
        assert!(matches!(err, PreprocessError::MissingInfra(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unsupported_policy() {
        let err = UniversalPreProcessor::new(Some(infra()), Some(set(&["clean_logs", "artifact_pool_latency"])))
            .unwrap_err();
        assert!(matches!(err, PreprocessError::UnsupportedPolicy(ref p) if p == &["artifact_pool_latency"]));
    }

    #[test]
    fn test_with_outcome() {
        let violated = OutcomeHandler::new(1, false, true);
        let pre = UniversalPreProcessor::new(None, Some(set(&["reboot_count", "finalized_height"])))
            .unwrap()
            .with_outcome("reboot_count", violated)
            .unwrap();
        assert_eq!(pre.formulas()["reboot_count"], violated);
        assert_eq!(pre.formulas()["finalized_height"], NORMAL);

        let err = pre.with_outcome("clean_logs", NORMAL).unwrap_err();
        assert!(matches!(err, PreprocessError::UnsupportedPolicy(_)));
    }
}

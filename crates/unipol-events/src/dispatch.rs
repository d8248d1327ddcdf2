//! Declarative pre-processor: dispatches predicate names to event kinds
//!
//! The pre-processor is configured with the set of body predicates evaluated
//! on every document and the set of preamble predicates emitted once. Names
//! are resolved lazily while the run is consumed; [`DeclarativePreProcessor::validate`]
//! performs the same checks eagerly.
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use std::sync::Arc;

use unipol_core::{
    Event, Facts, GlobalInfra, LogDoc, OutcomeHandler, PreProcessor, PreprocessError, Result,
};

use crate::body::BodyEvent;
use crate::preamble::PreambleEvent;
use crate::vocabulary::{requires_infra, BodyKind, PreambleKind};

pub struct DeclarativePreProcessor {
    name: String,
    required_predicates: BTreeSet<String>,
    required_preamble_events: BTreeSet<String>,
    infra: Option<Arc<dyn GlobalInfra>>,
    formulas: BTreeMap<String, OutcomeHandler>,
}

impl DeclarativePreProcessor {
    pub fn new(
        name: impl Into<String>,
        required_predicates: BTreeSet<String>,
        infra: Option<Arc<dyn GlobalInfra>>,
    ) -> Self {
        Self {
            name: name.into(),
            required_predicates,
            required_preamble_events: BTreeSet::new(),
            infra,
            formulas: BTreeMap::new(),
        }
    }

    pub fn with_preamble_events(mut self, required_preamble_events: BTreeSet<String>) -> Self {
        self.required_preamble_events = required_preamble_events;
        self
    }

    pub fn with_formulas(mut self, formulas: BTreeMap<String, OutcomeHandler>) -> Self {
        self.formulas = formulas;
        self
    }

    pub fn required_predicates(&self) -> &BTreeSet<String> {
        &self.required_predicates
    }

    pub fn required_preamble_events(&self) -> &BTreeSet<String> {
        &self.required_preamble_events
    }

    pub fn infra(&self) -> Option<&dyn GlobalInfra> {
        self.infra.as_deref()
    }

    pub fn formulas_mut(&mut self) -> &mut BTreeMap<String, OutcomeHandler> {
        &mut self.formulas
    }

    /// Bind a body predicate to `doc`
    pub fn body_event<'a>(&'a self, pred: &str, doc: &'a LogDoc) -> Result<BodyEvent<'a>> {
        let kind = BodyKind::from_name(pred)
            .ok_or_else(|| PreprocessError::UnknownPredicate(pred.to_string()))?;
        BodyEvent::new(kind, doc, self.infra())
    }

    pub fn preamble_event(&self, pred: &str) -> Result<PreambleEvent<'_>> {
        let kind = PreambleKind::from_name(pred)
            .ok_or_else(|| PreprocessError::UnknownPreamble(pred.to_string()))?;
        let infra = self
            .infra()
            .ok_or_else(|| PreprocessError::MissingInfra(pred.to_string()))?;
        Ok(PreambleEvent::new(kind, infra))
    }

    /// Check every required name before any document is processed
    pub fn validate(&self) -> Result<()> {
        for pred in &self.required_predicates {
            if BodyKind::from_name(pred).is_none() {
                return Err(PreprocessError::UnknownPredicate(pred.clone()));
            }
        }
        for pred in &self.required_preamble_events {
            if PreambleKind::from_name(pred).is_none() {
                return Err(PreprocessError::UnknownPreamble(pred.clone()));
            }
        }
        if self.infra.is_none() {
            let needs_infra = self
                .required_predicates
                .iter()
                .chain(&self.required_preamble_events)
                .find(|p| requires_infra(p));
            if let Some(pred) = needs_infra {
                return Err(PreprocessError::MissingInfra(pred.clone()));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for DeclarativePreProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("DeclarativePreProcessor")
            .field("name", &self.name)
            .field("required_predicates", &self.required_predicates)
            .field("required_preamble_events", &self.required_preamble_events)
            .field("has_infra", &self.infra.is_some())
            .finish()
    }
}

fn flatten(events: Result<impl Event>) -> Vec<Result<String>> {
    match events {
        Ok(event) => event.compile().into_iter().map(Ok).collect(),
        Err(err) => vec![Err(err)],
    }
}

impl PreProcessor for DeclarativePreProcessor {
    type Doc = LogDoc;

    fn name(&self) -> &str {
        &self.name
    }

    fn formulas(&self) -> &BTreeMap<String, OutcomeHandler> {
        &self.formulas
    }

    fn preamble(&self) -> Facts<'_> {
        Box::new(
            self.required_preamble_events
                .iter()
                .flat_map(move |pred| flatten(self.preamble_event(pred))),
        )
    }

    fn process_log_entry(&self, doc: Rc<LogDoc>) -> Facts<'_> {
        tracing::trace!(host = %doc.host, ts = doc.timestamp, "processing log entry");
        Box::new(
            self.required_predicates
                .iter()
                .flat_map(move |pred| flatten(self.body_event(pred, &doc))),
        )
    }
}

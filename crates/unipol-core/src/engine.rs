//! Streaming engine: frames preamble, per-document and terminal facts
//!
//! ```text
//! preamble facts → facts(doc 1) → facts(doc 2) → … → end_test
//! ```
//!
//! Everything is pulled lazily by the consumer. Each fact's production is
//! bracketed by a [`Timed`] region so that pre-processing overhead can be
//! told apart from the time spent waiting on the log source.
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{debug, error, info};

use crate::document::Document;
use crate::error::Result;
use crate::event::FinalEvent;
use crate::outcome::OutcomeHandler;
use crate::stats::PreProcessorStats;
use crate::timing::Timed;

/// Timestamp of the terminal fact when no document was seen
pub const NO_TIMESTAMP: i64 = 0;

/// Lazily produced facts
pub type Facts<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

/// Contract of a pre-processor driven by [`Pipeline`]
pub trait PreProcessor {
    type Doc: Document;

    fn name(&self) -> &str;

    /// Policies that depend on this pre-processor, with their expected outcome
    fn formulas(&self) -> &BTreeMap<String, OutcomeHandler>;

    /// Synthetic facts emitted once, before any document
    fn preamble(&self) -> Facts<'_> {
        Box::new(std::iter::empty())
    }

    /// Facts derived from one document
    fn process_log_entry(&self, doc: Rc<Self::Doc>) -> Facts<'_>;
}

/// Owns a pre-processor and the statistics of its runs
pub struct Pipeline<P: PreProcessor> {
    processor: P,
    stats: PreProcessorStats,
}

impl<P: PreProcessor> Pipeline<P> {
    pub fn new(processor: P) -> Self {
        let stats = PreProcessorStats::new(processor.name());
        Self { processor, stats }
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Statistics of the latest run; complete once its output is drained
    pub fn stats(&self) -> &PreProcessorStats {
        &self.stats
    }

    pub fn into_parts(self) -> (P, PreProcessorStats) {
        (self.processor, self.stats)
    }

    /// Start a run over `logs`. Statistics of any previous run are reset.
    pub fn run<I>(&mut self, logs: I) -> Run<'_, P, I::IntoIter>
    where
        I: IntoIterator<Item = P::Doc>,
    {
        self.stats = PreProcessorStats::new(self.processor.name());
        info!(
            name = %self.stats.name,
            run_id = %self.stats.run_id,
            "Running pre-processor"
        );
        debug!("Generating preamble relations");

        Run {
            processor: &self.processor,
            stats: &mut self.stats,
            logs: logs.into_iter(),
            phase: Phase::Preamble(self.processor.preamble()),
            timestamp: NO_TIMESTAMP,
            first_timestamp: None,
        }
    }
}

enum Phase<'p> {
    Preamble(Facts<'p>),
    /// Facts of the current document, if one is being processed
    Body(Option<Facts<'p>>),
    Done,
}

enum Step {
    Yield(Result<String>),
    PreambleDone,
    DocumentDone,
    NextDocument,
}

/// Lazy fact stream of one run. Fused after the terminal fact or an error.
pub struct Run<'p, P: PreProcessor, I> {
    processor: &'p P,
    stats: &'p mut PreProcessorStats,
    logs: I,
    phase: Phase<'p>,
    timestamp: i64,
    first_timestamp: Option<i64>,
}

impl<'p, P, I> Run<'p, P, I>
where
    P: PreProcessor,
    I: Iterator<Item = P::Doc>,
{
    /// Statistics accumulated so far
    pub fn stats(&self) -> &PreProcessorStats {
        self.stats
    }

    fn finish(&mut self) -> String {
        let timestamp = self.timestamp;
        let fact = self
            .stats
            .pre_processing
            .time(|| FinalEvent::new(timestamp).fact());

        self.stats.test_runtime_milliseconds = self
            .first_timestamp
            .map(|first| timestamp.saturating_sub(first))
            .unwrap_or(0);
        self.stats.facts_emitted += 1;
        self.phase = Phase::Done;

        info!(
            name = %self.stats.name,
            documents = self.stats.documents_processed,
            facts = self.stats.facts_emitted,
            test_runtime_ms = self.stats.test_runtime_milliseconds,
            "Pre-processor completed"
        );
        fact
    }
}

impl<'p, P, I> Iterator for Run<'p, P, I>
where
    P: PreProcessor,
    I: Iterator<Item = P::Doc>,
{
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let step = match &mut self.phase {
                Phase::Preamble(facts) => {
                    let _timed = Timed::start(&mut self.stats.pre_processing);
                    match facts.next() {
                        Some(item) => Step::Yield(item),
                        None => Step::PreambleDone,
                    }
                }
                Phase::Body(Some(facts)) => {
                    let _timed = Timed::start(&mut self.stats.pre_processing);
                    match facts.next() {
                        Some(item) => Step::Yield(item),
                        None => Step::DocumentDone,
                    }
                }
                Phase::Body(None) => Step::NextDocument,
                Phase::Done => return None,
            };

            match step {
                Step::Yield(Ok(fact)) => {
                    self.stats.facts_emitted += 1;
                    return Some(Ok(fact));
                }
                Step::Yield(Err(err)) => {
                    error!(name = %self.stats.name, error = %err, "Pre-processing aborted");
                    self.phase = Phase::Done;
                    return Some(Err(err));
                }
                Step::PreambleDone => {
                    info!(name = %self.stats.name, "Preamble done, processing logs");
                    self.phase = Phase::Body(None);
                }
                Step::DocumentDone => self.phase = Phase::Body(None),
                Step::NextDocument => match self.logs.next() {
                    Some(doc) => {
                        let timestamp = doc.unix_ts();
                        self.timestamp = timestamp;
                        self.first_timestamp.get_or_insert(timestamp);
                        self.stats.documents_processed += 1;
                        self.phase = Phase::Body(Some(self.processor.process_log_entry(Rc::new(doc))));
                    }
                    None => return Some(Ok(self.finish())),
                },
            }
        }
    }
}

//! Statistics reported by one pre-processor run
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timing::TimingTotals;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreProcessorStats {
    /// Pre-processor that produced the run
    pub name: String,
    pub run_id: Uuid,
    /// Last document timestamp minus the first one, zero without documents
    pub test_runtime_milliseconds: i64,
    pub documents_processed: u64,
    /// Facts handed to the consumer, terminal fact included
    pub facts_emitted: u64,
    pub pre_processing: TimingTotals,
}

impl PreProcessorStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            run_id: Uuid::new_v4(),
            test_runtime_milliseconds: 0,
            documents_processed: 0,
            facts_emitted: 0,
            pre_processing: TimingTotals::default(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

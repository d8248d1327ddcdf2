//! unipol core: streaming engine, timing and data model
//!
//! Turns a stream of testnet log documents into the fact lines consumed by a
//! temporal-logic conformance checker. This crate owns the generic parts: the
//! [`PreProcessor`] contract and the [`Pipeline`] that drives it, the
//! [`Event`] trait implemented by every fact producer, and the statistics
//! gathered along the way.

pub mod document;
pub mod engine;
pub mod error;
pub mod event;
pub mod infra;
pub mod outcome;
pub mod stats;
pub mod timing;

pub use document::{Document, LogDoc};
pub use engine::{Facts, Pipeline, PreProcessor, Run, NO_TIMESTAMP};
pub use error::{PreprocessError, Result};
pub use event::{fact, Arg, Event, FinalEvent};
pub use infra::{GlobalInfra, NodeMembership, StaticInfra, SubnetType};
pub use outcome::{OutcomeHandler, NORMAL};
pub use stats::PreProcessorStats;
pub use timing::{Timed, TimingTotals};

/// Version of the pre-processor engine
pub const UNIPOL_VERSION: &str = env!("CARGO_PKG_VERSION");

//! unipol CLI: reads log documents, writes facts and run statistics
pub mod config;
pub mod source;

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde_json::{json, Value};
use unipol_core::{
    GlobalInfra, Pipeline, PreProcessor, PreProcessorStats, PreprocessError, StaticInfra,
};
use unipol_policy::{policy, UniversalPreProcessor};

use config::RunConfig;
use source::JsonLines;

/// Exit status for runtime failures (bad input, io)
pub const EXIT_FAILURE: u8 = 1;
/// Exit status when the run is misconfigured (policies, predicates, infra)
pub const EXIT_CONFIGURATION: u8 = 2;

/// Exit status for an error returned by the driver
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let misconfigured = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<PreprocessError>())
        .any(PreprocessError::is_configuration);
    if misconfigured {
        EXIT_CONFIGURATION
    } else {
        EXIT_FAILURE
    }
}

/// Install the stderr fmt subscriber; unknown levels fall back to info
pub fn init_tracing(level: &str) {
    let level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Resolve the configured policies into a pre-processor
pub fn build_preprocessor(config: &RunConfig) -> anyhow::Result<UniversalPreProcessor> {
    let policies = config.policy_set();
    let needs_infra = UniversalPreProcessor::is_infra_required(policies.as_ref())?;

    let infra: Option<Arc<dyn GlobalInfra>> = match &config.infra {
        Some(path) => Some(Arc::new(StaticInfra::from_file(path)?)),
        None => None,
    };
    if needs_infra && infra.is_none() {
        let err = PreprocessError::MissingInfra("the selected policies".to_string());
        return Err(anyhow::Error::new(err).context(format!(
            "the selected policies require global infra (--infra); policies that run without it: {}",
            UniversalPreProcessor::supported_policies_without_infra().join(", ")
        )));
    }

    Ok(UniversalPreProcessor::new(infra, policies)?)
}

/// Drain the pipeline over `input`, writing one fact per line to `output`
pub fn execute<P, R, W>(processor: P, input: R, output: &mut W) -> anyhow::Result<PreProcessorStats>
where
    P: PreProcessor<Doc = unipol_core::LogDoc>,
    R: BufRead,
    W: Write,
{
    let mut pipeline = Pipeline::new(processor);
    let source_error = RefCell::new(None);
    let docs = JsonLines::new(input).map_while(|doc| match doc {
        Ok(doc) => Some(doc),
        Err(err) => {
            *source_error.borrow_mut() = Some(err);
            None
        }
    });

    for fact in pipeline.run(docs) {
        let fact = fact.context("pre-processing failed")?;
        if let Some(err) = source_error.borrow_mut().take() {
            return Err(err).context("reading log documents");
        }
        writeln!(output, "{}", fact)?;
    }
    output.flush()?;

    let (_, stats) = pipeline.into_parts();
    Ok(stats)
}

pub fn write_stats(path: &Path, stats: &PreProcessorStats) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(stats)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

/// Registered policies with their predicates and default outcome
pub fn policy_report(without_infra: bool) -> Value {
    let names = if without_infra {
        UniversalPreProcessor::supported_policies_without_infra()
    } else {
        UniversalPreProcessor::supported_policies()
    };

    let entries: Vec<Value> = names
        .iter()
        .filter_map(|name| policy(name).map(|spec| (name, spec)))
        .map(|(name, spec)| {
            json!({
                "name": name,
                "requires_infra": spec.requires_infra(),
                "preambles": spec.preambles,
                "dependencies": spec.dependencies,
                "outcome": unipol_core::NORMAL,
            })
        })
        .collect();
    Value::Array(entries)
}

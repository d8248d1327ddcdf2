//! unipol policy: policy registry and dependency resolution
//!
//! Maps a selection of monitored policies to the predicates that must be
//! extracted from the logs, and builds the pre-processor that extracts them.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use unipol_core::{LogDoc, Pipeline};
//! use unipol_policy::UniversalPreProcessor;
//!
//! let policies: BTreeSet<String> = ["reboot_count".to_string()].into();
//! assert!(!UniversalPreProcessor::is_infra_required(Some(&policies)).unwrap());
//!
//! let pre = UniversalPreProcessor::new(None, Some(policies)).unwrap();
//! let mut pipeline = Pipeline::new(pre);
//! let docs = vec![LogDoc::new(1000, "node-1").with_message("Started IC replica")];
//! let facts: Vec<String> = pipeline.run(docs).collect::<Result<_, _>>().unwrap();
//!
//! assert_eq!(facts, vec![r#"@1000 reboot("node-1")"#, "@1000 end_test()"]);
//! ```

pub mod registry;
pub mod universal;

pub use registry::{
    check_supported, is_infra_required, policy, required_preambles, required_predicates,
    supported_policies, supported_policies_without_infra, PolicySpec,
};
pub use universal::{UniversalPreProcessor, UNIVERSAL_NAME};

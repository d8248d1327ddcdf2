//! unipol events: event kinds and declarative predicate dispatch
//!
//! # Pipeline Flow
//!
//! ```text
//! predicate name ─→ vocabulary ─→ BodyKind / PreambleKind ─→ BodyEvent / PreambleEvent ─→ facts
//!                      ↓
//!               UnknownPredicate / UnknownPreamble / MissingInfra
//! ```

pub mod body;
pub mod dispatch;
pub mod patterns;
pub mod preamble;
pub mod vocabulary;

pub use body::{BodyEvent, MembershipVerb, ProposalVerb, SubnetVerb};
pub use dispatch::DeclarativePreProcessor;
pub use preamble::{PreambleEvent, PREAMBLE_TIMESTAMP};
pub use vocabulary::{
    requires_infra, BodyKind, PreambleKind, GLOBAL_INFRA_BASED_EVENTS, LOG_EVENTS,
    PREAMBLE_EVENTS,
};

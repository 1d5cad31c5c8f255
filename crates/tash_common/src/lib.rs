//! Tash Common - shared core for the Tash Desk welfare case system.
//!
//! Everything deterministic lives here: the schema, the rule index, the
//! consult prompt and its defensive output parser, case materialization, the
//! checklist state machine, and the document store. The only network boundary
//! (the generative provider) is a trait implemented by the daemon.

pub mod catalog;
pub mod checklist;
pub mod error;
pub mod matcher;
pub mod materializer;
pub mod parser;
pub mod prompt;
pub mod rules;
pub mod schema;
pub mod store;

pub use error::{Result, TashError};
pub use matcher::{hydrate_candidates, match_narrative, InferenceProvider, MatchOutcome};
pub use materializer::{materialize, RoutingPolicy};
pub use parser::{parse_consult_output, ParsedConsult};
pub use rules::RuleIndex;
pub use schema::*;
pub use store::{DocStore, DEFAULT_DATA_DIR};

//! `portavoz-resolve`: spokesperson name resolution engine.
//!
//! Pure engine crate: receives pre-loaded tables, resolves names to canonical
//! identifiers and returns reconciliation records. No CLI or IO dependencies.

pub mod cell;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod model;
pub mod normalize;
pub mod report;
pub mod resolve;
pub mod similarity;
pub mod split;
pub mod table;

pub use config::{MatchPolicy, ResolveConfig};
pub use engine::run;
pub use error::{Requirement, ResolveError};
pub use lookup::{LookupTable, ReferenceRow};
pub use model::{Candidate, OutcomeKind, ReconciliationRecord, ResolutionOutcome, ResolveResult};
pub use normalize::normalize;
pub use resolve::Resolver;
pub use split::{SplitPolicy, Splitter};
pub use table::{CellValue, Table};

//! SEARCH/REPLACE patch engine and batch applier for Quill.
//!
//! ```text
//! [Edit, Edit, Edit] ──resolve──▶ per-file groups ──apply (in order)──▶ buffer ──write once──▶ FileStore
//!                                                    │
//!                                                    └── failed edit: buffer unchanged, reported
//! ```
//!
//! - [`engine::apply`] mutates one buffer for one edit: exact substring first,
//!   then a whitespace-tolerant line match.
//! - [`resolve::resolve_target`] maps a model-supplied path onto a real one.
//! - [`BatchApplier`] sequences edits per file and isolates failures.
//! - [`EditReview`] is the pending set an interactive host accepts from.

pub mod batch;
pub mod engine;
pub mod fuzzy;
pub mod resolve;
pub mod review;

pub use batch::{BatchApplier, BatchReport, EditFailure, FileOutcome};
pub use engine::apply;
pub use resolve::resolve_target;
pub use review::EditReview;

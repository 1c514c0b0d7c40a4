//! Repository view pipeline: filter, sort, paginate.
//!
//! Everything here is pure and synchronous. The visible repository list is
//! always a function of the full repository set and the current criteria;
//! the underlying set is never mutated.

pub mod criteria;
pub mod pipeline;

pub use criteria::{FilterCriteria, LanguageFilter, SortKey};
pub use pipeline::{view, RepoView, PAGE_SIZE};

//! Item set repository: a prefix tree that deduplicates the item sets the
//! intersection engines produce and reports the closed or maximal ones.

mod report;
mod tree;

pub use report::ReportMode;
pub use tree::{Direction, NodeId, RepoTree, Siblings};

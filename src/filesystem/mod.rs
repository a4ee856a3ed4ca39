//! Source tree enumeration and symlink materialization.
//!
//! [`tree`] walks a tree root parent-first, [`materialize`] reproduces the
//! walked entries below a destination root as real directories and symlinks,
//! and [`link_report`] counts what was done.

mod link_report;
mod materialize;
mod tree;

pub use link_report::LinkReport;
pub use materialize::{
    DirectoryOutcome, LinkError, LinkOutcome, LinkStyle, Materializer, Placement,
};
pub use tree::{TreeRoot, TreeRootError, roots_overlap, walk};

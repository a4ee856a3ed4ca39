//! Validation and creation of the tree roots a run operates on.

mod confirmation;
mod path_resolver;

pub use confirmation::{AlwaysAbort, AlwaysCreate, ConfirmationPolicy, MissingRootPolicy};
pub use path_resolver::{PathResolver, ResolutionError};

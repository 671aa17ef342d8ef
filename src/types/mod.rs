//! Value types shared across the gate.
//!
//! - [`ValidationOutcome`]: the serializable `{ ok, reason }` view of a check
//! - [`ResolvedPath`]: an absolute, symlink-resolved path that passed policy
//! - [`WorkingDir`]: a working directory chosen by the resolver, with its source

mod outcome;
mod resolved_path;

pub use outcome::ValidationOutcome;
pub use resolved_path::{ResolvedPath, WorkingDir, WorkingDirSource};

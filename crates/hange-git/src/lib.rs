//! Hange Git - Access to repository state through the git CLI.
//!
//! Relies on `git` being installed on the system.

mod error;
mod git;

pub use error::{GitError, GitResult};
pub use git::Git;

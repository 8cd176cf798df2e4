//! Hange Agent - Remote resource orchestration.
//!
//! This crate drives the hosted LLM service:
//! - Concurrent upload of ingested files and index creation
//! - Bounded and unbounded polling for server-side readiness
//! - Best-effort cleanup of every remote resource, even after cancellation
//! - Commit message generation from repository state

mod commit;
mod error;
mod explain;
mod ledger;
mod poll;
mod prompts;
mod service;
#[cfg(test)]
mod testing;

pub use commit::{CommitWriter, CommitWriterConfig};
pub use error::{AgentError, AgentResult};
pub use explain::{Explainer, ExplainerConfig};
pub use ledger::ResourceLedger;
pub use poll::{poll, Probe};
pub use service::{Prompt, RemoteService};

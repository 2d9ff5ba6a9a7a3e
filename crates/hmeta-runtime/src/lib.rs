//! hmeta-runtime
//!
//! The IO half of the reconciliation engine. [`Reconciler::converge`] is the
//! single entry point:
//!
//! 1. fetch the baseline snapshot (failure degrades to an empty baseline)
//! 2. Phase A: track each declared table in order; an already-tracked table
//!    gets its customization merged and re-applied
//! 3. Phase B: once every table is tracked, create the relationships the
//!    snapshot does not have
//!
//! Requests are strictly sequential. Idempotent markers from the gateway are
//! absorbed; any other failure aborts the run with the table (and
//! relationship) that caused it.

mod error;
mod fetch;
mod orchestrator;

pub use error::{ConvergeError, Phase, SnapshotError};
pub use fetch::fetch_snapshot;
pub use orchestrator::{ConvergeReport, Reconciler};

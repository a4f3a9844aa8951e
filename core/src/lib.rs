//! Mission state store, persistence, and transfer codec for Misión.
//!
//! # Architecture
//!
//! - [`store`] - the Mission State Store: single source of truth for the
//!   active team's record, every mutation persisted before returning
//! - [`persistence`] - durable per-team JSON records with atomic writes
//! - [`codec`] - the Transfer Codec: portable text form for manual
//!   backup/restore across machines, with whole-document validation
//! - [`report`] - read-only report and progress summary, pure functions of
//!   the store snapshot
//!
//! The store is synchronous and single-threaded by design: operations run to
//! completion, there is no internal locking, and persistence is a scoped
//! fire-and-forget side effect. Persistence faults are logged and do not roll
//! back in-memory mutations.

pub mod codec;
pub mod persistence;
pub mod report;
pub mod store;

pub use codec::{Import, ImportError, export_file_name};
pub use persistence::{StateDir, default_data_dir};
pub use report::{MissionSummary, mission_report, mission_summary};
pub use store::MissionStore;

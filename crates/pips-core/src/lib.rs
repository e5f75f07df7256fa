//! pips-core: die faces, roll controller, bounded history and statistics.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums for domain values, `anyhow::Result`
//!   for configuration plumbing.
//! - **Logging**: `tracing` macros (`debug!`, `trace!`); no subscriber is
//!   installed here.

pub mod config;
pub mod model;
pub mod roller;

pub use model::face::{Face, FaceError, Pip, Tier};
pub use model::history::{HISTORY_CAPACITY, HistoryLedger, RollId, RollRecord};
pub use model::stats::{Average, StatsSnapshot};
pub use roller::{RollController, RollEvent, RollPhase, RollRequest, RollView};

//! Pipeline stages for index generation.
//!
//! - `SmartFilter`: Reduce the full listing to the smart index
//! - `Updater`: Check for a new release and rewrite both indexes
//! - `ReleaseDiff`: Versions added/removed since the previous full index

pub mod diff;
pub mod filter;
pub mod update;

pub use diff::ReleaseDiff;
pub use filter::{DEFAULT_KEEP_RECENT, SmartFilter};
pub use update::{
    Decision, RefreshReason, RefreshSummary, UpdateOutcome, UpdateState, Updater,
};

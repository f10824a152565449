//! Cycle-time analysis for piston test-rig CSV logs.
//!
//! Loads a single data-logger CSV (free-text preamble followed by a
//! measurement table), groups the measurement columns into
//! physical-quantity channels, and detects mechanical cycle boundaries
//! from local minima of the piston position signal.

pub mod analysis;
pub mod data;
pub mod report;

pub use analysis::cycles::{
    extract_cycles, CycleAnalysis, CycleConfig, CycleError, CycleEvent,
};
pub use data::logger_csv::{read_logger_file, LoggerCsvError};
pub use data::recording::{Channel, ChannelRole, Recording, RoleMap, Series};
pub use report::AnalysisReport;

//! daqinspect - inspection tools for DAQ event logs
//!
//! This library provides the two analyses behind the `daqinspect` binary:
//! time-warp detection over the timestamp column of simple event dumps, and
//! flattening of a hierarchical record store into sortable text columns.

pub mod cli;
pub mod config;
pub mod dump;
pub mod error;
pub mod export;
pub mod monitor;
pub mod record;
pub mod show;
pub mod tree;
pub mod warp;

pub use error::{InspectError, Result};

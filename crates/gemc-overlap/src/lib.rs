#![warn(missing_docs)]

//! Overlap extraction from GEANT4 run logs.
//!
//! Simulation engines report geometry overlaps as warning blocks in
//! their log output. This crate scans a log for those blocks, returns
//! each overlap as a position with its diagnostic detail, and can turn
//! the list into a [`VolumeStore`](gemc_model::VolumeStore) of small
//! marker boxes for display alongside the original geometry.
//!
//! # Example
//!
//! ```no_run
//! use gemc_overlap::{marker_store, scan_log, MarkerOptions};
//!
//! let overlaps = scan_log("run.log").unwrap();
//! println!("found {} overlaps", overlaps.len());
//! let store = marker_store(&overlaps, &MarkerOptions::default()).unwrap();
//! ```

pub mod error;
pub mod marker;
pub mod scan;

pub use error::OverlapError;
pub use marker::{add_markers, marker_store, MarkerOptions};
pub use scan::{scan_log, scan_reader, scan_text, Overlap, OverlapKind};

//! Scene sharing
//!
//! A snapshot is the only thing that leaves the simulation: every coordinate
//! divided by the playfield size, so a scene drawn on a phone restores
//! proportionally on a desktop. Text encoding is JSON; wrapping it into a URL
//! or clipboard payload is the host's business.

pub mod snapshot;

pub use snapshot::{BaselineRecord, DotRecord, LineRecord, Snapshot, VelocityRecord};

//! Star-schema warehouse loading pipeline for music-streaming event data.
//!
//! Drops and recreates a fixed set of tables, bulk-loads raw JSON event and
//! song-metadata files from S3 into staging tables via engine-native COPY,
//! then runs set-based INSERT ... SELECT transformations that populate the
//! fact and dimension tables. The warehouse engine does all the heavy
//! lifting; this crate is the driver.

pub mod app;
pub mod core;
pub mod warehouse;

//! Ephemeris snapshot data and the catalogs published alongside it.
//!
//! Snapshots arrive as whole JSON assets and replace the previous one in a
//! single step. Nothing downstream ever observes a partially applied state.

/// Body sizes and per-body presentation table.
pub mod catalog;

/// Encounter catalog and encounter code descriptions.
pub mod encounters;

/// UTC epoch parsing, stepping and snapshot asset paths.
pub mod epoch;

/// Snapshot request ledger, publication and stale result discard.
pub mod loader;

/// Serialised snapshot shape and validation.
pub mod model;

//! fleetshare CLI library.
//!
//! Output formatting, terminal styling, and the in-process simulation
//! harness used by the `fleetshare-cli` binary.

pub mod output;
pub mod simulation;
pub mod terminal;

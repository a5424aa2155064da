//! End-to-end test support for Cadence
//!
//! - `harness`: isolated temporary databases
//! - `mocks`: content catalogs and sprint outcomes for journeys

pub mod harness;
pub mod mocks;

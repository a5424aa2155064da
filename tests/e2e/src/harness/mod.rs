//! Test harness
//!
//! Database lifecycle helpers shared by the journey tests.

mod db_manager;

pub use db_manager::TestDatabaseManager;

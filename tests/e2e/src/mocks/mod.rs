//! Test data
//!
//! Content catalogs and answered sprints built from a small fixed word list.

mod fixtures;

pub use fixtures::{CatalogFixture, TestDataFactory, UNIT1_WORDS};

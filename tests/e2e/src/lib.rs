//! End-to-end test support for Refrain
//!
//! - [`harness::TestDatabaseManager`]: isolated on-disk libraries
//! - [`mocks::TestDataFactory`]: songs, play histories and named scenarios

pub mod harness;

pub use harness::TestDatabaseManager;
pub use mocks::{TestDataFactory, TestScenario};

//! Shared test utilities for batchflow integration tests.
//!
//! This module provides:
//! - `ManualEngine`, an execution engine the test finishes by hand
//! - `AutoEngine`, an engine that finishes every run on its own
//! - Builders for tasks and helpers that wait on driver state

pub mod builders;
pub mod engine;

// Each test binary uses a different subset.
#[allow(unused_imports)]
pub use builders::*;
#[allow(unused_imports)]
pub use engine::{AutoEngine, Invocation, ManualEngine};

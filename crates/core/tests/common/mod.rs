//! Shared helpers for the pf-core integration tests.
//!
//! - Fixtures: credential resolvers, payment requests, scripted runtimes
//! - Assertions over the event stream a run emits

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

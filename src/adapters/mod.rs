//! Adapter implementations of the port traits.
//!
//! - `live`: the real machine
//! - `memory`: in-memory doubles for tests
//! - `traced`: decorators that log each call

pub mod live;
pub mod memory;
pub mod traced;

//! Test support
//!
//! Mock collaborators for driving the relay core without a broker or the
//! surrounding system. Exposed publicly so downstream consumers can reuse
//! them in their own tests.

pub mod mocks;

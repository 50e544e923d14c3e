//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, secrets, errors)
//! - `pairing` - Single-use pairing keys
//! - `machine` - Registered machines, status and telemetry
//! - `realtime` - Envelope protocol and connection lifecycle

pub mod foundation;
pub mod machine;
pub mod pairing;
pub mod realtime;

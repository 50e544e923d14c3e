//! Xornet backend - machine pairing and live telemetry relay.
//!
//! Users issue short-lived pairing keys, machine reporters redeem them to
//! register, and dashboards receive the reporters' telemetry in real time.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;

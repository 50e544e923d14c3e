//! Pairing handlers.

mod authority;
mod sweeper;

pub use authority::{IssuedKey, PairingAuthority, PairingPolicy};
pub use sweeper::spawn_key_sweeper;

//! Pairing domain - ephemeral single-use keys that bridge a user session to
//! a new machine registration.

mod errors;
mod key;
mod token;

pub use errors::PairingError;
pub use key::PairingKey;
pub use token::PairingToken;

//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `PairingKeyStore` - Active pairing keys with atomic redeem
//! - `MachineRepository` - Machine persistence (external document store)
//! - `UserRepository` - Owner existence checks
//! - `SessionValidator` - User session tokens
//! - `Clock` - Time source for expiry decisions

mod clock;
mod machine_repository;
mod pairing_key_store;
mod session_validator;
mod user_repository;

pub use clock::{Clock, SystemClock};
pub use machine_repository::{MachineRepository, MachineRepositoryError};
pub use pairing_key_store::{PairingKeyStore, PairingStoreError};
pub use session_validator::SessionValidator;
pub use user_repository::{User, UserRepository, UserRepositoryError};

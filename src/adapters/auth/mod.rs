//! Session validator adapters.
//!
//! - `JwtSessionValidator` - HS256 session tokens from the account service
//! - `MockSessionValidator` - fixed token table for tests and local runs

mod jwt;
mod mock;

pub use jwt::JwtSessionValidator;
pub use mock::MockSessionValidator;

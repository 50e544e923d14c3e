//! User directory adapters.

mod in_memory;
mod recording;

pub use in_memory::InMemoryUserRepository;
pub use recording::RecordingSessionValidator;

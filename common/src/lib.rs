//! Utilities shared across the workspace crates.

pub mod bit_buffer2;
pub mod cancel_token;
pub mod log_setup;

pub use bit_buffer2::BitBuffer2;
pub use cancel_token::CancelToken;

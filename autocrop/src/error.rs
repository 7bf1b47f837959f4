//! Errors for invalid crop search input.
//!
//! Only input that is rejected before any search runs is an error. A search
//! that finds nothing, or is cancelled, reports that through
//! [`SearchOutcome`](crate::SearchOutcome).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid canvas size {width}x{height}: both dimensions must be positive")]
    InvalidCanvas { width: usize, height: usize },

    #[error("Stack {stack} refers to image {member}, but only {image_count} images are active")]
    StackMemberOutOfRange {
        stack: usize,
        member: usize,
        image_count: usize,
    },

    #[error("Invalid crop area \"{0}\"")]
    InvalidCropSpec(String),

    #[error("Invalid aspect ratio \"{0}\"")]
    InvalidAspectRatio(String),
}

pub type Result<T> = std::result::Result<T, Error>;

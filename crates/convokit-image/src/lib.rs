#![deny(missing_docs)]
//! Image types for in-memory pixel buffers

/// fallible buffer allocation helpers.
pub mod allocator;

/// Error types for the image module.
pub mod error;

/// image representation for filtering purposes.
pub mod image;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize, RgbImage, RgbaImage};

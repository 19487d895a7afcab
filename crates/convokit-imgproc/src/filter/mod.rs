//! Filter operations
//!
//! This module provides linear spatial filters for image processing: kernel
//! generators, the generic 2D convolution and the separable gaussian blur.

/// Filter kernels
pub mod kernels;
pub use kernels::Kernel;

/// Border handling
mod border;
pub use border::*;

/// 2D convolution
mod convolution;
pub use convolution::{filter2d, filter2d_with_strategy};

mod error;
pub use error::FilterError;

/// Filter dispatch operations
mod ops;
pub use ops::*;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::*;

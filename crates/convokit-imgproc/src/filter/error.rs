use convokit_image::ImageError;

/// An error type for the filter module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FilterError {
    /// The Gaussian sigma is not a positive finite number.
    #[error("Invalid sigma value {0}, it must be positive and finite")]
    InvalidSigma(f64),

    /// A parameter required by the requested kernel kind was not provided.
    #[error("Missing parameter `{0}`")]
    MissingParameter(&'static str),

    /// The coefficient buffer length does not match the kernel dimensions.
    #[error("Kernel data length ({0}) does not match the kernel size {1}x{2}")]
    InvalidKernelShape(usize, usize, usize),

    /// A kernel coefficient is NaN or infinite.
    #[error("Kernel coefficient at index {0} is not finite")]
    NonFiniteCoefficient(usize),

    /// Error raised by the underlying image buffers.
    #[error(transparent)]
    Image(#[from] ImageError),
}

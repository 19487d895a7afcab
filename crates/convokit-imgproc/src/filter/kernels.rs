use convokit_image::allocator::{try_vec_from_elem, try_vec_from_slice};

use super::FilterError;

/// High-boost Laplacian sharpen. The coefficients sum to 1.5, not 1.
const SHARPEN_3X3: [f64; 9] = [
    0.0, -1.5, 0.0, //
    -1.5, 7.5, -1.5, //
    0.0, -1.5, 0.0,
];

/// Horizontal gradient (vertical edges), sums to 0.
const SOBEL_X_3X3: [f64; 9] = [
    -2.0, 0.0, 2.0, //
    -4.0, 0.0, 4.0, //
    -2.0, 0.0, 2.0,
];

/// A rectangular matrix of filter coefficients stored row-major.
///
/// The anchor of the kernel is `(width / 2, height / 2)`. A kernel never changes
/// after construction and can be shared read-only between concurrent filter calls.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Kernel {
    /// Create a kernel from row-major coefficients.
    ///
    /// A kernel with a zero dimension is allowed and treated as empty.
    ///
    /// # Arguments
    ///
    /// * `width` - Number of columns.
    /// * `height` - Number of rows.
    /// * `data` - The `width * height` coefficients, row-major.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernelShape`] if the data length does not match
    /// the dimensions and [`FilterError::NonFiniteCoefficient`] for NaN or infinite values.
    ///
    /// # Examples
    ///
    /// ```
    /// use convokit_imgproc::filter::kernels::Kernel;
    ///
    /// let kernel = Kernel::new(3, 1, vec![0.25, 0.5, 0.25]).unwrap();
    /// assert_eq!(kernel.center(), (1, 0));
    /// assert_eq!(kernel.get(2, 0), Some(0.25));
    /// ```
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self, FilterError> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(FilterError::InvalidKernelShape(data.len(), width, height));
        }

        if let Some(idx) = data.iter().position(|v| !v.is_finite()) {
            return Err(FilterError::NonFiniteCoefficient(idx));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a 3x3 kernel, e.g. from user-edited coefficients.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::NonFiniteCoefficient`] for NaN or infinite values.
    pub fn from_3x3(data: [f64; 9]) -> Result<Self, FilterError> {
        Self::new(3, 3, try_vec_from_slice(&data)?)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Anchor of the kernel as `(cx, cy)`.
    pub fn center(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    /// Whether the kernel has no coefficient.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The row-major coefficients.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// The coefficient at column `kx`, row `ky`.
    pub fn get(&self, kx: usize, ky: usize) -> Option<f64> {
        if kx >= self.width || ky >= self.height {
            return None;
        }
        self.data.get(ky * self.width + kx).copied()
    }

    /// Sum of all coefficients.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
}

// a kernel needs a well-defined center
fn odd_size(size: usize) -> usize {
    if size % 2 == 0 {
        log::debug!("even kernel size {size} bumped to {}", size + 1);
        size + 1
    } else {
        size
    }
}

fn check_sigma(sigma: f64) -> Result<(), FilterError> {
    if sigma.is_finite() && sigma > 0.0 {
        Ok(())
    } else {
        Err(FilterError::InvalidSigma(sigma))
    }
}

fn normalize(data: &mut [f64], sigma: f64) -> Result<(), FilterError> {
    let norm = data.iter().sum::<f64>();
    if !(norm.is_finite() && norm > 0.0) {
        return Err(FilterError::InvalidSigma(sigma));
    }
    data.iter_mut().for_each(|k| *k /= norm);
    Ok(())
}

/// Create a normalized 1D gaussian kernel of shape `size x 1`.
///
/// An even `size` is increased to the next odd value.
///
/// # Arguments
///
/// * `size` - The number of taps.
/// * `sigma` - The standard deviation of the gaussian, must be positive.
///
/// # Errors
///
/// Returns [`FilterError::InvalidSigma`] for a non-positive or non-finite sigma.
pub fn gaussian_kernel_1d(size: usize, sigma: f64) -> Result<Kernel, FilterError> {
    check_sigma(sigma)?;

    let size = odd_size(size);
    let center = (size / 2) as f64;
    let sigma_sq = sigma * sigma;

    let mut data = try_vec_from_elem(size, 0.0f64)?;
    data.iter_mut().enumerate().for_each(|(i, k)| {
        let x = i as f64 - center;
        *k = (-(x * x) / (2.0 * sigma_sq)).exp();
    });
    normalize(&mut data, sigma)?;

    Kernel::new(size, 1, data)
}

/// Create a normalized 2D gaussian kernel of shape `size x size`.
///
/// An even `size` is increased to the next odd value.
///
/// # Arguments
///
/// * `size` - The number of taps per axis.
/// * `sigma` - The standard deviation of the gaussian, must be positive.
///
/// # Errors
///
/// Returns [`FilterError::InvalidSigma`] for a non-positive or non-finite sigma.
///
/// # Examples
///
/// ```
/// use convokit_imgproc::filter::kernels::gaussian_kernel_2d;
///
/// let kernel = gaussian_kernel_2d(8, 2.0).unwrap();
/// assert_eq!((kernel.width(), kernel.height()), (9, 9));
/// assert!((kernel.sum() - 1.0).abs() < 1e-9);
/// ```
pub fn gaussian_kernel_2d(size: usize, sigma: f64) -> Result<Kernel, FilterError> {
    check_sigma(sigma)?;

    let size = odd_size(size);
    let center = (size / 2) as isize;
    let sigma_sq = sigma * sigma;

    let mut data = try_vec_from_elem(size.saturating_mul(size), 0.0f64)?;
    data.chunks_exact_mut(size)
        .enumerate()
        .for_each(|(i, row)| {
            let y = (i as isize - center) as f64;
            row.iter_mut().enumerate().for_each(|(j, k)| {
                let x = (j as isize - center) as f64;
                *k = (-(x * x + y * y) / (2.0 * sigma_sq)).exp();
            });
        });
    normalize(&mut data, sigma)?;

    Kernel::new(size, size, data)
}

/// Create a normalized box kernel of shape `size x size`.
///
/// An even `size` is increased to the next odd value.
///
/// # Errors
///
/// Returns an error if the coefficient buffer cannot be allocated.
pub fn box_blur_kernel(size: usize) -> Result<Kernel, FilterError> {
    let size = odd_size(size);
    let len = size.saturating_mul(size);
    let data = try_vec_from_elem(len, 1.0 / len as f64)?;
    Kernel::new(size, size, data)
}

/// The fixed 3x3 sharpen kernel `{0,-1.5,0, -1.5,7.5,-1.5, 0,-1.5,0}`.
pub fn sharpen_kernel3() -> Kernel {
    Kernel {
        width: 3,
        height: 3,
        data: SHARPEN_3X3.to_vec(),
    }
}

/// The fixed 3x3 horizontal Sobel kernel `{-2,0,2, -4,0,4, -2,0,2}`.
pub fn sobel_x_kernel3() -> Kernel {
    Kernel {
        width: 3,
        height: 3,
        data: SOBEL_X_3X3.to_vec(),
    }
}

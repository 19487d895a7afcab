use convokit_image::Image;

use super::kernels::{self, Kernel};
use super::{filter2d_with_strategy, gaussian_blur_with_strategy, BorderPolicy, FilterError};
use crate::parallel::ExecutionStrategy;

/// Smallest blur size offered to users.
pub const BLUR_SIZE_MIN: usize = 3;
/// Largest blur size offered to users.
pub const BLUR_SIZE_MAX: usize = 99;
/// Smallest sigma offered to users.
pub const SIGMA_MIN: f64 = 0.1;
/// Largest sigma offered to users.
pub const SIGMA_MAX: f64 = 50.0;
/// Bound of the user-editable 3x3 coefficients, valid values lie in `[-BOUND, BOUND]`.
pub const COEFFICIENT_BOUND: f64 = 100.0;

/// The kernels the factory knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KernelKind {
    /// `size x size` normalized gaussian.
    Gaussian2d,
    /// `size x 1` normalized gaussian.
    Gaussian1d,
    /// Fixed 3x3 sharpen.
    Sharpen,
    /// Fixed 3x3 horizontal Sobel.
    SobelX,
}

/// Build a kernel of the given kind.
///
/// `size` and `sigma` are required for the gaussian kinds and ignored otherwise.
///
/// # Errors
///
/// Returns [`FilterError::MissingParameter`] if a gaussian parameter is absent and
/// [`FilterError::InvalidSigma`] for a non-positive sigma.
///
/// # Examples
///
/// ```
/// use convokit_imgproc::filter::{generate_kernel, KernelKind};
///
/// let kernel = generate_kernel(KernelKind::Gaussian2d, Some(8), Some(2.0)).unwrap();
/// assert_eq!((kernel.width(), kernel.height()), (9, 9));
///
/// let sobel = generate_kernel(KernelKind::SobelX, None, None).unwrap();
/// assert_eq!(sobel.sum(), 0.0);
/// ```
pub fn generate_kernel(
    kind: KernelKind,
    size: Option<usize>,
    sigma: Option<f64>,
) -> Result<Kernel, FilterError> {
    let gaussian_params = || -> Result<(usize, f64), FilterError> {
        let size = size.ok_or(FilterError::MissingParameter("size"))?;
        let sigma = sigma.ok_or(FilterError::MissingParameter("sigma"))?;
        Ok((size, sigma))
    };

    match kind {
        KernelKind::Gaussian2d => {
            let (size, sigma) = gaussian_params()?;
            kernels::gaussian_kernel_2d(size, sigma)
        }
        KernelKind::Gaussian1d => {
            let (size, sigma) = gaussian_params()?;
            kernels::gaussian_kernel_1d(size, sigma)
        }
        KernelKind::Sharpen => Ok(kernels::sharpen_kernel3()),
        KernelKind::SobelX => Ok(kernels::sobel_x_kernel3()),
    }
}

/// Parameters of the gaussian blur.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaussianParams {
    /// Number of taps per axis.
    pub size: usize,
    /// Standard deviation.
    pub sigma: f64,
}

impl Default for GaussianParams {
    fn default() -> Self {
        Self {
            size: 9,
            sigma: 4.0,
        }
    }
}

impl GaussianParams {
    /// Whether the parameters lie in the ranges offered to users.
    ///
    /// The filters accept any size and positive sigma; this is for hosts that
    /// want to validate input before running a filter.
    pub fn is_in_user_range(&self) -> bool {
        (BLUR_SIZE_MIN..=BLUR_SIZE_MAX).contains(&self.size)
            && (SIGMA_MIN..=SIGMA_MAX).contains(&self.sigma)
    }
}

/// A complete filter request as issued by a host application.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Separable gaussian blur, always with [`BorderPolicy::Clamp`].
    GaussianBlur(GaussianParams),
    /// 3x3 sharpen, usually [`kernels::sharpen_kernel3`].
    Sharpen(Kernel),
    /// 3x3 edge detector, usually [`kernels::sobel_x_kernel3`].
    SobelX(Kernel),
    /// Any other kernel.
    Custom(Kernel),
}

impl FilterOp {
    /// Sharpen with the default coefficients.
    pub fn sharpen() -> Self {
        FilterOp::Sharpen(kernels::sharpen_kernel3())
    }

    /// Horizontal Sobel with the default coefficients.
    pub fn sobel_x() -> Self {
        FilterOp::SobelX(kernels::sobel_x_kernel3())
    }

    /// The kernel convolved by this operation, `None` for the separable blur.
    pub fn kernel(&self) -> Option<&Kernel> {
        match self {
            FilterOp::GaussianBlur(_) => None,
            FilterOp::Sharpen(kernel) | FilterOp::SobelX(kernel) | FilterOp::Custom(kernel) => {
                Some(kernel)
            }
        }
    }
}

/// Run a filter request with execution strategy control.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `op` - The filter to run.
/// * `border` - Border policy for kernel operations, ignored by the gaussian blur.
/// * `strategy` - Execution strategy: `Serial`, `ParallelRows`, or `Auto`.
pub fn apply_filter_with_strategy<const C: usize>(
    src: &Image<u8, C>,
    op: &FilterOp,
    border: BorderPolicy,
    strategy: ExecutionStrategy,
) -> Result<Image<u8, C>, FilterError> {
    match op {
        FilterOp::GaussianBlur(params) => {
            gaussian_blur_with_strategy(src, params.size, params.sigma, strategy)
        }
        _ => filter2d_with_strategy(src, op.kernel(), border, strategy),
    }
}

/// Run a filter request.
///
/// Uses [`ExecutionStrategy::Auto`]. For explicit control, use
/// [`apply_filter_with_strategy`].
pub fn apply_filter<const C: usize>(
    src: &Image<u8, C>,
    op: &FilterOp,
    border: BorderPolicy,
) -> Result<Image<u8, C>, FilterError> {
    apply_filter_with_strategy(src, op, border, ExecutionStrategy::Auto)
}

/// The filter families a [`FilterConfig`] can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterKind {
    /// Separable gaussian blur.
    #[default]
    GaussianBlur,
    /// 3x3 sharpen.
    Sharpen,
    /// 3x3 horizontal Sobel.
    SobelX,
    /// User supplied 3x3 kernel.
    Custom,
}

/// Declarative description of a filter run, e.g. loaded from a settings file.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FilterConfig {
    /// Which filter to run.
    pub kind: FilterKind,
    /// Gaussian parameters, used by [`FilterKind::GaussianBlur`].
    pub gaussian: GaussianParams,
    /// Row-major 3x3 coefficients overriding the defaults of the kernel filters.
    pub coefficients: Option<[f64; 9]>,
    /// Border policy for the kernel filters.
    pub border: BorderPolicy,
    /// Execution strategy.
    pub strategy: ExecutionStrategy,
}

impl FilterConfig {
    /// Build the filter request described by this config.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::MissingParameter`] for a custom filter without
    /// coefficients and [`FilterError::NonFiniteCoefficient`] for invalid ones.
    pub fn to_op(&self) -> Result<FilterOp, FilterError> {
        let custom = self.coefficients.map(Kernel::from_3x3).transpose()?;

        Ok(match (self.kind, custom) {
            (FilterKind::GaussianBlur, _) => FilterOp::GaussianBlur(self.gaussian),
            (FilterKind::Sharpen, Some(kernel)) => FilterOp::Sharpen(kernel),
            (FilterKind::Sharpen, None) => FilterOp::sharpen(),
            (FilterKind::SobelX, Some(kernel)) => FilterOp::SobelX(kernel),
            (FilterKind::SobelX, None) => FilterOp::sobel_x(),
            (FilterKind::Custom, Some(kernel)) => FilterOp::Custom(kernel),
            (FilterKind::Custom, None) => {
                return Err(FilterError::MissingParameter("coefficients"))
            }
        })
    }

    /// Build the request and run it on `src`.
    pub fn apply<const C: usize>(&self, src: &Image<u8, C>) -> Result<Image<u8, C>, FilterError> {
        apply_filter_with_strategy(src, &self.to_op()?, self.border, self.strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter2d, gaussian_blur};

    fn gradient_image() -> Result<Image<u8, 3>, FilterError> {
        let data = (0..8 * 6)
            .flat_map(|i| [(i * 5) as u8, (255 - i * 5) as u8, ((i % 8) * 30) as u8])
            .collect();
        Ok(Image::new([8, 6].into(), data)?)
    }

    #[test]
    fn test_generate_kernel() -> Result<(), FilterError> {
        let kernel = generate_kernel(KernelKind::Gaussian1d, Some(6), Some(1.0))?;
        assert_eq!((kernel.width(), kernel.height()), (7, 1));

        let kernel = generate_kernel(KernelKind::Sharpen, Some(11), Some(-3.0))?;
        assert_eq!(kernel, kernels::sharpen_kernel3());

        assert_eq!(
            generate_kernel(KernelKind::Gaussian2d, None, Some(1.0)),
            Err(FilterError::MissingParameter("size"))
        );
        assert_eq!(
            generate_kernel(KernelKind::Gaussian1d, Some(3), None),
            Err(FilterError::MissingParameter("sigma"))
        );
        assert_eq!(
            generate_kernel(KernelKind::Gaussian2d, Some(3), Some(-0.5)),
            Err(FilterError::InvalidSigma(-0.5))
        );
        Ok(())
    }

    #[test]
    fn test_gaussian_params() {
        let params = GaussianParams::default();
        assert_eq!(params.size, 9);
        assert_eq!(params.sigma, 4.0);
        assert!(params.is_in_user_range());
        assert!(!GaussianParams { size: 1, sigma: 1.0 }.is_in_user_range());
        assert!(!GaussianParams { size: 5, sigma: 60.0 }.is_in_user_range());
    }

    #[test]
    fn test_apply_filter_dispatch() -> Result<(), FilterError> {
        let img = gradient_image()?;

        let blurred = apply_filter(
            &img,
            &FilterOp::GaussianBlur(GaussianParams { size: 5, sigma: 1.5 }),
            BorderPolicy::Reflect,
        )?;
        assert_eq!(blurred, gaussian_blur(&img, 5, 1.5)?);

        let sharpened = apply_filter(&img, &FilterOp::sharpen(), BorderPolicy::Reflect)?;
        assert_eq!(
            sharpened,
            filter2d(&img, Some(&kernels::sharpen_kernel3()), BorderPolicy::Reflect)?
        );
        Ok(())
    }

    #[test]
    fn test_filter_config_to_op() -> Result<(), FilterError> {
        let config = FilterConfig::default();
        assert_eq!(
            config.to_op()?,
            FilterOp::GaussianBlur(GaussianParams::default())
        );

        let config = FilterConfig {
            kind: FilterKind::SobelX,
            ..Default::default()
        };
        assert_eq!(config.to_op()?, FilterOp::sobel_x());

        let coefficients = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];
        let config = FilterConfig {
            kind: FilterKind::Sharpen,
            coefficients: Some(coefficients),
            ..Default::default()
        };
        assert_eq!(
            config.to_op()?,
            FilterOp::Sharpen(Kernel::from_3x3(coefficients)?)
        );

        let config = FilterConfig {
            kind: FilterKind::Custom,
            ..Default::default()
        };
        assert_eq!(
            config.to_op(),
            Err(FilterError::MissingParameter("coefficients"))
        );
        Ok(())
    }

    #[test]
    fn test_filter_config_apply() -> Result<(), FilterError> {
        let img = gradient_image()?;
        let config = FilterConfig {
            kind: FilterKind::Custom,
            coefficients: Some([0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
            border: BorderPolicy::Reflect,
            strategy: ExecutionStrategy::Serial,
            ..Default::default()
        };
        assert_eq!(config.apply(&img)?, img);
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_filter_config_json() -> Result<(), Box<dyn std::error::Error>> {
        let config: FilterConfig = serde_json::from_str(
            r#"{ "kind": "Sharpen", "border": "Reflect", "strategy": "Serial" }"#,
        )?;
        assert_eq!(config.kind, FilterKind::Sharpen);
        assert_eq!(config.gaussian, GaussianParams::default());
        assert_eq!(config.border, BorderPolicy::Reflect);
        assert_eq!(config.to_op()?, FilterOp::sharpen());
        Ok(())
    }
}

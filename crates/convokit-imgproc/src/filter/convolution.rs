use convokit_image::Image;

use super::{BorderPolicy, FilterError, Kernel};
use crate::parallel::{for_each_row, ExecutionStrategy};

/// Number of leading channels that carry color; a fourth channel is alpha.
#[inline]
pub(crate) const fn color_channels<const C: usize>() -> usize {
    if C == 4 {
        3
    } else {
        C
    }
}

/// Round to the nearest integer and saturate to the `u8` range.
#[inline]
pub(crate) fn saturate_u8(val: f64) -> u8 {
    val.round().clamp(0.0, 255.0) as u8
}

/// Convolve an image with an arbitrary kernel.
///
/// Uses [`ExecutionStrategy::Auto`]. For explicit control, use [`filter2d_with_strategy`].
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `kernel` - The kernel to apply. `None` or an empty kernel leaves the image unchanged.
/// * `border` - How taps outside the image are resolved.
///
/// # Returns
///
/// A new image with the same size and alpha as the source.
///
/// # Examples
///
/// ```
/// use convokit_image::Image;
/// use convokit_imgproc::filter::{filter2d, kernels::Kernel, BorderPolicy};
///
/// let image = Image::<u8, 3>::from_size_pixel([4, 4].into(), [10, 20, 30]).unwrap();
/// let identity = Kernel::new(1, 1, vec![1.0]).unwrap();
///
/// let filtered = filter2d(&image, Some(&identity), BorderPolicy::Reflect).unwrap();
/// assert_eq!(filtered, image);
/// ```
pub fn filter2d<const C: usize>(
    src: &Image<u8, C>,
    kernel: Option<&Kernel>,
    border: BorderPolicy,
) -> Result<Image<u8, C>, FilterError> {
    filter2d_with_strategy(src, kernel, border, ExecutionStrategy::Auto)
}

/// Convolve an image with an arbitrary kernel with execution strategy control.
///
/// Every destination pixel is the per-channel weighted sum of the kernel window
/// read from the untouched source, accumulated in `f64`, rounded and saturated.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `kernel` - The kernel to apply. `None` or an empty kernel leaves the image unchanged.
/// * `border` - How taps outside the image are resolved.
/// * `strategy` - The execution strategy (Serial, ParallelRows, or Auto).
///
/// # Errors
///
/// Returns [`FilterError::Image`] if the destination buffer cannot be allocated.
pub fn filter2d_with_strategy<const C: usize>(
    src: &Image<u8, C>,
    kernel: Option<&Kernel>,
    border: BorderPolicy,
    strategy: ExecutionStrategy,
) -> Result<Image<u8, C>, FilterError> {
    let kernel = match kernel {
        Some(kernel) if !kernel.is_empty() && !src.is_empty() => kernel,
        _ => {
            log::debug!("filter2d: degenerate input, returning the source unchanged");
            return Ok(src.try_clone()?);
        }
    };

    log::trace!(
        "filter2d: {} kernel {}x{} border {:?} strategy {:?}",
        src.size(),
        kernel.width(),
        kernel.height(),
        border,
        strategy
    );

    let mut dst = Image::<u8, C>::from_size_val(src.size(), 0)?;

    let (cols, rows) = (src.cols(), src.rows());
    let (k_cols, (cx, cy)) = (kernel.width(), kernel.center());
    let row_len = cols * C;
    let num_color = color_channels::<C>();
    let src_data = src.as_slice();
    let kernel_data = kernel.as_slice();

    for_each_row(dst.as_slice_mut(), row_len, strategy, |y, dst_row| {
        let src_row = &src_data[y * row_len..(y + 1) * row_len];

        for (x, dst_pixel) in dst_row.chunks_exact_mut(C).enumerate() {
            let mut acc = [0.0f64; C];

            for (ky, k_row) in kernel_data.chunks_exact(k_cols).enumerate() {
                let sy = border.map_index(y as isize + ky as isize - cy as isize, rows);
                let tap_row = &src_data[sy * row_len..(sy + 1) * row_len];

                for (kx, &k) in k_row.iter().enumerate() {
                    let sx = border.map_index(x as isize + kx as isize - cx as isize, cols);
                    let tap = &tap_row[sx * C..(sx + 1) * C];
                    acc.iter_mut()
                        .zip(tap.iter())
                        .take(num_color)
                        .for_each(|(a, &v)| *a += v as f64 * k);
                }
            }

            dst_pixel
                .iter_mut()
                .zip(acc.iter())
                .take(num_color)
                .for_each(|(d, &a)| *d = saturate_u8(a));

            // alpha passes through
            dst_pixel[num_color..].copy_from_slice(&src_row[x * C + num_color..(x + 1) * C]);
        }
    });

    Ok(dst)
}

use convokit_image::{Image, ImageError, ImageSize, RgbImage};

/// Helper function to set a pixel's color, ignoring coordinates outside the image.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Fills the whole image with a single color.
pub fn fill<const C: usize>(img: &mut Image<u8, C>, color: [u8; C]) {
    img.as_slice_mut()
        .chunks_exact_mut(C)
        .for_each(|pixel| pixel.copy_from_slice(&color));
}

/// Draws a filled circle on an image inplace.
///
/// A pixel is covered when its squared distance to the center is strictly
/// smaller than `radius²`.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `center` - The center of the circle as a tuple of (x, y).
/// * `radius` - The radius of the circle.
/// * `color` - The color of the circle as an array of `C` elements.
pub fn draw_filled_circle<const C: usize>(
    img: &mut Image<u8, C>,
    center: (i64, i64),
    radius: i64,
    color: [u8; C],
) {
    let (cx, cy) = center;
    let radius_sq = radius * radius;
    for y in (cy - radius)..=(cy + radius) {
        for x in (cx - radius)..=(cx + radius) {
            let (dx, dy) = (x - cx, y - cy);
            if dx * dx + dy * dy < radius_sq {
                set_pixel(img, x, y, color);
            }
        }
    }
}

/// Fills the open rectangle between two corners with a color computed per pixel.
///
/// Pixels with `x0 < x < x1` and `y0 < y < y1` are written; the corners
/// themselves lie on the excluded border.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The top-left corner as a tuple of (x, y).
/// * `p1` - The bottom-right corner as a tuple of (x, y).
/// * `color_at` - Called with the pixel coordinates, returns its color.
pub fn fill_rect_with<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color_at: impl Fn(i64, i64) -> [u8; C],
) {
    for y in (p0.1 + 1)..p1.1 {
        for x in (p0.0 + 1)..p1.0 {
            set_pixel(img, x, y, color_at(x, y));
        }
    }
}

/// Builds the reference scene used to eyeball and benchmark filters.
///
/// A white canvas with a red disk in the top-left quadrant, a blue disk in the
/// bottom-right quadrant and a centered square holding a horizontal ramp from
/// `(0, 200, 255)` to `(255, 200, 0)`. At 400x400 the disks have radius 60 and
/// the square spans `(150, 250)` on both axes.
///
/// # Errors
///
/// Returns [`ImageError::AllocationFailed`] if the image cannot be allocated.
pub fn synthetic_test_image(size: ImageSize) -> Result<RgbImage, ImageError> {
    let mut img = RgbImage::from_size_val(size, 255)?;

    let (w, h) = (size.width as i64, size.height as i64);
    let radius = w.min(h) * 3 / 20;

    draw_filled_circle(&mut img, (w / 4, h / 4), radius, [255, 100, 100]);
    draw_filled_circle(&mut img, (w * 3 / 4, h * 3 / 4), radius, [100, 100, 255]);

    let (x0, x1) = (w * 3 / 8, w * 5 / 8);
    let span = (x1 - x0).max(1);
    fill_rect_with(&mut img, (x0, h * 3 / 8), (x1, h * 5 / 8), |x, _| {
        let val = ((x - x0) * 255 / span).clamp(0, 255) as u8;
        [val, 200, 255 - val]
    });

    Ok(img)
}

use crate::allocator::{try_vec_from_elem, try_vec_from_slice};
use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use convokit_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by this size.
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    /// Whether the size covers no pixel at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Represents an image with pixel data.
///
/// Pixels are stored row-major with `CHANNELS` interleaved values per pixel,
/// i.e. the buffer has shape (H, W, C).
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    size: ImageSize,
    data: Vec<T>,
}

/// An 8-bit RGB image.
pub type RgbImage = Image<u8, 3>;

/// An 8-bit RGB image with a trailing alpha channel.
pub type RgbaImage = Image<u8, 4>;

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use convokit_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     vec![0u8; 10 * 20 * 3],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        let expected = size.width * size.height * CHANNELS;
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size and default pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `val` - The value every channel of every pixel is set to.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::AllocationFailed`] if the buffer cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use convokit_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 3>::from_size_val(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     0u8,
    /// ).unwrap();
    ///
    /// assert_eq!(image.as_slice().len(), 10 * 20 * 3);
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let len = size
            .width
            .saturating_mul(size.height)
            .saturating_mul(CHANNELS);
        let data = try_vec_from_elem(len, val)?;
        Image::new(size, data)
    }

    /// Create a new image by repeating a single pixel value.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::AllocationFailed`] if the buffer cannot be allocated.
    pub fn from_size_pixel(size: ImageSize, pixel: [T; CHANNELS]) -> Result<Self, ImageError>
    where
        T: Clone + Default,
    {
        let mut image = Self::from_size_val(size, T::default())?;
        image
            .data
            .chunks_exact_mut(CHANNELS)
            .for_each(|dst| dst.clone_from_slice(&pixel));
        Ok(image)
    }

    /// Deep copy of the image that reports allocation failure instead of aborting.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::AllocationFailed`] if the buffer cannot be allocated.
    pub fn try_clone(&self) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        Ok(Self {
            size: self.size,
            data: try_vec_from_slice(&self.data)?,
        })
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// Whether the image holds no pixel.
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Get the pixel data as a flat slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get the pixel data as a flat mutable slice.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return its pixel buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Get the channels of the pixel at `(x, y)`.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[T]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let offset = (y * self.width() + x) * CHANNELS;
        self.data.get(offset..offset + CHANNELS)
    }

    /// Overwrite the channels of the pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::PixelIndexOutOfBounds`] if the coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: usize, y: usize, value: [T; CHANNELS]) -> Result<(), ImageError>
    where
        T: Clone,
    {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }
        let offset = (y * self.width() + x) * CHANNELS;
        self.data[offset..offset + CHANNELS].clone_from_slice(&value);
        Ok(())
    }
}

/// Rule resolving kernel taps that fall outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BorderPolicy {
    /// Take the outermost row or column of pixels and repeat it.
    ///
    /// Example: ...d c b a | a a a a...
    #[default]
    Clamp,

    /// Mirror across the edge, excluding the edge pixel itself.
    ///
    /// Example: ...d c b a | b c d e...
    Reflect,
}

impl BorderPolicy {
    /// Maps index `i` to a valid index within `[0, len)`.
    ///
    /// `Reflect` mirrors once across the nearest edge and the result is then
    /// clamped, so kernels wider than the image still land in bounds.
    ///
    /// # Arguments
    ///
    /// * `i` - The (possibly out-of-range) coordinate.
    /// * `len` - The valid length of the dimension, must be positive.
    ///
    /// # Examples
    ///
    /// ```
    /// use convokit_imgproc::filter::BorderPolicy;
    ///
    /// assert_eq!(BorderPolicy::Clamp.map_index(-2, 5), 0);
    /// assert_eq!(BorderPolicy::Reflect.map_index(-2, 5), 2);
    /// assert_eq!(BorderPolicy::Reflect.map_index(5, 5), 3);
    /// ```
    #[inline]
    pub fn map_index(&self, i: isize, len: usize) -> usize {
        let len = len as isize;
        let i = match self {
            BorderPolicy::Clamp => i,
            BorderPolicy::Reflect => {
                if i < 0 {
                    -i
                } else if i >= len {
                    2 * len - i - 2
                } else {
                    i
                }
            }
        };
        i.clamp(0, len - 1) as usize
    }
}

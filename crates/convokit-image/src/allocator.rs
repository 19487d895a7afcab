use crate::error::ImageError;

/// Allocate a vector of `len` elements filled with `val`.
///
/// Unlike `vec![val; len]` this reports allocation failure instead of aborting,
/// so that callers can surface it as a recoverable error.
///
/// # Arguments
///
/// * `len` - The number of elements.
/// * `val` - The value to fill the vector with.
///
/// # Errors
///
/// Returns [`ImageError::AllocationFailed`] with the requested size in bytes if
/// the memory could not be reserved.
pub fn try_vec_from_elem<T: Clone>(len: usize, val: T) -> Result<Vec<T>, ImageError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| ImageError::AllocationFailed(len.saturating_mul(std::mem::size_of::<T>())))?;
    data.resize(len, val);
    Ok(data)
}

/// Copy a slice into a newly allocated vector, reporting allocation failure.
///
/// # Errors
///
/// Returns [`ImageError::AllocationFailed`] if the memory could not be reserved.
pub fn try_vec_from_slice<T: Clone>(src: &[T]) -> Result<Vec<T>, ImageError> {
    let mut data = Vec::new();
    data.try_reserve_exact(src.len()).map_err(|_| {
        ImageError::AllocationFailed(src.len().saturating_mul(std::mem::size_of::<T>()))
    })?;
    data.extend_from_slice(src);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_vec_from_elem() -> Result<(), ImageError> {
        let data = try_vec_from_elem(6, 7u8)?;
        assert_eq!(data, vec![7u8; 6]);
        Ok(())
    }

    #[test]
    fn test_try_vec_from_elem_overflow() {
        let res = try_vec_from_elem(usize::MAX, 0u64);
        assert!(matches!(res, Err(ImageError::AllocationFailed(_))));
    }

    #[test]
    fn test_try_vec_from_slice() -> Result<(), ImageError> {
        let data = try_vec_from_slice(&[1.0f64, 2.0, 3.0])?;
        assert_eq!(data, vec![1.0, 2.0, 3.0]);
        Ok(())
    }
}

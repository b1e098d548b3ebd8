//! Owned index buffers handed across the C boundary
//!
//! The buffer handed to the caller points one element past a hidden header
//! that stores the number of indices, so releasing it needs only the pointer.

use meshgen_core::{Error, Facet, Result};

/// Flat `[v0, v1, v2, v0, v1, v2, ...]` index triples in facet order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBuffer {
    /// `data[0]` is the index count, the indices follow
    data: Vec<i32>,
}

impl OutputBuffer {
    /// Flatten facets into a newly allocated buffer.
    ///
    /// Fails with `InvalidInput` when a count or index does not fit a C `int`
    /// and with `AllocationFailed` when the memory cannot be reserved.
    pub fn from_facets(facets: &[Facet]) -> Result<Self> {
        let len = facets
            .len()
            .checked_mul(3)
            .and_then(|len| i32::try_from(len).ok())
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "{} triangles do not fit in a C int index buffer",
                    facets.len()
                ))
            })?;

        let mut data = Vec::new();
        data.try_reserve_exact(len as usize + 1)?;
        data.push(len);
        for facet in facets {
            for index in facet.indices() {
                let index = i32::try_from(index).map_err(|_| {
                    Error::InvalidInput(format!("point index {} does not fit in a C int", index))
                })?;
                data.push(index);
            }
        }
        Ok(Self { data })
    }

    /// The flat indices
    pub fn as_slice(&self) -> &[i32] {
        &self.data[1..]
    }

    /// Number of indices, three per triangle
    pub fn len(&self) -> usize {
        self.data.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn triangle_count(&self) -> usize {
        self.len() / 3
    }

    /// Re-expand the flat indices into facets
    pub fn triangles(&self) -> Vec<Facet> {
        self.as_slice()
            .chunks_exact(3)
            .map(|t| Facet::new(t[0] as usize, t[1] as usize, t[2] as usize))
            .collect()
    }

    /// Give up ownership, returning the pointer to the first index and the
    /// triangle count.
    ///
    /// The memory is reclaimed only by passing the pointer to
    /// [`OutputBuffer::release`].
    pub fn into_raw(self) -> (*mut i32, usize) {
        let triangles = self.triangle_count();
        let base = Box::into_raw(self.data.into_boxed_slice()) as *mut i32;
        // SAFETY: the allocation holds the header plus every index, so one
        // past the header is in bounds or one past the end.
        (unsafe { base.add(1) }, triangles)
    }

    /// Free a buffer previously returned by [`OutputBuffer::into_raw`].
    /// A null pointer is ignored.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or come from `into_raw` and must not have been
    /// released before.
    pub unsafe fn release(ptr: *mut i32) {
        if ptr.is_null() {
            return;
        }
        let base = ptr.sub(1);
        let len = *base as usize + 1;
        drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(base, len)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facets() -> Vec<Facet> {
        vec![Facet::new(0, 1, 2), Facet::new(2, 1, 3), Facet::new(7, 5, 6)]
    }

    #[test]
    fn test_flatten_in_facet_order() {
        let buffer = OutputBuffer::from_facets(&facets()).unwrap();
        assert_eq!(buffer.as_slice(), &[0, 1, 2, 2, 1, 3, 7, 5, 6]);
        assert_eq!(buffer.len(), 9);
        assert_eq!(buffer.triangle_count(), 3);
        assert_eq!(buffer.triangles(), facets());
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = OutputBuffer::from_facets(&[]).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.triangle_count(), 0);
        assert!(buffer.triangles().is_empty());
    }

    #[test]
    fn test_index_beyond_c_int() {
        let too_big = Facet::new(0, 1, i32::MAX as usize + 1);
        let err = OutputBuffer::from_facets(&[too_big]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_raw_round_trip() {
        let buffer = OutputBuffer::from_facets(&facets()).unwrap();
        let (ptr, triangles) = buffer.into_raw();
        assert_eq!(triangles, 3);

        let view = unsafe { std::slice::from_raw_parts(ptr, triangles * 3) };
        assert_eq!(view, &[0, 1, 2, 2, 1, 3, 7, 5, 6]);
        unsafe { OutputBuffer::release(ptr) };
    }

    #[test]
    fn test_release_null_is_noop() {
        unsafe { OutputBuffer::release(std::ptr::null_mut()) };
    }
}

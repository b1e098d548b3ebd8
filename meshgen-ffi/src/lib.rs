//! # meshgen FFI
//!
//! C-callable mesh generation. Coordinates go in as a flat `double` array of
//! `np` (x, y, z) triples; an outward-oriented triangle mesh comes back as a
//! flat `int` array of index triples that the caller owns until it passes the
//! array to [`release_mesh`].
//!
//! See `include/meshgen.h` for the C declarations.

pub mod buffer;

pub use buffer::OutputBuffer;

use meshgen_core::{Error, ErrorKind, Result, SurfaceReconstructor};
use meshgen_reconstruction::MeshPipeline;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

/// Outcome of [`generate_mesh_status`]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshStatus {
    Ok = 0,
    InvalidInput = 1,
    ReconstructionFailed = 2,
    AllocationFailed = 3,
}

impl From<ErrorKind> for MeshStatus {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidInput => MeshStatus::InvalidInput,
            ErrorKind::ReconstructionFailed => MeshStatus::ReconstructionFailed,
            ErrorKind::AllocationFailed => MeshStatus::AllocationFailed,
        }
    }
}

/// Run `pipeline` over flat coordinates and flatten the result
pub fn mesh_buffer<R: SurfaceReconstructor>(
    coords: &[f64],
    pipeline: &MeshPipeline<R>,
) -> Result<OutputBuffer> {
    let output = pipeline.run_flat(coords)?;
    OutputBuffer::from_facets(output.mesh.facets())
}

unsafe fn build(coords: *const f64, np: i32) -> Result<(*mut i32, i32)> {
    if coords.is_null() {
        return Err(Error::InvalidInput("coordinate pointer is null".to_string()));
    }
    if np <= 0 {
        return Err(Error::InvalidInput(format!("point count {} is not positive", np)));
    }
    let len = (np as usize)
        .checked_mul(3)
        .ok_or_else(|| Error::InvalidInput(format!("point count {} is too large", np)))?;

    let coords = std::slice::from_raw_parts(coords, len);
    let buffer = mesh_buffer(coords, &MeshPipeline::default())?;
    let count = i32::try_from(buffer.triangle_count()).map_err(|_| {
        Error::InvalidInput(format!("{} triangles do not fit in a C int", buffer.triangle_count()))
    })?;
    let (ptr, _) = buffer.into_raw();
    Ok((ptr, count))
}

fn guarded(coords: *const f64, np: i32) -> std::result::Result<(*mut i32, i32), MeshStatus> {
    match catch_unwind(AssertUnwindSafe(|| unsafe { build(coords, np) })) {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => {
            log::debug!("generate_mesh failed: {}", e);
            Err(e.kind().into())
        }
        Err(_) => {
            log::error!("generate_mesh panicked");
            Err(MeshStatus::ReconstructionFailed)
        }
    }
}

/// Build an oriented mesh over `np` points.
///
/// Returns the index buffer and writes the triangle count to
/// `triangle_count`. On failure returns null and writes 0.
///
/// # Safety
///
/// `coords` must point to `3 * np` readable doubles and `triangle_count` must
/// be null or writable. A non-null result must be released exactly once with
/// [`release_mesh`].
#[no_mangle]
pub unsafe extern "C" fn generate_mesh(
    coords: *const f64,
    np: i32,
    triangle_count: *mut i32,
) -> *mut i32 {
    if triangle_count.is_null() {
        return ptr::null_mut();
    }
    match guarded(coords, np) {
        Ok((buffer, count)) => {
            *triangle_count = count;
            buffer
        }
        Err(_) => {
            *triangle_count = 0;
            ptr::null_mut()
        }
    }
}

/// Like [`generate_mesh`], reporting why it failed.
///
/// On success writes the buffer and the triangle count through the output
/// parameters; on failure writes null and 0 to whichever of them is non-null.
///
/// # Safety
///
/// As for [`generate_mesh`]; `out_buffer` must be null or writable.
#[no_mangle]
pub unsafe extern "C" fn generate_mesh_status(
    coords: *const f64,
    np: i32,
    out_buffer: *mut *mut i32,
    out_triangle_count: *mut i32,
) -> MeshStatus {
    let result = if out_buffer.is_null() || out_triangle_count.is_null() {
        Err(MeshStatus::InvalidInput)
    } else {
        guarded(coords, np)
    };

    let (buffer, count, status) = match result {
        Ok((buffer, count)) => (buffer, count, MeshStatus::Ok),
        Err(status) => (ptr::null_mut(), 0, status),
    };
    if !out_buffer.is_null() {
        *out_buffer = buffer;
    }
    if !out_triangle_count.is_null() {
        *out_triangle_count = count;
    }
    status
}

/// Free a buffer returned by [`generate_mesh`] or [`generate_mesh_status`].
/// Null is ignored.
///
/// # Safety
///
/// `buffer` must be null or a buffer from this library that has not been
/// released yet.
#[no_mangle]
pub unsafe extern "C" fn release_mesh(buffer: *mut i32) {
    OutputBuffer::release(buffer);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(MeshStatus::Ok as i32, 0);
        assert_eq!(MeshStatus::from(ErrorKind::InvalidInput) as i32, 1);
        assert_eq!(MeshStatus::from(ErrorKind::ReconstructionFailed) as i32, 2);
        assert_eq!(MeshStatus::from(ErrorKind::AllocationFailed) as i32, 3);
    }

    #[test]
    fn test_mesh_buffer() {
        let coords = meshgen_core::shapes::unit_cube().to_flat();
        let buffer = mesh_buffer(&coords, &MeshPipeline::default()).unwrap();
        assert_eq!(buffer.triangle_count(), 12);
        assert!(buffer.as_slice().iter().all(|&i| (0..8).contains(&i)));
    }
}

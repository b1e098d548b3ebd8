//! Tests driving the C entry points the way a foreign caller would

use meshgen_core::{shapes, Facet, TriangleMesh};
use meshgen_ffi::{generate_mesh, generate_mesh_status, release_mesh, MeshStatus};
use meshgen_reconstruction::{signed_volume, ParallelConfig};
use std::ptr;

fn cube_coords() -> Vec<f64> {
    shapes::unit_cube().to_flat()
}

#[test]
fn test_generate_and_release_cube() {
    let coords = cube_coords();
    let mut count = -1;
    let buffer = unsafe { generate_mesh(coords.as_ptr(), 8, &mut count) };

    assert!(!buffer.is_null());
    assert_eq!(count, 12);

    let indices = unsafe { std::slice::from_raw_parts(buffer, 3 * count as usize) };
    let facets: Vec<Facet> = indices
        .chunks_exact(3)
        .map(|t| Facet::new(t[0] as usize, t[1] as usize, t[2] as usize))
        .collect();
    unsafe { release_mesh(buffer) };

    let mesh = TriangleMesh::new(shapes::unit_cube(), facets).unwrap();
    assert!(mesh.is_closed());
    let volume = signed_volume(mesh.cloud(), mesh.facets(), &ParallelConfig::default());
    assert!((volume - 1.0).abs() < 1e-9);
}

#[test]
fn test_generate_mesh_status_success() {
    let coords = shapes::icosahedron(1.0).to_flat();
    let mut buffer = ptr::null_mut();
    let mut count = 0;
    let status = unsafe { generate_mesh_status(coords.as_ptr(), 12, &mut buffer, &mut count) };

    assert_eq!(status, MeshStatus::Ok);
    assert_eq!(count, 20);
    assert!(!buffer.is_null());
    unsafe { release_mesh(buffer) };
}

#[test]
fn test_null_coordinates() {
    let mut count = 7;
    let buffer = unsafe { generate_mesh(ptr::null(), 8, &mut count) };
    assert!(buffer.is_null());
    assert_eq!(count, 0);

    let mut out = ptr::null_mut();
    let status = unsafe { generate_mesh_status(ptr::null(), 8, &mut out, &mut count) };
    assert_eq!(status, MeshStatus::InvalidInput);
    assert!(out.is_null());
}

#[test]
fn test_non_positive_point_count() {
    let coords = cube_coords();
    for np in [0, -1, i32::MIN] {
        let mut count = 7;
        let buffer = unsafe { generate_mesh(coords.as_ptr(), np, &mut count) };
        assert!(buffer.is_null());
        assert_eq!(count, 0);

        let mut out = ptr::null_mut();
        let status = unsafe { generate_mesh_status(coords.as_ptr(), np, &mut out, &mut count) };
        assert_eq!(status, MeshStatus::InvalidInput);
    }
}

#[test]
fn test_null_outputs() {
    let coords = cube_coords();
    let buffer = unsafe { generate_mesh(coords.as_ptr(), 8, ptr::null_mut()) };
    assert!(buffer.is_null());

    let mut count = 7;
    let status =
        unsafe { generate_mesh_status(coords.as_ptr(), 8, ptr::null_mut(), &mut count) };
    assert_eq!(status, MeshStatus::InvalidInput);
    assert_eq!(count, 0);
}

#[test]
fn test_degenerate_geometry() {
    let coords = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 3.0, 0.0, 0.0];
    let mut buffer = ptr::null_mut();
    let mut count = 7;
    let status = unsafe { generate_mesh_status(coords.as_ptr(), 4, &mut buffer, &mut count) };

    assert_eq!(status, MeshStatus::ReconstructionFailed);
    assert!(buffer.is_null());
    assert_eq!(count, 0);
}

#[test]
fn test_non_finite_coordinates() {
    let mut coords = cube_coords();
    coords[4] = f64::INFINITY;
    let mut buffer = ptr::null_mut();
    let mut count = 0;
    let status = unsafe { generate_mesh_status(coords.as_ptr(), 8, &mut buffer, &mut count) };
    assert_eq!(status, MeshStatus::InvalidInput);
}

#[test]
fn test_release_null() {
    unsafe { release_mesh(ptr::null_mut()) };
}

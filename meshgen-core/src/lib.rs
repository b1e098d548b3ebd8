//! Core data structures and traits for meshgen
//!
//! This crate provides the fundamental types shared by the reconstruction
//! pipeline and the C boundary: points, immutable point clouds, facets,
//! triangle meshes, the error type, and the traits behind which a surface
//! reconstruction capability is plugged in.

pub mod point;
pub mod point_cloud;
pub mod mesh;
pub mod traits;
pub mod error;
pub mod shapes;

pub use point::*;
pub use point_cloud::*;
pub use mesh::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};

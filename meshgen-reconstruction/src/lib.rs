//! # meshgen reconstruction
//!
//! Turns point clouds into closed, outward-wound triangle meshes.
//!
//! - [`advancing_front`]: greedy advancing-front triangulation over empty-ball
//!   facets, the default [`SurfaceReconstructor`](meshgen_core::SurfaceReconstructor)
//! - [`orientation`]: signed volume and the global winding correction
//! - [`pipeline`]: reconstruction followed by orientation correction
//! - [`parallel`]: rayon helpers driven by an explicit [`ParallelConfig`]

pub mod advancing_front;
pub mod orientation;
pub mod parallel;
pub mod pipeline;

pub use advancing_front::*;
pub use orientation::*;
pub use parallel::ParallelConfig;
pub use pipeline::*;

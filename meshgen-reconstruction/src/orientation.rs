//! Signed volume and global winding correction
//!
//! The enclosed volume of a closed triangle mesh is the sum over facets of
//! the signed volumes of the tetrahedra they span with the origin:
//!
//! ```text
//! V = 1/6 * sum over facets (v0 . (v1 x v2))
//! ```
//!
//! A negative total means the facets wind inward. The correction reverses
//! every facet at once. It does not look for facets that disagree with the
//! majority: a mesh with mixed winding keeps its minority facets inverted.

use crate::parallel::{parallel_for_each_mut, parallel_reduce, ParallelConfig};
use meshgen_core::{Facet, Point3d, PointCloud, TriangleMesh};

/// `v0 . (v1 x v2)` for one facet, six times its tetrahedron's signed volume
pub fn facet_triple_product(points: &[Point3d], facet: &Facet) -> f64 {
    let [i, j, k] = facet.0;
    let (v0, v1, v2) = (&points[i].coords, &points[j].coords, &points[k].coords);
    v0.dot(&v1.cross(v2))
}

/// Signed volume enclosed by `facets` over `cloud`.
///
/// No closedness check is made; for an open mesh the value depends on the
/// position of the origin.
pub fn signed_volume(cloud: &PointCloud, facets: &[Facet], config: &ParallelConfig) -> f64 {
    let points = cloud.points();
    parallel_reduce(
        config,
        facets,
        0.0,
        |facet| facet_triple_product(points, facet),
        |a, b| a + b,
    ) / 6.0
}

/// Reverse the winding of every facet by swapping its last two indices
pub fn flip_winding(facets: &mut [Facet], config: &ParallelConfig) {
    parallel_for_each_mut(config, facets, Facet::flip);
}

/// Outcome of [`correct_orientation`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationReport {
    /// Signed volume as reconstructed
    pub volume_before: f64,
    /// Signed volume after the correction
    pub volume_after: f64,
    /// Whether the facets were flipped
    pub flipped: bool,
}

/// Make the signed volume of `mesh` non-negative with a single global flip.
///
/// A mesh whose volume is already non-negative is left untouched.
pub fn correct_orientation(mesh: &mut TriangleMesh, config: &ParallelConfig) -> OrientationReport {
    let volume = signed_volume(mesh.cloud(), mesh.facets(), config);
    if volume < 0.0 {
        flip_winding(mesh.facets_mut(), config);
        log::debug!("flipped {} facets, signed volume {} -> {}", mesh.face_count(), volume, -volume);
        OrientationReport {
            volume_before: volume,
            volume_after: -volume,
            flipped: true,
        }
    } else {
        OrientationReport {
            volume_before: volume,
            volume_after: volume,
            flipped: false,
        }
    }
}

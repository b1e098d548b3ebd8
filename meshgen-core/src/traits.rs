//! Core traits for meshgen
//!
//! Surface reconstruction is consumed as a capability:
//! *(ordered points, stopping criterion) -> facets*. Any implementation of
//! [`SurfaceReconstructor`] can be dropped into the pipeline without touching
//! the orientation and marshaling steps around it.

use crate::{error::Result, mesh::Facet, point::Point3d, point_cloud::PointCloud};
use serde::{Deserialize, Serialize};

/// Decides whether a reconstruction may grow through a candidate triangle
pub trait StoppingCriterion: Send + Sync {
    /// Returns `false` to reject the triangle `(a, b, c)`.
    fn accepts(&self, a: &Point3d, b: &Point3d, c: &Point3d) -> bool;
}

/// Rejects triangles whose perimeter exceeds a bound.
///
/// A bound of zero (the default) places no limit on the boundary length,
/// which makes the reconstruction purely greedy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Perimeter {
    bound: f64,
}

impl Perimeter {
    /// No maximum perimeter
    pub const fn unbounded() -> Self {
        Self { bound: 0.0 }
    }

    /// Reject triangles with a perimeter above `bound`; non-positive bounds
    /// mean unbounded.
    pub fn new(bound: f64) -> Self {
        Self {
            bound: if bound > 0.0 { bound } else { 0.0 },
        }
    }

    /// The active bound, if any
    pub fn bound(&self) -> Option<f64> {
        (self.bound > 0.0).then_some(self.bound)
    }
}

impl StoppingCriterion for Perimeter {
    fn accepts(&self, a: &Point3d, b: &Point3d, c: &Point3d) -> bool {
        match self.bound() {
            None => true,
            Some(bound) => (b - a).norm() + (c - b).norm() + (a - c).norm() <= bound,
        }
    }
}

/// Trait for surface reconstruction capabilities
pub trait SurfaceReconstructor {
    /// Triangulate the cloud, returning facets that index into it.
    ///
    /// Facets of one connected piece share a winding, but whether that
    /// winding faces outward is not guaranteed.
    fn reconstruct(
        &self,
        cloud: &PointCloud,
        criterion: &dyn StoppingCriterion,
    ) -> Result<Vec<Facet>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_perimeter_accepts_everything() {
        let criterion = Perimeter::unbounded();
        assert_eq!(criterion.bound(), None);
        assert!(criterion.accepts(
            &Point3d::new(0.0, 0.0, 0.0),
            &Point3d::new(1e9, 0.0, 0.0),
            &Point3d::new(0.0, 1e9, 0.0),
        ));
        assert_eq!(Perimeter::default(), criterion);
        assert_eq!(Perimeter::new(-3.0), criterion);
    }

    #[test]
    fn test_bounded_perimeter() {
        let criterion = Perimeter::new(3.5);
        let a = Point3d::new(0.0, 0.0, 0.0);
        let b = Point3d::new(1.0, 0.0, 0.0);
        let c = Point3d::new(0.0, 1.0, 0.0);
        // 2 + sqrt(2) ~ 3.414
        assert!(criterion.accepts(&a, &b, &c));
        assert!(!Perimeter::new(3.0).accepts(&a, &b, &c));
    }
}

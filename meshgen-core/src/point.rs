//! Point types and related functionality

use nalgebra::{Point3, Vector3};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// Whether all three coordinates are finite
pub fn is_finite_point(point: &Point3d) -> bool {
    point.coords.iter().all(|c| c.is_finite())
}

/// Componentwise bounding box of a set of points, `None` when empty
pub fn bounding_box(points: &[Point3d]) -> Option<(Point3d, Point3d)> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(min, max), p| {
        (
            Point3d::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
            Point3d::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let points = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, -2.0, 0.5),
            Point3d::new(-1.0, 1.0, 3.0),
        ];
        let (min, max) = bounding_box(&points).unwrap();
        assert_eq!(min, Point3d::new(-1.0, -2.0, 0.0));
        assert_eq!(max, Point3d::new(1.0, 1.0, 3.0));
        assert!(bounding_box(&[]).is_none());
    }

    #[test]
    fn test_is_finite_point() {
        assert!(is_finite_point(&Point3d::new(1.0, 2.0, 3.0)));
        assert!(!is_finite_point(&Point3d::new(f64::NAN, 2.0, 3.0)));
        assert!(!is_finite_point(&Point3d::new(1.0, f64::INFINITY, 3.0)));
    }
}

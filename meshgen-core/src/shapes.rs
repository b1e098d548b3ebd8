//! Sample point clouds for demos, tests and benchmarks
//!
//! The shapes mirror the reference clouds the tool has always shipped with:
//! a cube, an icosahedron, a sphere, a torus and a spherocylinder.

use crate::point::Point3d;
use crate::point_cloud::PointCloud;
use std::f64::consts::PI;

/// The 8 corners of the unit cube `[0, 1]^3`
pub fn unit_cube() -> PointCloud {
    let mut points = Vec::with_capacity(8);
    for x in [0.0, 1.0] {
        for y in [0.0, 1.0] {
            for z in [0.0, 1.0] {
                points.push(Point3d::new(x, y, z));
            }
        }
    }
    PointCloud::from_points(points)
}

/// The 12 vertices of a regular icosahedron with the given circumradius
pub fn icosahedron(radius: f64) -> PointCloud {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let scale = radius / (1.0 + phi * phi).sqrt();
    let mut points = Vec::with_capacity(12);
    for s1 in [-1.0, 1.0] {
        for s2 in [-1.0, 1.0] {
            points.push(Point3d::new(0.0, s1, s2 * phi) * scale);
            points.push(Point3d::new(s1, s2 * phi, 0.0) * scale);
            points.push(Point3d::new(s2 * phi, 0.0, s1) * scale);
        }
    }
    PointCloud::from_points(points)
}

/// `count` points spread over a sphere along a golden-angle spiral
pub fn fibonacci_sphere(count: usize, radius: f64) -> PointCloud {
    let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
    (0..count)
        .map(|i| {
            let z = 1.0 - 2.0 * (i as f64 + 0.5) / count as f64;
            let rho = (1.0 - z * z).sqrt();
            let theta = golden_angle * i as f64;
            Point3d::new(rho * theta.cos(), rho * theta.sin(), z) * radius
        })
        .collect()
}

/// A torus around the z axis sampled on a regular `rings x sides` grid
pub fn torus(major_radius: f64, minor_radius: f64, rings: usize, sides: usize) -> PointCloud {
    let mut points = Vec::with_capacity(rings * sides);
    for i in 0..rings {
        let u = 2.0 * PI * i as f64 / rings as f64;
        for j in 0..sides {
            let v = 2.0 * PI * j as f64 / sides as f64;
            let rho = major_radius + minor_radius * v.cos();
            points.push(Point3d::new(rho * u.cos(), rho * u.sin(), minor_radius * v.sin()));
        }
    }
    PointCloud::from_points(points)
}

/// A capsule along the z axis: a cylinder of the given `length` capped by
/// two hemispheres of `radius`.
///
/// The profile (cap, side, cap) is cut into `rings + 1` equal arcs; each
/// ring gets a point count matching that arc length, alternate rings are
/// rotated by half a step and both poles are included.
pub fn spherocylinder(radius: f64, length: f64, rings: usize) -> PointCloud {
    let half = length / 2.0;
    let cap = PI * radius / 2.0;
    let profile = PI * radius + length;
    let step = profile / (rings + 1) as f64;

    let mut points = vec![Point3d::new(0.0, 0.0, -half - radius)];
    for k in 1..=rings {
        let s = step * k as f64;
        let (rho, z) = if s < cap {
            let theta = s / radius;
            (radius * theta.sin(), -half - radius * theta.cos())
        } else if s < cap + length {
            (radius, -half + (s - cap))
        } else {
            let theta = (profile - s) / radius;
            (radius * theta.sin(), half + radius * theta.cos())
        };

        let count = ((2.0 * PI * rho / step).round() as usize).max(3);
        let offset = (k % 2) as f64 * PI / count as f64;
        for q in 0..count {
            let angle = offset + 2.0 * PI * q as f64 / count as f64;
            points.push(Point3d::new(rho * angle.cos(), rho * angle.sin(), z));
        }
    }
    points.push(Point3d::new(0.0, 0.0, half + radius));
    PointCloud::from_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_cube_corners() {
        let cube = unit_cube();
        assert_eq!(cube.len(), 8);
        assert_eq!(cube[0], Point3d::new(0.0, 0.0, 0.0));
        assert_eq!(cube[7], Point3d::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_icosahedron_on_sphere() {
        let ico = icosahedron(2.0);
        assert_eq!(ico.len(), 12);
        for p in &ico {
            assert_relative_eq!(p.coords.norm(), 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_fibonacci_sphere_radius() {
        let sphere = fibonacci_sphere(100, 3.0);
        assert_eq!(sphere.len(), 100);
        for p in &sphere {
            assert_relative_eq!(p.coords.norm(), 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_torus_distance_to_core_circle() {
        let cloud = torus(2.0, 0.5, 12, 8);
        assert_eq!(cloud.len(), 96);
        for p in &cloud {
            let ring = (p.x * p.x + p.y * p.y).sqrt() - 2.0;
            assert_relative_eq!((ring * ring + p.z * p.z).sqrt(), 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_spherocylinder_extent() {
        let cloud = spherocylinder(1.0, 2.0, 12);
        let (min, max) = cloud.bounding_box().unwrap();
        assert_relative_eq!(min.z, -2.0, epsilon = 1e-12);
        assert_relative_eq!(max.z, 2.0, epsilon = 1e-12);
        assert!(max.x <= 1.0 + 1e-12);
        assert_eq!(cloud.len(), 162);
    }
}

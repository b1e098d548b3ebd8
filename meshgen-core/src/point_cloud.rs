//! Point cloud data structures and the flat-buffer adapter

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// An ordered, immutable sequence of points.
///
/// The position of a point in the cloud is its identity: facets refer to
/// points by index, so the cloud exposes no way to reorder or mutate them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointCloud {
    points: Vec<Point3d>,
}

impl PointCloud {
    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<Point3d>) -> Self {
        Self { points }
    }

    /// Read a flat `[x0, y0, z0, x1, y1, z1, ...]` buffer as consecutive
    /// (x, y, z) triples.
    pub fn from_flat(coords: &[f64]) -> Result<Self> {
        let triples: &[[f64; 3]] = bytemuck::try_cast_slice(coords).map_err(|_| {
            Error::InvalidInput(format!(
                "coordinate buffer length {} is not a multiple of 3",
                coords.len()
            ))
        })?;

        let cloud = Self {
            points: triples.iter().map(|&xyz| Point3d::from(xyz)).collect(),
        };
        cloud.validate()?;
        Ok(cloud)
    }

    /// Like [`PointCloud::from_flat`], additionally checking that the buffer
    /// holds exactly `point_count` points.
    pub fn from_flat_with_count(coords: &[f64], point_count: usize) -> Result<Self> {
        match point_count.checked_mul(3) {
            Some(expected) if expected == coords.len() => Self::from_flat(coords),
            _ => Err(Error::InvalidInput(format!(
                "expected {} coordinates for {} points, got {}",
                point_count.saturating_mul(3),
                point_count,
                coords.len()
            ))),
        }
    }

    /// Check that every coordinate is finite
    pub fn validate(&self) -> Result<()> {
        match self.points.iter().position(|p| !is_finite_point(p)) {
            Some(index) => Err(Error::InvalidInput(format!(
                "point {} has a non-finite coordinate",
                index
            ))),
            None => Ok(()),
        }
    }

    /// Flatten the cloud back into `[x0, y0, z0, x1, ...]`
    pub fn to_flat(&self) -> Vec<f64> {
        self.points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The points in input order
    pub fn points(&self) -> &[Point3d] {
        &self.points
    }

    /// Get the point at `index`, if any
    pub fn get(&self, index: usize) -> Option<&Point3d> {
        self.points.get(index)
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<'_, Point3d> {
        self.points.iter()
    }

    /// Componentwise bounding box, `None` for an empty cloud
    pub fn bounding_box(&self) -> Option<(Point3d, Point3d)> {
        bounding_box(&self.points)
    }
}

impl Index<usize> for PointCloud {
    type Output = Point3d;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a Point3d;
    type IntoIter = std::slice::Iter<'a, Point3d>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl FromIterator<Point3d> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point3d>>(iter: I) -> Self {
        Self {
            points: Vec::from_iter(iter),
        }
    }
}

impl From<Vec<Point3d>> for PointCloud {
    fn from(points: Vec<Point3d>) -> Self {
        Self::from_points(points)
    }
}

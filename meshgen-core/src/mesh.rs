//! Facets and triangle meshes

use crate::error::{Error, Result};
use crate::point::*;
use crate::point_cloud::PointCloud;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A triangle given as an ordered triple of point indices.
///
/// The order encodes the winding: the facet normal follows the right-hand
/// rule over `v0 -> v1 -> v2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Facet(pub [usize; 3]);

impl Facet {
    /// Create a facet from three point indices
    pub const fn new(v0: usize, v1: usize, v2: usize) -> Self {
        Facet([v0, v1, v2])
    }

    /// The three indices in winding order
    pub fn indices(&self) -> [usize; 3] {
        self.0
    }

    /// The same triangle with the opposite winding, `(v0, v2, v1)`
    pub fn flipped(self) -> Self {
        let [v0, v1, v2] = self.0;
        Facet([v0, v2, v1])
    }

    /// Reverse the winding in place by swapping the second and third index
    pub fn flip(&mut self) {
        self.0.swap(1, 2);
    }

    /// The directed edges `v0->v1`, `v1->v2`, `v2->v0`
    pub fn edges(&self) -> [(usize, usize); 3] {
        let [v0, v1, v2] = self.0;
        [(v0, v1), (v1, v2), (v2, v0)]
    }

    /// Whether the facet references three distinct points below `point_count`
    pub fn is_valid_for(&self, point_count: usize) -> bool {
        let [v0, v1, v2] = self.0;
        v0 < point_count && v1 < point_count && v2 < point_count && v0 != v1 && v1 != v2 && v0 != v2
    }
}

impl From<[usize; 3]> for Facet {
    fn from(indices: [usize; 3]) -> Self {
        Facet(indices)
    }
}

impl From<Facet> for [usize; 3] {
    fn from(facet: Facet) -> Self {
        facet.0
    }
}

/// A point cloud together with the facets reconstructed over it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    cloud: PointCloud,
    facets: Vec<Facet>,
}

impl TriangleMesh {
    /// Create a mesh, checking every facet against the cloud
    pub fn new(cloud: PointCloud, facets: Vec<Facet>) -> Result<Self> {
        if let Some((index, facet)) = facets
            .iter()
            .enumerate()
            .find(|(_, f)| !f.is_valid_for(cloud.len()))
        {
            return Err(Error::InvalidInput(format!(
                "facet {} {:?} is not a triangle over {} points",
                index,
                facet.0,
                cloud.len()
            )));
        }
        Ok(Self { cloud, facets })
    }

    /// The underlying point cloud
    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    /// The mesh vertices, i.e. the points of the cloud
    pub fn vertices(&self) -> &[Point3d] {
        self.cloud.points()
    }

    /// The facets in reconstruction order
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// Mutable access to the facets.
    ///
    /// Only a slice is handed out so the facet count cannot change.
    pub fn facets_mut(&mut self) -> &mut [Facet] {
        &mut self.facets
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.cloud.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.facets.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.cloud.is_empty() || self.facets.is_empty()
    }

    /// Split the mesh back into its cloud and facets
    pub fn into_parts(self) -> (PointCloud, Vec<Facet>) {
        (self.cloud, self.facets)
    }

    /// Directed edges whose reverse is not used by any facet.
    ///
    /// Empty for a closed, consistently wound mesh. Sorted for stable output.
    pub fn boundary_edges(&self) -> Vec<(usize, usize)> {
        let directed: HashSet<(usize, usize)> =
            self.facets.iter().flat_map(|f| f.edges()).collect();
        let mut boundary: Vec<(usize, usize)> = directed
            .iter()
            .filter(|&&(u, v)| !directed.contains(&(v, u)))
            .copied()
            .collect();
        boundary.sort_unstable();
        boundary
    }

    /// Whether every edge is shared by exactly one opposite pair of facets
    pub fn is_closed(&self) -> bool {
        let mut directed = HashSet::with_capacity(self.facets.len() * 3);
        for edge in self.facets.iter().flat_map(|f| f.edges()) {
            if !directed.insert(edge) {
                return false;
            }
        }
        !self.facets.is_empty() && directed.iter().all(|&(u, v)| directed.contains(&(v, u)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> TriangleMesh {
        let cloud = PointCloud::from_points(vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
            Point3d::new(0.0, 0.0, 1.0),
        ]);
        let facets = vec![
            Facet::new(0, 2, 1),
            Facet::new(0, 1, 3),
            Facet::new(1, 2, 3),
            Facet::new(0, 3, 2),
        ];
        TriangleMesh::new(cloud, facets).unwrap()
    }

    #[test]
    fn test_facet_flip() {
        let mut facet = Facet::new(4, 7, 9);
        assert_eq!(facet.flipped(), Facet::new(4, 9, 7));
        facet.flip();
        assert_eq!(facet, Facet::new(4, 9, 7));
        facet.flip();
        assert_eq!(facet, Facet::new(4, 7, 9));
    }

    #[test]
    fn test_facet_edges() {
        let facet = Facet::new(0, 1, 2);
        assert_eq!(facet.edges(), [(0, 1), (1, 2), (2, 0)]);
        assert_eq!(facet.flipped().edges(), [(0, 2), (2, 1), (1, 0)]);
    }

    #[test]
    fn test_facet_validity() {
        assert!(Facet::new(0, 1, 2).is_valid_for(3));
        assert!(!Facet::new(0, 1, 3).is_valid_for(3));
        assert!(!Facet::new(0, 1, 1).is_valid_for(3));
        assert!(!Facet::new(2, 1, 2).is_valid_for(3));
    }

    #[test]
    fn test_mesh_rejects_out_of_range_facet() {
        let cloud = PointCloud::from_points(vec![Point3d::origin(); 3]);
        let err = TriangleMesh::new(cloud, vec![Facet::new(0, 1, 5)]).unwrap_err();
        assert!(err.to_string().contains("facet 0"));
    }

    #[test]
    fn test_closed_tetrahedron() {
        let mesh = tetrahedron();
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.vertex_count(), 4);
        assert!(mesh.is_closed());
        assert!(mesh.boundary_edges().is_empty());
    }

    #[test]
    fn test_open_and_inconsistent_meshes() {
        let (cloud, mut facets) = tetrahedron().into_parts();
        facets.pop();
        let open = TriangleMesh::new(cloud.clone(), facets.clone()).unwrap();
        assert!(!open.is_closed());
        // The removed facet (0, 3, 2) leaves the reverses of its edges open
        assert_eq!(open.boundary_edges(), vec![(0, 2), (2, 3), (3, 0)]);

        // Reuses the directed edge 0->2 of facet (0, 2, 1)
        facets.push(Facet::new(0, 2, 3));
        let inconsistent = TriangleMesh::new(cloud, facets).unwrap();
        assert!(!inconsistent.is_closed());
    }
}

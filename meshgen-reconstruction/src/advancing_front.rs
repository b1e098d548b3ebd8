//! Advancing-front surface reconstruction
//!
//! Grows a triangulation outward from a seed triangle, one front edge at a
//! time. Every candidate triangle must admit an empty ball through its three
//! vertices, so the facets produced are facets of the 3D Delaunay
//! triangulation of the cloud. Candidates are processed in order of the radius
//! of their smallest empty ball, smallest first.
//!
//! A new facet on front edge `a -> b` of facet `(a, b, c)` is wound `(b, a, p)`,
//! so each connected piece of the surface is consistently wound. Which way the
//! winding faces depends on the seed and is not controlled here.
//!
//! Where the neighbourhood of a point is close to flat, its principal
//! component normal constrains the facets around it: a facet must lie within
//! [`AdvancingFrontConfig::max_normal_angle`] of that plane, and a new facet
//! must face the same side of it as the facet it grows from. On noisy samples
//! this keeps slivers across the shell out of the surface and stops the front
//! from folding back over itself. Neighbourhoods without a dominant plane,
//! such as the corners of a cube, are left unconstrained.

use itertools::Itertools;
use meshgen_core::{
    Error, Facet, Point3d, PointCloud, Result, StoppingCriterion, SurfaceReconstructor, Vector3d,
};
use nalgebra::{Matrix3, SymmetricEigen};
use priority_queue::PriorityQueue;
use rayon::prelude::*;
use rstar::primitives::GeomWithData;
use rstar::RTree;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

type IndexedPoint = GeomWithData<[f64; 3], usize>;

/// Relative size below which a triangle or a line offset counts as zero
const DEGENERATE: f64 = 1e-12;

/// Configuration for [`AdvancingFront`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvancingFrontConfig {
    /// Candidate apexes examined per front edge, and neighbours per seed point
    pub neighbors: usize,
    /// Largest fold allowed between a facet and its neighbour across an edge, in radians
    pub max_dihedral_angle: f64,
    /// Slack on the empty-ball test, relative to the squared extent of the cloud
    pub tolerance: f64,
    /// Neighbourhood size, the point included, for local surface normals
    pub normal_neighbors: usize,
    /// Largest `smallest eigenvalue / trace` of a neighbourhood covariance
    /// for it to count as flat
    pub max_surface_variation: f64,
    /// Largest angle between a facet and the local surface plane at its
    /// vertices, in radians
    pub max_normal_angle: f64,
}

impl Default for AdvancingFrontConfig {
    fn default() -> Self {
        Self {
            neighbors: 24,
            max_dihedral_angle: 5.0 * PI / 6.0,
            tolerance: 1e-9,
            normal_neighbors: 12,
            max_surface_variation: 0.1,
            max_normal_angle: PI / 3.0,
        }
    }
}

impl AdvancingFrontConfig {
    /// Set the number of nearest neighbours examined
    pub fn with_neighbors(mut self, neighbors: usize) -> Self {
        self.neighbors = neighbors;
        self
    }

    /// Set the maximum dihedral fold in radians
    pub fn with_max_dihedral_angle(mut self, angle: f64) -> Self {
        self.max_dihedral_angle = angle;
        self
    }

    /// Set the relative empty-ball tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the neighbourhood size for local normals
    pub fn with_normal_neighbors(mut self, normal_neighbors: usize) -> Self {
        self.normal_neighbors = normal_neighbors;
        self
    }

    /// Set the flatness threshold; 0 disables local normals
    pub fn with_max_surface_variation(mut self, variation: f64) -> Self {
        self.max_surface_variation = variation;
        self
    }

    /// Set the largest facet tilt against the local surface, in radians
    pub fn with_max_normal_angle(mut self, angle: f64) -> Self {
        self.max_normal_angle = angle;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.neighbors < 2 {
            return Err(Error::InvalidInput(format!(
                "at least 2 neighbours are needed, got {}",
                self.neighbors
            )));
        }
        if !(self.max_dihedral_angle > 0.0 && self.max_dihedral_angle <= PI) {
            return Err(Error::InvalidInput(format!(
                "maximum dihedral angle {} is outside (0, pi]",
                self.max_dihedral_angle
            )));
        }
        if !(self.tolerance >= 0.0 && self.tolerance.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "tolerance {} must be finite and non-negative",
                self.tolerance
            )));
        }
        if self.normal_neighbors < 3 {
            return Err(Error::InvalidInput(format!(
                "at least 3 points are needed for a local normal, got {}",
                self.normal_neighbors
            )));
        }
        if !(self.max_surface_variation >= 0.0 && self.max_surface_variation.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "surface variation {} must be finite and non-negative",
                self.max_surface_variation
            )));
        }
        if !(self.max_normal_angle > 0.0 && self.max_normal_angle <= PI / 2.0) {
            return Err(Error::InvalidInput(format!(
                "maximum normal angle {} is outside (0, pi/2]",
                self.max_normal_angle
            )));
        }
        Ok(())
    }
}

/// Greedy advancing-front reconstructor over empty-ball facets
#[derive(Debug, Clone, Default)]
pub struct AdvancingFront {
    config: AdvancingFrontConfig,
}

impl AdvancingFront {
    /// Create a reconstructor with the given configuration
    pub fn new(config: AdvancingFrontConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &AdvancingFrontConfig {
        &self.config
    }
}

impl SurfaceReconstructor for AdvancingFront {
    fn reconstruct(
        &self,
        cloud: &PointCloud,
        criterion: &dyn StoppingCriterion,
    ) -> Result<Vec<Facet>> {
        self.config.validate()?;
        if cloud.len() < 3 {
            return Err(Error::ReconstructionFailed(format!(
                "at least 3 points are needed, got {}",
                cloud.len()
            )));
        }

        let facets = Front::new(cloud, &self.config, criterion).run();
        if facets.is_empty() {
            return Err(Error::ReconstructionFailed(
                "no triangle admits an empty ball within the stopping criterion".to_string(),
            ));
        }
        log::debug!(
            "advancing front: {} facets over {} points",
            facets.len(),
            cloud.len()
        );
        Ok(facets)
    }
}

/// Best known apex for a front edge
#[derive(Debug, Clone, Copy)]
struct Candidate {
    radius: f64,
    edge: (usize, usize),
    apex: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: smallest ball first
        other
            .radius
            .total_cmp(&self.radius)
            .then_with(|| other.edge.cmp(&self.edge))
            .then_with(|| other.apex.cmp(&self.apex))
    }
}

/// Growth state for one reconstruction
struct Front<'a> {
    points: &'a [Point3d],
    tree: RTree<IndexedPoint>,
    config: &'a AdvancingFrontConfig,
    criterion: &'a dyn StoppingCriterion,
    scale: f64,
    min_cos_dihedral: f64,
    min_cos_normal: f64,
    /// Unoriented surface normal where the neighbourhood is flat
    normals: Vec<Option<Vector3d>>,
    /// Points before this index have been tried as seeds
    seed_cursor: usize,
    facets: Vec<Facet>,
    used_edges: HashSet<(usize, usize)>,
    /// Open directed edge -> vertex opposite it in its facet
    boundary: HashMap<(usize, usize), usize>,
    used: Vec<bool>,
    /// Number of open edges touching each vertex
    front_degree: Vec<usize>,
    queue: PriorityQueue<(usize, usize), Candidate>,
}

impl<'a> Front<'a> {
    fn new(
        cloud: &'a PointCloud,
        config: &'a AdvancingFrontConfig,
        criterion: &'a dyn StoppingCriterion,
    ) -> Self {
        let points = cloud.points();
        let tree = RTree::bulk_load(
            points
                .iter()
                .enumerate()
                .map(|(i, p)| IndexedPoint::new([p.x, p.y, p.z], i))
                .collect(),
        );

        let scale = match cloud.bounding_box() {
            Some((min, max)) => {
                let extent = (max - min).amax();
                if extent > 0.0 {
                    extent
                } else {
                    1.0
                }
            }
            None => 1.0,
        };

        let normals: Vec<Option<Vector3d>> = (0..points.len())
            .into_par_iter()
            .map(|i| local_normal(points, &tree, i, config))
            .collect();

        Self {
            points,
            tree,
            config,
            criterion,
            scale,
            min_cos_dihedral: config.max_dihedral_angle.cos(),
            min_cos_normal: config.max_normal_angle.cos(),
            normals,
            seed_cursor: 0,
            facets: Vec::new(),
            used_edges: HashSet::new(),
            boundary: HashMap::new(),
            used: vec![false; points.len()],
            front_degree: vec![0; points.len()],
            queue: PriorityQueue::new(),
        }
    }

    fn run(mut self) -> Vec<Facet> {
        while let Some(seed) = self.find_seed() {
            log::trace!("seeding component with {:?}", seed);
            self.add_facet(seed);

            while let Some((edge, candidate)) = self.queue.pop() {
                let Some(&opposite) = self.boundary.get(&edge) else {
                    continue;
                };
                let (a, b) = edge;
                if self.is_valid_apex(a, b, opposite, candidate.apex) {
                    self.add_facet(Facet::new(b, a, candidate.apex));
                } else {
                    self.schedule(edge);
                }
            }
        }

        if !self.boundary.is_empty() {
            log::debug!("{} front edges left open", self.boundary.len());
        }
        self.facets
    }

    /// Seed triangle at the first unused point that has one. Each point is
    /// tried at most once per reconstruction.
    fn find_seed(&mut self) -> Option<Facet> {
        while self.seed_cursor < self.points.len() {
            let i = self.seed_cursor;
            if !self.used[i] {
                if let Some(seed) = self.seed_at(i) {
                    return Some(seed);
                }
            }
            self.seed_cursor += 1;
        }
        None
    }

    /// Smallest acceptable triangle between `i` and two of its unused
    /// neighbours, keyed by `(radius, j, l)`.
    fn seed_at(&self, i: usize) -> Option<Facet> {
        let neighbors = self
            .tree
            .nearest_neighbor_iter(&self.coords(i))
            .take(self.config.neighbors + 1)
            .map(|entry| entry.data)
            .filter(|&j| j != i && !self.used[j])
            .sorted();

        let mut best: Option<(f64, [usize; 2])> = None;
        for (j, l) in neighbors.tuple_combinations() {
            let Some(normal) = self.unit_normal(i, j, l) else {
                continue;
            };
            if !self
                .criterion
                .accepts(&self.points[i], &self.points[j], &self.points[l])
                || !self.fits_surface(&normal, [i, j, l])
            {
                continue;
            }
            let Some(radius) = self.empty_ball_radius(i, j, l) else {
                continue;
            };
            let better = match &best {
                None => true,
                Some((r, pair)) => {
                    radius.total_cmp(r).then([j, l].cmp(pair)) == Ordering::Less
                }
            };
            if better {
                best = Some((radius, [j, l]));
            }
        }

        best.map(|(_, [j, l])| Facet::new(i, j, l))
    }

    fn add_facet(&mut self, facet: Facet) {
        let index = self.facets.len();
        let mut opened = Vec::with_capacity(3);

        for v in facet.indices() {
            self.used[v] = true;
        }
        for (k, (u, v)) in facet.edges().into_iter().enumerate() {
            self.used_edges.insert((u, v));
            if self.boundary.remove(&(v, u)).is_some() {
                self.queue.remove(&(v, u));
                self.front_degree[u] -= 1;
                self.front_degree[v] -= 1;
            } else {
                self.boundary.insert((u, v), facet.0[(k + 2) % 3]);
                self.front_degree[u] += 1;
                self.front_degree[v] += 1;
                opened.push((u, v));
            }
        }

        log::trace!("facet {}: {:?}", index, facet);
        self.facets.push(facet);
        for edge in opened {
            self.schedule(edge);
        }
    }

    /// Queue the best apex for an open edge, if it has one
    fn schedule(&mut self, edge: (usize, usize)) {
        match self.best_candidate(edge) {
            Some(candidate) => {
                self.queue.push(edge, candidate);
            }
            None => {
                self.queue.remove(&edge);
            }
        }
    }

    fn best_candidate(&self, edge: (usize, usize)) -> Option<Candidate> {
        let (a, b) = edge;
        let opposite = *self.boundary.get(&edge)?;
        let midpoint = nalgebra::center(&self.points[a], &self.points[b]);

        self.tree
            .nearest_neighbor_iter(&[midpoint.x, midpoint.y, midpoint.z])
            .take(self.config.neighbors)
            .map(|entry| entry.data)
            .filter(|&p| self.is_valid_apex(a, b, opposite, p))
            .filter_map(|p| {
                self.empty_ball_radius(b, a, p).map(|radius| Candidate {
                    radius,
                    edge,
                    apex: p,
                })
            })
            .max()
    }

    /// Every check on `(b, a, p)` except the empty ball, which does not change
    /// as the surface grows.
    fn is_valid_apex(&self, a: usize, b: usize, opposite: usize, p: usize) -> bool {
        if p == a || p == b || p == opposite {
            return false;
        }
        // closed vertex
        if self.used[p] && self.front_degree[p] == 0 {
            return false;
        }
        if self.used_edges.contains(&(a, p)) || self.used_edges.contains(&(p, b)) {
            return false;
        }

        let (Some(normal), Some(neighbor)) =
            (self.unit_normal(b, a, p), self.unit_normal(a, b, opposite))
        else {
            return false;
        };
        if normal.dot(&neighbor) < self.min_cos_dihedral {
            return false;
        }
        if !self.fits_surface(&normal, [a, b, p]) {
            return false;
        }
        // no fold back across the local surface at the shared edge
        for v in [a, b] {
            if let Some(surface) = &self.normals[v] {
                if normal.dot(surface) * neighbor.dot(surface) <= 0.0 {
                    return false;
                }
            }
        }

        self.criterion
            .accepts(&self.points[b], &self.points[a], &self.points[p])
    }

    /// Whether a facet with unit `normal` lies close enough to the local
    /// surface plane at each of `vertices` that has one
    fn fits_surface(&self, normal: &Vector3d, vertices: [usize; 3]) -> bool {
        vertices.iter().all(|&v| match &self.normals[v] {
            Some(surface) => normal.dot(surface).abs() >= self.min_cos_normal,
            None => true,
        })
    }

    fn unit_normal(&self, i: usize, j: usize, l: usize) -> Option<Vector3d> {
        let (pi, pj, pl) = (&self.points[i], &self.points[j], &self.points[l]);
        let normal = (pj - pi).cross(&(pl - pi));
        let norm = normal.norm();
        (norm > DEGENERATE * self.scale * self.scale).then(|| normal / norm)
    }

    /// Radius of the smallest ball through `i, j, l` with no other point
    /// strictly inside, or `None` if every such ball holds one.
    ///
    /// Ball centres lie on the line `c0 + t * axis` through the circumcentre.
    /// A point `q` outside the ball at `t` satisfies
    /// `|q - c0|^2 - r^2 >= 2 t (axis . (q - c0))`, a half-line in `t`. The
    /// interval is tightened with the points found inside the current ball
    /// until the ball at the value closest to zero holds none.
    fn empty_ball_radius(&self, i: usize, j: usize, l: usize) -> Option<f64> {
        let p0 = &self.points[i];
        let a = self.points[j] - p0;
        let b = self.points[l] - p0;
        let normal = a.cross(&b);
        let norm_squared = normal.norm_squared();
        if norm_squared.sqrt() <= DEGENERATE * self.scale * self.scale {
            return None;
        }

        let center = p0
            + (b.cross(&normal) * a.norm_squared() + normal.cross(&a) * b.norm_squared())
                / (2.0 * norm_squared);
        let axis = normal / norm_squared.sqrt();
        let r_squared = (p0 - center).norm_squared();
        let slack = self.config.tolerance * self.scale * self.scale;

        let (mut lo, mut hi) = (f64::NEG_INFINITY, f64::INFINITY);
        let mut t = 0.0;
        loop {
            let query = center + axis * t;
            let mut tightened = false;

            for entry in self
                .tree
                .locate_within_distance([query.x, query.y, query.z], r_squared + t * t)
            {
                let q = entry.data;
                if q == i || q == j || q == l {
                    continue;
                }
                let v = self.points[q] - center;
                let s = axis.dot(&v);
                let d = v.norm_squared() - r_squared + slack;
                if d >= 2.0 * t * s {
                    continue;
                }
                if s.abs() < DEGENERATE * self.scale {
                    return None;
                }

                let bound = d / (2.0 * s);
                if s > 0.0 && bound < hi {
                    hi = bound;
                    tightened = true;
                } else if s < 0.0 && bound > lo {
                    lo = bound;
                    tightened = true;
                }
                if lo > hi {
                    return None;
                }
            }

            if !tightened {
                return Some((r_squared + t * t).sqrt());
            }
            t = 0.0_f64.clamp(lo, hi);
        }
    }

    fn coords(&self, i: usize) -> [f64; 3] {
        let p = &self.points[i];
        [p.x, p.y, p.z]
    }
}

/// Principal component normal of the neighbourhood of point `i`, or `None`
/// when the neighbourhood has no dominant plane.
fn local_normal(
    points: &[Point3d],
    tree: &RTree<IndexedPoint>,
    i: usize,
    config: &AdvancingFrontConfig,
) -> Option<Vector3d> {
    let p = &points[i];
    let neighborhood: Vec<&Point3d> = tree
        .nearest_neighbor_iter(&[p.x, p.y, p.z])
        .take(config.normal_neighbors)
        .map(|entry| &points[entry.data])
        .collect();
    if neighborhood.len() < 3 {
        return None;
    }

    let centroid = neighborhood
        .iter()
        .fold(Vector3d::zeros(), |sum, q| sum + q.coords)
        / neighborhood.len() as f64;
    let covariance = neighborhood
        .iter()
        .fold(Matrix3::zeros(), |sum: Matrix3<f64>, q| {
            let d = q.coords - centroid;
            sum + d * d.transpose()
        });

    let eigen = SymmetricEigen::new(covariance);
    let trace = eigen.eigenvalues.sum();
    if trace <= 0.0 {
        return None;
    }
    let smallest = eigen.eigenvalues.imin();
    (eigen.eigenvalues[smallest] / trace < config.max_surface_variation)
        .then(|| eigen.eigenvectors.column(smallest).normalize())
}

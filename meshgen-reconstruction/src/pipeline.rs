//! End-to-end mesh generation pipeline
//!
//! Flat coordinates or a point cloud go in; a reconstructed mesh whose signed
//! volume is non-negative comes out. The reconstruction step is pluggable, the
//! orientation step always runs after it.

use crate::advancing_front::AdvancingFront;
use crate::orientation::{correct_orientation, OrientationReport};
use crate::parallel::ParallelConfig;
use meshgen_core::{Error, Perimeter, PointCloud, Result, SurfaceReconstructor, TriangleMesh};

/// Configuration for the mesh pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Stopping criterion handed to the reconstructor
    pub perimeter: Perimeter,
    /// Threading for the orientation pass
    pub parallel: ParallelConfig,
}

impl PipelineConfig {
    /// Set the maximum triangle perimeter (0 for unbounded)
    pub fn with_perimeter(mut self, bound: f64) -> Self {
        self.perimeter = Perimeter::new(bound);
        self
    }

    /// Set the parallel configuration
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Result of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The oriented mesh
    pub mesh: TriangleMesh,
    /// What the orientation step found and did
    pub orientation: OrientationReport,
    /// Processing time in seconds
    pub processing_time: f32,
}

/// Reconstruct, then orient
pub struct MeshPipeline<R = AdvancingFront> {
    reconstructor: R,
    config: PipelineConfig,
}

impl MeshPipeline<AdvancingFront> {
    /// Create a pipeline using the advancing-front reconstructor
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_reconstructor(AdvancingFront::default(), config)
    }
}

impl Default for MeshPipeline<AdvancingFront> {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl<R: SurfaceReconstructor> MeshPipeline<R> {
    /// Create a pipeline around any reconstructor
    pub fn with_reconstructor(reconstructor: R, config: PipelineConfig) -> Self {
        Self {
            reconstructor,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn reconstructor(&self) -> &R {
        &self.reconstructor
    }

    /// Run the pipeline over a point cloud
    pub fn run(&self, cloud: PointCloud) -> Result<PipelineOutput> {
        let start_time = std::time::Instant::now();
        cloud.validate()?;
        log::debug!("reconstructing {} points", cloud.len());

        let facets = self.reconstructor.reconstruct(&cloud, &self.config.perimeter)?;
        if facets.is_empty() {
            return Err(Error::ReconstructionFailed(
                "reconstruction produced no facets".to_string(),
            ));
        }

        let mut mesh = TriangleMesh::new(cloud, facets).map_err(|e| match e {
            Error::InvalidInput(message) => Error::ReconstructionFailed(message),
            other => other,
        })?;
        if !mesh.is_closed() {
            log::warn!(
                "reconstructed mesh has {} open edges, its signed volume depends on the origin",
                mesh.boundary_edges().len()
            );
        }

        let orientation = correct_orientation(&mut mesh, &self.config.parallel);
        log::debug!(
            "{} triangles, signed volume {}",
            mesh.face_count(),
            orientation.volume_after
        );

        Ok(PipelineOutput {
            mesh,
            orientation,
            processing_time: start_time.elapsed().as_secs_f32(),
        })
    }

    /// Run the pipeline over a flat `[x0, y0, z0, x1, ...]` buffer
    pub fn run_flat(&self, coords: &[f64]) -> Result<PipelineOutput> {
        self.run(PointCloud::from_flat(coords)?)
    }
}

/// Convenience function for a default pipeline run over flat coordinates
pub fn mesh_from_flat(coords: &[f64]) -> Result<TriangleMesh> {
    Ok(MeshPipeline::default().run_flat(coords)?.mesh)
}

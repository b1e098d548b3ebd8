use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use meshgen_core::{shapes, PointCloud};
use meshgen_io::MeshFormat;
use meshgen_reconstruction::{
    AdvancingFront, AdvancingFrontConfig, MeshPipeline, ParallelConfig, PipelineConfig,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Reconstruct closed, outward-oriented triangle meshes from point clouds
///
/// Examples:
///   # Write a sample cloud and mesh it
///   meshgen sample spherocylinder -o capsule.dat
///   meshgen reconstruct capsule.dat -o capsule.obj
///
///   # Index triples on stdout, limiting triangle perimeters
///   meshgen reconstruct scan.xyz --format tri --perimeter 0.5
#[derive(Parser, Debug)]
#[command(name = "meshgen")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconstruct a mesh from a point file (x y z per row)
    Reconstruct {
        /// Point file, tab, space or comma separated
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format (guessed from the output extension, else obj)
        #[arg(short = 'f', long, value_enum)]
        format: Option<OutputFormat>,

        /// Maximum triangle perimeter, 0 for no limit
        #[arg(short = 'p', long, default_value = "0.0")]
        perimeter: f64,

        /// Worker threads for the orientation pass (rayon's default if omitted)
        #[arg(short = 't', long)]
        threads: Option<usize>,

        /// Nearest neighbours examined per front edge
        #[arg(short = 'k', long, default_value = "24")]
        neighbors: usize,
    },

    /// Write a sample point cloud
    Sample {
        shape: Shape,

        /// Approximate number of points (sphere, torus and spherocylinder)
        #[arg(short = 'n', long, default_value = "500")]
        points: usize,

        /// Output file (stdout if omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Obj,
    Tri,
}

impl From<OutputFormat> for MeshFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Obj => MeshFormat::Obj,
            OutputFormat::Tri => MeshFormat::TriangleList,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Shape {
    Cube,
    Icosahedron,
    Sphere,
    Torus,
    Spherocylinder,
}

fn sample(shape: Shape, points: usize) -> PointCloud {
    match shape {
        Shape::Cube => shapes::unit_cube(),
        Shape::Icosahedron => shapes::icosahedron(1.0),
        Shape::Sphere => shapes::fibonacci_sphere(points, 1.0),
        Shape::Torus => {
            let sides = ((points as f64 / 2.4).sqrt().round() as usize).max(3);
            let rings = points.div_ceil(sides).max(3);
            shapes::torus(2.0, 0.7, rings, sides)
        }
        Shape::Spherocylinder => {
            shapes::spherocylinder(1.0, 2.0, ((points as f64).sqrt() as usize).max(3))
        }
    }
}

/// Open `path` for writing, or stdout
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    })
}

fn reconstruct(
    input: &Path,
    output: Option<&Path>,
    format: Option<OutputFormat>,
    perimeter: f64,
    threads: Option<usize>,
    neighbors: usize,
) -> Result<()> {
    if perimeter < 0.0 {
        bail!("Perimeter must not be negative, got {}", perimeter);
    }

    let cloud = meshgen_io::read_point_file(input)
        .with_context(|| format!("Failed to read points from {}", input.display()))?;
    log::info!("Read {} points from {}", cloud.len(), input.display());

    let mut parallel = ParallelConfig::default();
    if let Some(threads) = threads {
        parallel = parallel.with_threads(threads);
    }
    let config = PipelineConfig::default()
        .with_perimeter(perimeter)
        .with_parallel(parallel);
    let reconstructor =
        AdvancingFront::new(AdvancingFrontConfig::default().with_neighbors(neighbors));

    let result = MeshPipeline::with_reconstructor(reconstructor, config)
        .run(cloud)
        .context("Reconstruction failed")?;
    log::info!(
        "{} triangles, signed volume {:.6}{} in {:.2}s",
        result.mesh.face_count(),
        result.orientation.volume_after,
        if result.orientation.flipped { " (winding flipped)" } else { "" },
        result.processing_time
    );

    let format = format
        .map(MeshFormat::from)
        .or_else(|| output.and_then(MeshFormat::from_path))
        .unwrap_or_default();
    meshgen_io::write_mesh(&result.mesh, format, open_output(output)?)
        .context("Failed to write mesh")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Reconstruct {
            input,
            output,
            format,
            perimeter,
            threads,
            neighbors,
        } => reconstruct(
            &input,
            output.as_deref(),
            format,
            perimeter,
            threads,
            neighbors,
        ),
        Command::Sample {
            shape,
            points,
            output,
        } => {
            let cloud = sample(shape, points);
            log::info!("Writing {} points", cloud.len());
            meshgen_io::write_points(&cloud, open_output(output.as_deref())?)
                .context("Failed to write points")?;
            Ok(())
        }
    }
}

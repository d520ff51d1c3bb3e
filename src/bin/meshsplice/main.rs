//! meshsplice CLI - retargeting pipeline steps over OBJ files and directories.
//!
//! Usage: meshsplice <COMMAND> [OPTIONS]
//!
//! Run `meshsplice --help` for available commands. Set `RUST_LOG` (or pass
//! `--verbose`) for more detailed logs.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use meshsplice::algo::align::{PointSelection, UmeyamaSolver};
use meshsplice::algo::correspond::{
    marker_correspondence, resolve_exact_indices, resolve_marker_indices, ResolveOptions,
    DEFAULT_EXACT_TOLERANCE,
};
use meshsplice::algo::normalize::normalize_mesh;
use meshsplice::algo::topology::TrailingFaces;
use meshsplice::batch::convert::{quad_to_tri_dir, tri_to_quad_dir, BoundarySource};
use meshsplice::batch::{align, region, BatchOptions, BatchReport, Progress};
use meshsplice::io::{self, markers, persist};
use meshsplice::mesh::{ConversionBoundary, Face, IndexBase, IndexMap};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "meshsplice")]
#[command(author, version, about = "Mesh bookkeeping for facial-animation retargeting", long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Split quads into triangles for every mesh in a directory
    QuadToTri {
        /// Directory of quad meshes
        input_dir: PathBuf,

        /// Output directory (receives boundaries.json as well)
        output_dir: PathBuf,

        /// Layout of triangles that were already in the input
        #[arg(short, long, value_enum, default_value = "grouped")]
        trailing: Trailing,

        /// Use single-threaded execution
        #[arg(long)]
        sequential: bool,
    },

    /// Merge triangle pairs back into quads for every mesh in a directory
    TriToQuad {
        /// Directory of triangulated meshes
        input_dir: PathBuf,

        /// Output directory
        output_dir: PathBuf,

        /// Use this boundary for every file instead of the directory's boundaries.json
        #[arg(short, long)]
        boundary: Option<usize>,

        /// Layout of the pass-through triangles
        #[arg(short, long, value_enum, default_value = "grouped")]
        trailing: Trailing,

        /// Use single-threaded execution
        #[arg(long)]
        sequential: bool,
    },

    /// Print the nearest vertex index for each marker
    Markers {
        /// Mesh file
        mesh: PathBuf,

        /// Marker file (JSON array of [x, y, z])
        markers: PathBuf,

        /// Print 0-based indices instead of 1-based
        #[arg(long)]
        zero_based: bool,

        /// Use single-threaded execution
        #[arg(long)]
        sequential: bool,
    },

    /// Write a 1-based landmark correspondence table between two meshes
    Correspond {
        /// Source mesh
        source_mesh: PathBuf,

        /// Source markers
        source_markers: PathBuf,

        /// Target mesh
        target_mesh: PathBuf,

        /// Target markers
        target_markers: PathBuf,

        /// Output table
        output: PathBuf,

        /// Use single-threaded execution
        #[arg(long)]
        sequential: bool,
    },

    /// Map each sub-mesh vertex to its super-mesh vertex and save the map as JSON
    BuildIndex {
        /// Full mesh (e.g. the head)
        super_mesh: PathBuf,

        /// Region mesh cut from it (e.g. the face)
        sub_mesh: PathBuf,

        /// Output JSON file
        output: PathBuf,

        /// Largest accepted squared distance
        #[arg(long, default_value_t = DEFAULT_EXACT_TOLERANCE)]
        tolerance: f64,
    },

    /// Cut the region out of every full mesh in a directory
    Extract {
        /// Directory of full meshes
        input_dir: PathBuf,

        /// Output directory
        output_dir: PathBuf,

        /// Index map written by build-index
        #[arg(short, long)]
        index: PathBuf,

        /// Region mesh whose faces are copied to every output
        #[arg(short, long)]
        faces: Option<PathBuf>,

        /// Use single-threaded execution
        #[arg(long)]
        sequential: bool,
    },

    /// Write every region mesh in a directory back into a full mesh
    Splice {
        /// Directory of region meshes
        input_dir: PathBuf,

        /// Output directory
        output_dir: PathBuf,

        /// Full mesh providing the untouched vertices and all faces
        #[arg(short, long)]
        base: PathBuf,

        /// Index map written by build-index
        #[arg(short, long)]
        index: PathBuf,

        /// Use single-threaded execution
        #[arg(long)]
        sequential: bool,
    },

    /// Align every mesh in a directory onto a reference mesh
    Align {
        /// Reference mesh
        reference: PathBuf,

        /// Directory of meshes to align
        input_dir: PathBuf,

        /// Output directory
        output_dir: PathBuf,

        /// Comma-separated 0-based vertex indices driving the fit
        #[arg(short, long, value_delimiter = ',', required_unless_present = "random", conflicts_with = "random")]
        points: Vec<usize>,

        /// Draw this many random vertices per file instead
        #[arg(short, long)]
        random: Option<usize>,

        /// Seed for random selection
        #[arg(long)]
        seed: Option<u64>,

        /// Use single-threaded execution
        #[arg(long)]
        sequential: bool,
    },

    /// Scale a mesh and center it at the origin
    Normalize {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Scale factor applied before centering
        #[arg(short, long, default_value = "1.0")]
        scale: f64,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Trailing {
    /// One group holding all pass-through triangles
    Grouped,
    /// One entry per pass-through triangle
    Flattened,
}

impl From<Trailing> for TrailingFaces {
    fn from(t: Trailing) -> Self {
        match t {
            Trailing::Grouped => TrailingFaces::Grouped,
            Trailing::Flattened => TrailingFaces::Flattened,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> CliResult {
    match cli.command {
        Commands::Info { input } => cmd_info(&input),

        Commands::QuadToTri {
            input_dir,
            output_dir,
            trailing,
            sequential,
        } => {
            let options = batch_options(sequential, None);
            let start = Instant::now();
            let report = quad_to_tri_dir(&input_dir, &output_dir, trailing.into(), &options)?;
            print_report(&report, start);
            Ok(())
        }

        Commands::TriToQuad {
            input_dir,
            output_dir,
            boundary,
            trailing,
            sequential,
        } => {
            let source = match boundary {
                Some(b) => BoundarySource::Uniform(ConversionBoundary::new(b)?),
                None => BoundarySource::from_ledger_dir(&input_dir)?,
            };
            let options = batch_options(sequential, None);
            let start = Instant::now();
            let report = tri_to_quad_dir(&input_dir, &output_dir, &source, trailing.into(), &options)?;
            print_report(&report, start);
            Ok(())
        }

        Commands::Markers {
            mesh,
            markers: marker_path,
            zero_based,
            sequential,
        } => {
            let mesh = io::load(&mesh)?;
            let points = markers::load(&marker_path)?;
            let base = if zero_based { IndexBase::Zero } else { IndexBase::One };
            let options = ResolveOptions::default()
                .with_base(base)
                .with_parallel(!sequential);
            let indices = resolve_marker_indices(&mesh.vertices, &points, &options)?;
            let line: Vec<String> = indices.iter().map(usize::to_string).collect();
            println!("{}", line.join(" "));
            Ok(())
        }

        Commands::Correspond {
            source_mesh,
            source_markers,
            target_mesh,
            target_markers,
            output,
            sequential,
        } => {
            let source = io::load(&source_mesh)?;
            let target = io::load(&target_mesh)?;
            let table = marker_correspondence(
                &source.vertices,
                &markers::load(&source_markers)?,
                &target.vertices,
                &markers::load(&target_markers)?,
                !sequential,
            )?;
            markers::save_table(&table, &output)?;
            println!("Saved: {} ({} landmarks)", output.display(), table.len());
            Ok(())
        }

        Commands::BuildIndex {
            super_mesh,
            sub_mesh,
            output,
            tolerance,
        } => {
            let full = io::load(&super_mesh)?;
            let sub = io::load(&sub_mesh)?;
            let map = resolve_exact_indices(&full.vertices, &sub.vertices, tolerance)?;
            persist::save_json(&map, &output)?;
            println!(
                "Saved: {} ({} of {} vertices)",
                output.display(),
                map.len(),
                map.super_vertex_count()
            );
            Ok(())
        }

        Commands::Extract {
            input_dir,
            output_dir,
            index,
            faces,
            sequential,
        } => {
            let map: IndexMap = persist::load_json(&index)?;
            let region_faces: Vec<Face> = match faces {
                Some(path) => io::load(&path)?.iter_faces().copied().collect(),
                None => Vec::new(),
            };
            let options = batch_options(sequential, None);
            let start = Instant::now();
            let report = region::extract_dir(&input_dir, &output_dir, &map, &region_faces, &options)?;
            print_report(&report, start);
            Ok(())
        }

        Commands::Splice {
            input_dir,
            output_dir,
            base,
            index,
            sequential,
        } => {
            let map: IndexMap = persist::load_json(&index)?;
            let base = io::load(&base)?;
            let options = batch_options(sequential, None);
            let start = Instant::now();
            let report = region::splice_dir(&input_dir, &output_dir, &base, &map, &options)?;
            print_report(&report, start);
            Ok(())
        }

        Commands::Align {
            reference,
            input_dir,
            output_dir,
            points,
            random,
            seed,
            sequential,
        } => {
            let reference = io::load(&reference)?;
            let selection = match random {
                Some(count) => PointSelection::Random { count },
                None => PointSelection::Fixed(points),
            };
            let options = batch_options(sequential, seed);
            let start = Instant::now();
            let report = align::align_dir(
                &reference,
                &input_dir,
                &output_dir,
                &selection,
                &UmeyamaSolver,
                &options,
            )?;
            for (path, summary) in &report.processed {
                info!(
                    file = %path.display(),
                    scale = summary.similarity.scale,
                    rms_error = summary.rms_error,
                    mean_error = summary.mean_error,
                    "aligned"
                );
            }
            print_report(&report, start);
            Ok(())
        }

        Commands::Normalize {
            input,
            output,
            scale,
        } => {
            let mesh = io::load(&input)?;
            io::save(&normalize_mesh(&mesh, scale)?, &output)?;
            println!("Saved: {}", output.display());
            Ok(())
        }
    }
}

fn batch_options(sequential: bool, seed: Option<u64>) -> BatchOptions {
    let mut options = BatchOptions::default()
        .with_parallel(!sequential)
        .with_progress(create_progress());
    options.seed = seed;
    options
}

fn print_report<T>(report: &BatchReport<T>, start: Instant) {
    println!(
        "Processed {} file(s), skipped {} ({:.2?})",
        report.processed_count(),
        report.skipped_count(),
        start.elapsed()
    );
    for skipped in &report.skipped {
        println!("  skipped {}: {}", skipped.path.display(), skipped.error);
    }
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_done = Arc::new(AtomicUsize::new(0));

    Progress::new(move |done, total, file| {
        if total == 0 {
            return;
        }

        // Workers finish out of order; only ever move forward.
        let previous = max_done.fetch_max(done, Ordering::Relaxed);
        if done <= previous {
            return;
        }

        let percent = (done * 100) / total;
        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let name = Path::new(file)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        eprint!(
            "\r[{}{}] {:3}% {}/{} {}",
            "=".repeat(filled),
            " ".repeat(bar_width - filled),
            percent,
            done,
            total,
            name
        );
        let _ = std::io::stderr().flush();

        if done >= total {
            eprintln!();
        }
    })
}

fn cmd_info(input: &Path) -> CliResult {
    let mesh = io::load(input)?;
    let (triangles, quads) = mesh.face_counts();

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {} ({} triangles, {} quads)", mesh.num_faces(), triangles, quads);

    let mesh_type = match (triangles, quads) {
        (_, 0) => "Triangle mesh",
        (0, _) => "Quad mesh",
        _ => "Mixed triangle/quad mesh",
    };
    println!("Mesh type: {}", mesh_type);

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    Ok(())
}

//! gemc-geo CLI - GEMC geometry table tools
//!
//! Loads pipe-delimited geometry tables, builds volume hierarchies,
//! scans simulation logs for overlaps, and emits SQL statements.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use gemc_model::{sql, AngleUnit, LengthUnit, ParseOptions, UnitSystem, VolumeStore};
use gemc_overlap::{marker_store, scan_log, MarkerOptions};
use gemc_scene::{HierarchyBuilder, SceneRecorder};

#[derive(Parser)]
#[command(name = "gemc-geo")]
#[command(about = "GEMC detector geometry tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display information about geometry tables
    Info {
        /// Geometry table files to load
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Build the volume hierarchy and report what was placed
    Build {
        /// Geometry table files to load
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Volume to root the hierarchy at
        #[arg(long, default_value = "root")]
        mother: String,
        /// Print the build report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Scan a simulation log for overlaps and mark them as volumes
    Overlaps {
        /// Simulation log file to scan
        log: PathBuf,
        /// Geometry tables to merge in behind the markers
        #[arg(short, long)]
        geometry: Vec<PathBuf>,
        /// Write the marker geometry table to this file
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Write the overlap list as JSON to this file
        #[arg(long)]
        json: Option<PathBuf>,
        /// Marker half-length in millimeters
        #[arg(short, long, default_value_t = 10.0)]
        size: f64,
        /// Keep merged geometry colors instead of dimming them
        #[arg(long)]
        keep_colors: bool,
    },
    /// Round-trip a geometry table, optionally converting units
    Rewrite {
        /// Geometry table file to load
        file: PathBuf,
        /// Base length unit (mm, cm, m, inch)
        #[arg(long, default_value = "cm")]
        base_length: String,
        /// Base angle unit (rad, mrad, deg)
        #[arg(long, default_value = "rad")]
        base_angle: String,
        /// Convert magnitudes into the base units while parsing
        #[arg(long)]
        convert: bool,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Emit SQL statements for a geometry table
    Sql {
        /// Geometry table file to load
        file: PathBuf,
        /// Table to insert into
        #[arg(long)]
        table: String,
        /// Variation for versioned schemas
        #[arg(long)]
        variation: Option<String>,
        /// First id for versioned schemas
        #[arg(long, default_value_t = 1)]
        first_id: i32,
        /// Emit the CREATE TABLE statement first
        #[arg(long)]
        create: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Info { files } => show_info(&files),
        Commands::Build {
            files,
            mother,
            json,
        } => build_hierarchy(&files, &mother, json),
        Commands::Overlaps {
            log,
            geometry,
            out,
            json,
            size,
            keep_colors,
        } => scan_overlaps(&log, &geometry, out.as_deref(), json.as_deref(), size, keep_colors),
        Commands::Rewrite {
            file,
            base_length,
            base_angle,
            convert,
            out,
        } => rewrite(&file, &base_length, &base_angle, convert, out.as_deref()),
        Commands::Sql {
            file,
            table,
            variation,
            first_id,
            create,
        } => emit_sql(&file, &table, variation.as_deref(), first_id, create),
    }
}

/// Detector name from a table file name, up to the `__geometry` part.
fn detector_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.split("__").next().unwrap_or(stem).to_string())
        .unwrap_or_else(|| "geometry".to_string())
}

fn load_store(files: &[PathBuf]) -> Result<VolumeStore> {
    let detector = files
        .first()
        .map(|file| detector_name(file))
        .unwrap_or_else(|| "geometry".to_string());
    let mut store = VolumeStore::new(detector);
    for file in files {
        let count = store.import_geometry_file(file)?;
        tracing::info!(file = %file.display(), count, "loaded geometry table");
    }
    Ok(store)
}

fn show_info(files: &[PathBuf]) -> Result<()> {
    let store = load_store(files)?;
    println!("{}", store.description());
    println!(
        "{} volumes, {} materials",
        store.len(),
        store.materials().len()
    );
    for record in store.find_by_mother("root") {
        let daughters = store.find_by_mother(&record.name).len();
        println!(
            "  {} ({}, {} daughters)",
            record.name, record.shape_type, daughters
        );
    }
    Ok(())
}

fn build_hierarchy(files: &[PathBuf], mother: &str, json: bool) -> Result<()> {
    let store = load_store(files)?;
    let mut builder = HierarchyBuilder::new(SceneRecorder::new());
    let report = builder.build(&store, mother)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("{report}");
    for failure in &report.failures {
        println!("  {}: {}", failure.name, failure.reason);
    }
    let scene = builder.into_toolkit();
    println!(
        "scene: {} nodes, {} solids, {} materials",
        scene.node_count(),
        scene.solid_count(),
        scene.material_count()
    );
    Ok(())
}

fn scan_overlaps(
    log: &Path,
    geometry: &[PathBuf],
    out: Option<&Path>,
    json: Option<&Path>,
    size: f64,
    keep_colors: bool,
) -> Result<()> {
    let overlaps = scan_log(log)?;
    println!("found {} overlaps in {}", overlaps.len(), log.display());
    for overlap in &overlaps {
        let [x, y, z] = overlap.position;
        let volume = overlap.volume.as_deref().unwrap_or("?");
        println!("  {volume} at ({x}, {y}, {z}) mm");
    }
    if let Some(path) = json {
        fs::write(path, serde_json::to_string_pretty(&overlaps)?)?;
        println!("wrote {}", path.display());
    }

    let options = MarkerOptions {
        size,
        ..MarkerOptions::default()
    };
    let mut store = marker_store(&overlaps, &options)?;
    let markers = store.len();
    for file in geometry {
        let count = store.import_geometry_file(file)?;
        tracing::info!(file = %file.display(), count, "merged geometry table");
    }
    if !keep_colors {
        // Dim the merged geometry so the markers stand out.
        for record in store.records_mut().iter_mut().skip(markers) {
            record.color = "cccccc9".to_string();
        }
    }
    if let Some(path) = out {
        store.export_text(fs::File::create(path)?)?;
        println!("wrote {} volumes to {}", store.len(), path.display());
    }
    Ok(())
}

fn rewrite(
    file: &Path,
    base_length: &str,
    base_angle: &str,
    convert: bool,
    out: Option<&Path>,
) -> Result<()> {
    let length = LengthUnit::from_symbol(base_length)
        .ok_or_else(|| anyhow::anyhow!("unknown length unit: {base_length}"))?;
    let angle = AngleUnit::from_symbol(base_angle)
        .ok_or_else(|| anyhow::anyhow!("unknown angle unit: {base_angle}"))?;
    let options = ParseOptions {
        system: UnitSystem::new(length, angle),
        force_unit_conversion: convert,
    };
    let mut store = VolumeStore::with_options(detector_name(file), options);
    store.import_geometry_file(file)?;

    match out {
        Some(path) => {
            store.export_text(fs::File::create(path)?)?;
            println!("wrote {} volumes to {}", store.len(), path.display());
        }
        None => store.export_text(std::io::stdout().lock())?,
    }
    Ok(())
}

fn emit_sql(
    file: &Path,
    table: &str,
    variation: Option<&str>,
    first_id: i32,
    create: bool,
) -> Result<()> {
    let mut store = VolumeStore::new(detector_name(file));
    store.import_geometry_file(file)?;

    if create {
        println!("{}", sql::create_geometry_table(table, variation.is_some()));
    }
    for (i, record) in store.records().iter().enumerate() {
        println!(
            "{}",
            sql::insert_statement(record, table, variation, first_id + i as i32)
        );
    }
    Ok(())
}

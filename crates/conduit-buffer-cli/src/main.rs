//! conduit-buffer CLI
//!
//! Buffers a GeoJSON conduit line layer into conduit, wall, excavation and
//! total footprint polygons, with optional 3D DXF export.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use conduit_buffer::{
    BufferLayers, ConduitBuffer, DimensionUnit, FeatureCollection, FeatureSource, FieldBinding,
    LogFeedback, Settings,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod geojson;

#[derive(Parser)]
#[command(name = "conduit-buffer")]
#[command(about = "Concentric buffers and 3D meshes for conduit networks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Buffer a line layer and write the four polygon layers
    Run {
        /// Input GeoJSON line layer
        #[arg(short, long)]
        input: PathBuf,
        /// Folder receiving the GeoJSON outputs
        #[arg(short, long)]
        out_dir: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Show how the input fields bind to the settings
    Fields {
        /// Input GeoJSON line layer
        #[arg(short, long)]
        input: PathBuf,
        /// TOML settings file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
struct Overrides {
    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Name of the width attribute
    #[arg(long)]
    width_field: Option<String>,
    /// Unit of the width and height attributes
    #[arg(long, value_enum)]
    unit: Option<UnitArg>,
    /// Wall thickness in meters
    #[arg(long)]
    wall_thickness: Option<f64>,
    /// Excavation width in meters
    #[arg(long)]
    excavation_width: Option<f64>,
    /// Buffer segments per quarter circle
    #[arg(long)]
    segments: Option<usize>,
    /// Write a 3D DXF mesh of all conduits
    #[arg(long)]
    export_3d: bool,
    /// Folder receiving the DXF file
    #[arg(long)]
    dxf_folder: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Mm,
    M,
}

impl From<UnitArg> for DimensionUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Mm => DimensionUnit::Millimeters,
            UnitArg::M => DimensionUnit::Meters,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            out_dir,
            overrides,
        } => {
            let settings = build_settings(&overrides)?;
            run(&input, &out_dir, settings)?;
        }
        Commands::Fields { input, config } => {
            let settings = load_settings(config.as_deref())?;
            show_fields(&input, &settings)?;
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn build_settings(overrides: &Overrides) -> Result<Settings> {
    let mut settings = load_settings(overrides.config.as_deref())?;
    apply_overrides(&mut settings, overrides);
    Ok(settings)
}

fn apply_overrides(settings: &mut Settings, o: &Overrides) {
    if let Some(field) = &o.width_field {
        settings.width_field = field.clone();
    }
    if let Some(unit) = o.unit {
        settings.unit = unit.into();
    }
    if let Some(t) = o.wall_thickness {
        settings.wall_thickness = t;
    }
    if let Some(w) = o.excavation_width {
        settings.excavation_width = w;
    }
    if let Some(n) = o.segments {
        settings.buffer_segments = n;
    }
    if o.export_3d {
        settings.export_3d = true;
    }
    if let Some(folder) = &o.dxf_folder {
        settings.output_folder = Some(folder.clone());
    }
}

/// A missing input file reaches the processor as an absent source.
fn open_source(input: &Path) -> Result<Option<FeatureCollection>> {
    if !input.exists() {
        return Ok(None);
    }
    geojson::read_lines(input).map(Some)
}

fn run(input: &Path, out_dir: &Path, settings: Settings) -> Result<()> {
    let processor = ConduitBuffer::new(settings)?;
    let source = open_source(input)?;

    let mut layers = BufferLayers::new();
    let mut feedback = LogFeedback::new();
    let summary = processor.run(source.as_ref(), &mut layers, &mut feedback)?;

    let crs = source.as_ref().and_then(|s| s.crs());
    for path in geojson::write_layers(out_dir, &layers, crs)? {
        println!("Wrote {}", path);
    }

    println!(
        "Processed {} conduits, skipped {}{}",
        summary.processed,
        summary.skipped,
        if summary.canceled { " (canceled)" } else { "" }
    );
    if let Some(path) = &summary.dxf_path {
        println!("3D mesh: {} faces in {}", summary.faces.len(), path.display());
    }
    if let Some(err) = &summary.export_error {
        println!("3D export failed: {}", err);
    }
    Ok(())
}

fn show_fields(input: &Path, settings: &Settings) -> Result<()> {
    let Some(source) = open_source(input)? else {
        return Err(conduit_buffer::ConduitError::MissingSource.into());
    };
    let binding = FieldBinding::resolve(settings, &source.field_names())?;

    let show = |field: &Option<String>| field.clone().unwrap_or_else(|| "-".into());
    println!("Features:      {}", source.feature_count());
    println!("Width:         {} ({})", binding.width, settings.unit.symbol());
    println!("Height:        {}", show(&binding.height));
    println!("Id:            {}", show(&binding.id));
    println!("Start invert:  {}", show(&binding.start_invert));
    println!("End invert:    {}", show(&binding.end_invert));
    if let Some(crs) = source.crs() {
        println!("CRS:           {}", crs);
    }
    Ok(())
}

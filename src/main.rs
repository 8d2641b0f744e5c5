// src/main.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use canvas_core::codec;
use canvas_core::config::{ExportFormat, CONFIG};
use canvas_core::font_driver::HeadlessFontDriver;
use canvas_core::project::ProjectDocument;
use canvas_core::Raster;
use clap::{Parser, Subcommand};
use log::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "canvas-core",
    version,
    about = "Flatten layered projects and convert raster files",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flatten a project's layers into one image
    Bake {
        #[arg(value_name = "PROJECT")]
        project: PathBuf,
        #[arg(value_name = "OUT")]
        out: PathBuf,
        /// Bake only the bottom UPTO layers
        #[arg(value_name = "UPTO")]
        upto: Option<usize>,
    },
    /// Re-encode a raster file
    Convert {
        #[arg(value_name = "IN")]
        input: PathBuf,
        #[arg(value_name = "OUT")]
        out: PathBuf,
    },
}

/// Output format implied by `path`'s extension, else the configured default.
fn output_format(path: &Path) -> ExportFormat {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ExportFormat::from_extension)
        .unwrap_or(CONFIG.export.format)
}

fn read_raster(path: &Path) -> Result<Raster> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    codec::decode(&bytes).with_context(|| format!("Failed to decode {}", path.display()))
}

fn write_raster(raster: &Raster, path: &Path) -> Result<()> {
    let format = output_format(path);
    debug!("Encoding {}x{} as {:?}", raster.width(), raster.height(), format);
    let bytes = codec::encode(raster, format)?;
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

fn bake(project: &Path, out: &Path, upto: Option<usize>) -> Result<()> {
    let json = fs::read_to_string(project)
        .with_context(|| format!("Failed to read project {}", project.display()))?;
    let base_dir = project.parent().unwrap_or_else(|| Path::new("."));
    let stack = ProjectDocument::from_json(&json)?
        .into_stack(|sidecar| read_raster(&base_dir.join(sidecar)))?;
    info!(
        "Loaded {} layers on a {}x{} canvas",
        stack.len(),
        stack.width(),
        stack.height()
    );

    let fonts = HeadlessFontDriver::new(&CONFIG.text);
    let flat = stack.bake(&fonts, upto);
    write_raster(&flat, out)?;
    info!("Wrote {}", out.display());
    Ok(())
}

fn convert(input: &Path, out: &Path) -> Result<()> {
    let raster = read_raster(input)?;
    write_raster(&raster, out)?;
    info!("Converted {} -> {}", input.display(), out.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the configured default filter.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(CONFIG.logging.default_filter.as_str()),
    )
    .format_timestamp_micros()
    .init();

    match cli.command {
        Command::Bake { project, out, upto } => bake(&project, &out, upto),
        Command::Convert { input, out } => convert(&input, &out),
    }
}

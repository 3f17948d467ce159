//! glass-export - glass USDZ export tool
//!
//! Converts mesh files (STL, OBJ, glTF/GLB) into USDZ packages that render the
//! mesh as transparent glass in AR viewers.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// Use modules from library
use glass_export::{batch, convert, BatchConfig, Compression};

#[derive(Parser)]
#[command(name = "glass-export")]
#[command(about = "Glass USDZ export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every matching mesh in a directory
    Batch(BatchArgs),

    /// Convert a single mesh file
    Convert {
        /// Input mesh file (STL/OBJ/glTF/GLB)
        input: PathBuf,

        /// Output .usdz file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Store the layer uncompressed and 64-byte aligned
        #[arg(long)]
        stored: bool,
    },
}

#[derive(Args)]
struct BatchArgs {
    /// Path to a glass-export.toml config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to scan for meshes (overrides config)
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// File name pattern, e.g. "*.stl" (overrides config)
    #[arg(short, long)]
    pattern: Option<String>,

    /// Suffix appended to output names (overrides config)
    #[arg(short, long)]
    suffix: Option<String>,

    /// Store layers uncompressed and 64-byte aligned
    #[arg(long)]
    stored: bool,

    /// Also write the .usda layer next to each .usdz
    #[arg(long)]
    keep_usda: bool,
}

impl BatchArgs {
    fn into_config(self) -> Result<BatchConfig> {
        let mut config = match &self.config {
            Some(path) => BatchConfig::load(path)?,
            None => BatchConfig::default(),
        };

        if let Some(input_dir) = self.input_dir {
            config.input_dir = input_dir;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(pattern) = self.pattern {
            config.pattern = pattern;
        }
        if let Some(suffix) = self.suffix {
            config.suffix = suffix;
        }
        if self.stored {
            config.compression = Compression::Stored;
        }
        if self.keep_usda {
            config.keep_usda = true;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Batch(args) => {
            let config = args.into_config()?;

            let inputs = batch::discover_inputs(&config)?;
            if inputs.is_empty() {
                anyhow::bail!(
                    "No files matching {:?} found in {}",
                    config.pattern,
                    config.input_dir.display()
                );
            }

            tracing::info!("Found {} file(s) to process:", inputs.len());
            for input in &inputs {
                tracing::info!("  - {}", input.display());
            }

            // Per-file failures are logged by the batch itself
            let summary = batch::run_batch(&config, &inputs);
            tracing::info!(
                "All files processed ({} converted, {} failed). Output saved to {}",
                summary.converted.len(),
                summary.failures.len(),
                config.output_dir.display()
            );
        }

        Commands::Convert {
            input,
            output,
            stored,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("usdz"));
            tracing::info!("Converting {:?} -> {:?}", input, output);

            let stem = output
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Output path has no file name")?
                .to_string();
            let compression = if stored {
                Compression::Stored
            } else {
                Compression::Deflated
            };

            let converted = convert::convert_one(&input, &stem, compression)?;
            if let Some(dir) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
            batch::write_atomic(&output, &converted.usdz)?;
            tracing::info!("Done!");
        }
    }

    Ok(())
}

//! Batch conversion of every matching file in a directory

use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::BatchConfig;
use crate::convert::convert_one;
use crate::error::{ConversionError, Result};

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// (input, written .usdz) for every successful conversion
    pub converted: Vec<(PathBuf, PathBuf)>,
    /// Inputs that were skipped and why
    pub failures: Vec<(PathBuf, ConversionError)>,
}

impl BatchSummary {
    pub fn attempted(&self) -> usize {
        self.converted.len() + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, input: PathBuf, outcome: Result<PathBuf>) {
        match outcome {
            Ok(output) => self.converted.push((input, output)),
            Err(err) => self.failures.push((input, err)),
        }
    }
}

/// List input files in `input_dir` matching the configured pattern, sorted by name
///
/// Only direct children that are regular files are considered.
pub fn discover_inputs(config: &BatchConfig) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for entry in WalkDir::new(&config.input_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| config.input_dir.clone());
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            ConversionError::io(path, source)
        })?;

        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(|name| config.matches(name)) {
            inputs.push(entry.into_path());
        }
    }

    Ok(inputs)
}

/// Convert every input, isolating failures per file
///
/// Creates the output directory first; a failure to create it is recorded against
/// every input.
pub fn run_batch(config: &BatchConfig, inputs: &[PathBuf]) -> BatchSummary {
    let mut summary = BatchSummary::default();

    if let Err(e) = std::fs::create_dir_all(&config.output_dir) {
        tracing::error!(
            "Failed to create output directory {}: {}",
            config.output_dir.display(),
            e
        );
        for input in inputs {
            summary.record(
                input.clone(),
                Err(ConversionError::io(
                    &config.output_dir,
                    std::io::Error::new(e.kind(), e.to_string()),
                )),
            );
        }
        return summary;
    }

    for input in inputs {
        tracing::info!("Processing: {}", input.display());
        let outcome = export_one(config, input);
        match &outcome {
            Ok(output) => tracing::info!("Created USDZ: {}", output.display()),
            Err(err) => tracing::error!("Error processing {}: {}", input.display(), err),
        }
        summary.record(input.clone(), outcome);
    }

    summary
}

/// Convert one input and write its container (and optionally the layer)
pub fn export_one(config: &BatchConfig, input: &Path) -> Result<PathBuf> {
    let stem = config.output_stem(input);
    let output = config.output_path(input);
    let converted = convert_one(input, &stem, config.compression)?;

    write_atomic(&output, &converted.usdz)?;

    if config.keep_usda {
        let layer_path = config.output_dir.join(&converted.layer_name);
        write_atomic(&layer_path, &converted.usda)?;
        tracing::debug!("Saved USD layer: {}", layer_path.display());
    }

    Ok(output)
}

/// Write through a temp file in the destination directory, then rename into place
///
/// A failed write never leaves a partial file at `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| ConversionError::io(dir, e))?;
    file.write_all(bytes)
        .and_then(|()| file.flush())
        .map_err(|e| ConversionError::io(file.path(), e))?;
    file.persist(path)
        .map_err(|e| ConversionError::io(path, e.error))?;
    Ok(())
}

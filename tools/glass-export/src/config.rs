//! Batch configuration (glass-export.toml)
//!
//! ```toml
//! input_dir = "scans"
//! output_dir = "usda"
//! pattern = "*.stl"
//! suffix = "_snowglobe"
//! compression = "deflated"   # or "stored"
//! keep_usda = false
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::formats::Compression;

/// Where to read inputs, where to write packages, and how
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Directory scanned (non-recursively) for inputs
    pub input_dir: PathBuf,
    /// Directory receiving the .usdz files, created if absent
    pub output_dir: PathBuf,
    /// File name pattern, `*` and `?` wildcards, case-sensitive
    pub pattern: String,
    /// Appended to the input stem to name outputs
    pub suffix: String,
    pub compression: Compression,
    /// Also write the .usda layer next to the .usdz
    pub keep_usda: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("usda"),
            pattern: "*.stl".to_string(),
            suffix: "_snowglobe".to_string(),
            compression: Compression::Deflated,
            keep_usda: false,
        }
    }
}

impl BatchConfig {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse config from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse glass-export config")
    }

    /// Validate config fields
    pub fn validate(&self) -> Result<()> {
        if self.pattern.trim().is_empty() {
            anyhow::bail!("Invalid pattern: must not be empty");
        }
        if self.suffix.contains(['/', '\\']) {
            anyhow::bail!(
                "Invalid suffix {:?}: must not contain path separators",
                self.suffix
            );
        }
        Ok(())
    }

    /// Whether a file name is selected by `pattern`
    pub fn matches(&self, file_name: &str) -> bool {
        wildcard_match(&self.pattern, file_name)
    }

    /// Base name shared by the .usdz and the .usda it contains
    pub fn output_stem(&self, input: &Path) -> String {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mesh".to_string());
        format!("{}{}", stem, self.suffix)
    }

    /// `<output_dir>/<stem><suffix>.usdz`
    pub fn output_path(&self, input: &Path) -> PathBuf {
        self.output_dir
            .join(format!("{}.usdz", self.output_stem(input)))
    }
}

/// Glob-style match: `*` spans any run of characters, `?` exactly one
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    // Position of the last `*` and the text position it was tried against
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    t = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

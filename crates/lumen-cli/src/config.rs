//! TOML configuration deserialisation for batch validation jobs.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Photometric files to validate, in report order.
    #[serde(default, rename = "file")]
    pub files: Vec<FileConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Integrator and tolerance settings shared by every file in the job.
#[derive(Debug, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_mc_samples")]
    pub mc_samples: usize,
    /// Uniform quadrature patch count; 0 selects the file's own grid.
    #[serde(default)]
    pub grid_samples: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Base seed for the Monte Carlo streams; drawn at random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Compute backend: "auto", "cpu", or "serial". Default: "auto".
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Load policy: "lenient" or "strict". Default: "lenient".
    #[serde(default = "default_policy")]
    pub policy: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            mc_samples: default_mc_samples(),
            grid_samples: 0,
            tolerance: default_tolerance(),
            seed: None,
            backend: default_backend(),
            policy: default_policy(),
        }
    }
}

impl ValidationConfig {
    /// Quadrature patch count, or `None` for the native grid.
    pub fn grid(&self) -> Option<usize> {
        (self.grid_samples > 0).then_some(self.grid_samples)
    }
}

fn default_mc_samples() -> usize {
    100_000
}
fn default_tolerance() -> f64 {
    lumen_core::validation::DEFAULT_TOLERANCE
}
fn default_backend() -> String {
    "auto".into()
}
fn default_policy() -> String {
    "lenient".into()
}

/// A single photometric file in the job.
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    pub path: String,
    /// Overrides the rating found in the file's metadata.
    #[serde(default)]
    pub declared_lumens: Option<f64>,
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to write report.json (default: false).
    #[serde(default)]
    pub save_json: bool,
    /// Whether to write report.csv (default: true).
    #[serde(default = "default_true")]
    pub save_csv: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_json: false,
            save_csv: true,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}
fn default_true() -> bool {
    true
}

/// Load and parse a TOML job configuration file.
///
/// Relative file paths in the job are resolved against the job file's
/// directory.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file {}", path.display()))?;
    let mut config: JobConfig = toml::from_str(&content)
        .with_context(|| format!("Invalid job file {}", path.display()))?;

    if config.files.is_empty() {
        anyhow::bail!("Job file {} lists no [[file]] entries", path.display());
    }

    if let Some(base) = path.parent() {
        for file in &mut config.files {
            let candidate = Path::new(&file.path);
            if candidate.is_relative() {
                file.path = base.join(candidate).to_string_lossy().into_owned();
            }
        }
    }
    Ok(config)
}

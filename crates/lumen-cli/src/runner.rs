//! Job runner: ties together loading, integration and report output.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use lumen_compute::{ComputeBackend, SerialBackend};
use lumen_core::integrate::{FluxIntegrator, MonteCarloIntegrator, QuadratureIntegrator};
use lumen_core::validation::{cross_validate, ValidationReport};
use lumen_core::{Edf, HorizontalSymmetry};
use lumen_formats::LoadPolicy;

use crate::config::JobConfig;

/// Validation outcome for one file of a job.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub symmetry: HorizontalSymmetry,
    pub warnings: Vec<String>,
    pub report: ValidationReport,
}

/// Both integrators configured for one run.
pub struct Integrators {
    pub monte_carlo: MonteCarloIntegrator,
    pub quadrature: QuadratureIntegrator,
}

impl Integrators {
    pub fn new(
        backend: Arc<dyn ComputeBackend>,
        mc_samples: usize,
        grid_samples: Option<usize>,
        seed: u64,
    ) -> Self {
        Self {
            monte_carlo: MonteCarloIntegrator::new(mc_samples, seed).with_backend(backend.clone()),
            quadrature: QuadratureIntegrator::new(grid_samples).with_backend(backend),
        }
    }
}

/// Pick the explicit seed, or draw one and report it so the run can be
/// repeated.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        let drawn = rand::random::<u64>();
        println!("Seed: {} (random)", drawn);
        drawn
    })
}

/// Run every file of a validation job.
///
/// A file that fails to load aborts the job; a file that loads but
/// disagrees is reported as failed.
pub fn run_validation(job: &JobConfig) -> Result<Vec<FileReport>> {
    let settings = &job.validation;
    let policy: LoadPolicy = settings
        .policy
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let backend = create_backend(&settings.backend)?;
    let seed = resolve_seed(settings.seed);
    let integrators = Integrators::new(backend, settings.mc_samples, settings.grid(), seed);

    let mut reports = Vec::with_capacity(job.files.len());
    for (index, file) in job.files.iter().enumerate() {
        let edf = lumen_formats::load(&file.path, policy)
            .with_context(|| format!("Failed to load {}", file.path))?;
        log::debug!("{}: {} warnings", file.path, edf.warnings().len());
        let declared = file.declared_lumens.or_else(|| edf.declared_lumens());

        let report = cross_validate(
            &edf,
            &integrators.monte_carlo,
            &integrators.quadrature,
            declared,
            settings.tolerance,
        )
        .with_context(|| format!("Integration failed for {}", file.path))?;

        println!(
            "  [{}/{}] {}: MC={:.2} lm, quadrature={:.2} lm, declared={} -> {}",
            index + 1,
            job.files.len(),
            file.path,
            report.monte_carlo_lm,
            report.quadrature_lm,
            declared.map_or_else(|| "n/a".to_string(), |d| format!("{:.2} lm", d)),
            if report.passed { "PASS" } else { "FAIL" }
        );

        reports.push(FileReport {
            path: file.path.clone(),
            symmetry: edf.horz_symmetry(),
            warnings: edf.warnings().iter().map(ToString::to_string).collect(),
            report,
        });
    }
    Ok(reports)
}

/// Print a human-readable summary of a loaded EDF.
pub fn print_summary(edf: &Edf, path: &Path) {
    let header = edf.header();
    println!("File:        {}", path.display());
    println!("Format:      {}", header.format.label());
    println!(
        "Type:        {}{}",
        header.photometric_type,
        if edf.is_fully_supported() { "" } else { " (sampled as constant)" }
    );
    println!(
        "Lamps:       {} x {} lm, {} W",
        header.lamp_count, header.lumens_per_lamp, header.input_watts
    );
    let [w, l, h] = edf.size();
    println!("Size:        {:.4} x {:.4} x {:.4} m (W x L x H)", w, l, h);
    println!(
        "Grid:        {} horizontal x {} vertical angles",
        edf.horz_angles().len(),
        edf.vert_angles().len()
    );
    println!("Symmetry:    {}", edf.horz_symmetry().label());
    println!(
        "Multipliers: ballast {}, candela {}",
        edf.ballast_multiplier(),
        edf.intensity_multiplier()
    );
    if let Some(curve) = edf.tilt() {
        println!("Tilt:        {} entries", curve.angles().len());
    }
    match edf.declared_lumens() {
        Some(lumens) => println!("Declared:    {} lm", lumens),
        None => println!("Declared:    n/a"),
    }
    if !edf.metadata().is_empty() {
        println!();
        for (key, value) in edf.metadata() {
            println!("  [{}] {}", key, value);
        }
    }
    if !edf.warnings().is_empty() {
        println!();
        for warning in edf.warnings() {
            println!("Warning: {}", warning);
        }
    }
}

/// Write the job reports to a CSV file with a metadata header.
pub fn write_report_csv(reports: &[FileReport], path: &Path, job: &JobConfig) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::fs::File::create(path)?;

    writeln!(file, "# Lumen flux validation report")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(
        file,
        "# mc_samples: {}, grid_samples: {}, tolerance: {}",
        job.validation.mc_samples, job.validation.grid_samples, job.validation.tolerance
    )?;
    writeln!(file, "#")?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record([
        "path",
        "symmetry",
        "monte_carlo_lm",
        "quadrature_lm",
        "declared_lm",
        "agreement",
        "monte_carlo_error",
        "quadrature_error",
        "passed",
    ])?;

    let number = |v: f64| format!("{:.6e}", v);
    let optional = |v: Option<f64>| v.map_or_else(String::new, number);
    for entry in reports {
        let r = &entry.report;
        writer.write_record([
            entry.path.clone(),
            entry.symmetry.label().to_string(),
            number(r.monte_carlo_lm),
            number(r.quadrature_lm),
            optional(r.declared_lm),
            number(r.agreement),
            optional(r.monte_carlo_error),
            optional(r.quadrature_error),
            r.passed.to_string(),
        ])?;
    }
    writer.flush()?;

    println!("Report written to: {}", path.display());
    Ok(())
}

/// Write the job reports to a JSON file.
pub fn write_report_json(reports: &[FileReport], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(reports)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    std::fs::write(path, json)?;

    println!("Report (JSON) written to: {}", path.display());
    Ok(())
}

/// Create a compute backend based on the user's preference string.
///
/// - `"serial"`: run on the calling thread.
/// - `"cpu"`: Rayon thread pool; fails if built without the `cpu` feature.
/// - `"auto"` (default): CPU when available, otherwise serial.
pub fn create_backend(preference: &str) -> Result<Arc<dyn ComputeBackend>> {
    let backend: Arc<dyn ComputeBackend> = match preference {
        "serial" => Arc::new(SerialBackend),
        "cpu" => cpu_backend()?,
        "auto" => match cpu_backend() {
            Ok(cpu) => cpu,
            Err(e) => {
                println!("CPU backend not available ({}), running serially", e);
                Arc::new(SerialBackend)
            }
        },
        other => anyhow::bail!(
            "Unknown backend '{}'. Valid backends: auto, cpu, serial",
            other
        ),
    };
    println!("Backend: {}", backend.device_info().name);
    Ok(backend)
}

#[cfg(feature = "cpu")]
fn cpu_backend() -> Result<Arc<dyn ComputeBackend>> {
    Ok(Arc::new(lumen_compute::CpuBackend::new()))
}

#[cfg(not(feature = "cpu"))]
fn cpu_backend() -> Result<Arc<dyn ComputeBackend>> {
    anyhow::bail!("binary was built without --features cpu")
}

/// Flux of `edf` under both integrators, without a pass/fail judgement.
pub fn luminous_power(edf: &Edf, integrators: &Integrators) -> Result<(f64, f64)> {
    let mc = integrators.monte_carlo.luminous_power(edf)?;
    let quad = integrators.quadrature.luminous_power(edf)?;
    Ok((mc, quad))
}

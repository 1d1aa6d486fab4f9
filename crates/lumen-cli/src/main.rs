//! Lumen command-line interface.
//!
//! Inspect, sample and integrate IES LM-63 photometric files:
//! ```sh
//! lumen inspect fixture.ies
//! lumen sample fixture.ies --phi 45 --theta 30
//! lumen power fixture.ies --samples 200000 --seed 7
//! lumen validate job.toml
//! ```

mod config;
mod runner;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use lumen_core::Edf;
use lumen_formats::LoadPolicy;

#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "Lumen: photometric file loading and flux validation")]
#[command(version)]
struct Cli {
    /// Fail on unsupported features instead of warning.
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the header, metadata, symmetry and warnings of a file.
    Inspect {
        /// Path to the IES file.
        file: PathBuf,
        /// Print the full EDF as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Sample the intensity in one direction.
    Sample {
        /// Path to the IES file.
        file: PathBuf,
        /// Azimuth in degrees.
        #[arg(long, allow_hyphen_values = true)]
        phi: f64,
        /// Zenith angle in degrees.
        #[arg(long, allow_hyphen_values = true)]
        theta: f64,
        /// Luminaire tilt in degrees.
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        tilt: f64,
    },
    /// Integrate the total luminous flux with both integrators.
    Power {
        /// Path to the IES file.
        file: PathBuf,
        /// Monte Carlo sample count.
        #[arg(long, default_value_t = 100_000)]
        samples: usize,
        /// Uniform quadrature patch count (native grid when omitted).
        #[arg(long)]
        grid: Option<usize>,
        /// Base seed for the Monte Carlo streams.
        #[arg(long)]
        seed: Option<u64>,
        /// Compute backend: auto, cpu or serial.
        #[arg(long, default_value = "auto")]
        backend: String,
    },
    /// Cross-validate the files listed in a TOML job.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load(path: &Path, strict: bool) -> anyhow::Result<Edf> {
    let policy = if strict {
        LoadPolicy::Strict
    } else {
        LoadPolicy::Lenient
    };
    lumen_formats::load(path, policy).with_context(|| format!("Failed to load {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { file, json } => {
            let edf = load(&file, cli.strict)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&edf)?);
            } else {
                runner::print_summary(&edf, &file);
            }
            Ok(())
        }
        Commands::Sample {
            file,
            phi,
            theta,
            tilt,
        } => {
            let edf = load(&file, cli.strict)?;
            let value = edf.sample_tilted(phi.to_radians(), theta.to_radians(), tilt.to_radians());
            println!("{}", value);
            Ok(())
        }
        Commands::Power {
            file,
            samples,
            grid,
            seed,
            backend,
        } => {
            let edf = load(&file, cli.strict)?;
            let backend = runner::create_backend(&backend)?;
            let seed = runner::resolve_seed(seed);
            let integrators = runner::Integrators::new(backend, samples, grid, seed);

            let (mc, quad) = runner::luminous_power(&edf, &integrators)?;
            println!("Monte Carlo ({} samples): {:.4} lm", samples, mc);
            println!(
                "{}: {:.4} lm",
                lumen_core::integrate::FluxIntegrator::method_name(&integrators.quadrature),
                quad
            );
            if let Some(declared) = edf.declared_lumens() {
                println!("Declared: {:.4} lm", declared);
            }
            Ok(())
        }
        Commands::Validate { config, output } => {
            println!("Lumen Flux Validation");
            println!("=====================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let reports = runner::run_validation(&job)?;

            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));

            if job.output.save_csv {
                runner::write_report_csv(&reports, &out_dir.join("report.csv"), &job)?;
            }
            if job.output.save_json {
                runner::write_report_json(&reports, &out_dir.join("report.json"))?;
            }

            let failed = reports.iter().filter(|r| !r.report.passed).count();
            println!(
                "Validation complete: {} passed, {} failed.",
                reports.len() - failed,
                failed
            );
            if failed > 0 {
                anyhow::bail!("{} of {} files failed validation", failed, reports.len());
            }
            Ok(())
        }
    }
}

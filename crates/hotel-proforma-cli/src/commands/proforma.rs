use clap::Args;
use serde_json::Value;

use hotel_proforma_core::assumptions::SimulationInput;
use hotel_proforma_core::audit::{render_workpaper, run_full_audit, run_full_audit_output};
use hotel_proforma_core::cross_validation::run_cross_validation_output;
use hotel_proforma_core::engine::{project, run_projection};
use hotel_proforma_core::yearly::aggregate_years;

use crate::input;

/// Arguments for the monthly projection
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Override the projection horizon in months
    #[arg(long)]
    pub horizon: Option<usize>,
}

/// Arguments for yearly aggregation
#[derive(Args)]
pub struct YearlyArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Override the projection horizon in months
    #[arg(long)]
    pub horizon: Option<usize>,
}

/// Arguments for the independent audit
#[derive(Args)]
pub struct AuditArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Override the projection horizon in months
    #[arg(long)]
    pub horizon: Option<usize>,
}

/// Arguments for the cross-calculator validation pass
#[derive(Args)]
pub struct CrosscheckArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Override the projection horizon in months
    #[arg(long)]
    pub horizon: Option<usize>,
}

/// Arguments for plain-text workpaper rendering
#[derive(Args)]
pub struct WorkpaperArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Override the projection horizon in months
    #[arg(long)]
    pub horizon: Option<usize>,
}

fn load_input(path: &Option<String>) -> Result<SimulationInput, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_input(path)
    } else if let Some(sim) = input::stdin::read_stdin()? {
        Ok(sim)
    } else {
        Err("--input <file.json|file.yaml> or piped stdin required".into())
    }
}

fn horizon(sim: &SimulationInput, flag: Option<usize>) -> Option<usize> {
    flag.or(sim.horizon_months)
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim = load_input(&args.input)?;
    let result = run_projection(&sim.property, &sim.global, horizon(&sim, args.horizon))?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_yearly(args: YearlyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim = load_input(&args.input)?;
    let mut warnings = Vec::new();
    let (_, result) = project(
        &sim.property,
        &sim.global,
        horizon(&sim, args.horizon),
        &mut warnings,
    )?;
    let years = aggregate_years(&result.months);
    Ok(serde_json::to_value(years)?)
}

pub fn run_audit(args: AuditArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim = load_input(&args.input)?;
    let mut warnings = Vec::new();
    let (cfg, result) = project(
        &sim.property,
        &sim.global,
        horizon(&sim, args.horizon),
        &mut warnings,
    )?;
    let report = run_full_audit_output(&cfg, &result.months)?;
    Ok(serde_json::to_value(report)?)
}

pub fn run_crosscheck(args: CrosscheckArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sim = load_input(&args.input)?;
    let mut warnings = Vec::new();
    let (cfg, result) = project(
        &sim.property,
        &sim.global,
        horizon(&sim, args.horizon),
        &mut warnings,
    )?;
    let report = run_cross_validation_output(&cfg, &result.months)?;
    Ok(serde_json::to_value(report)?)
}

pub fn run_workpaper(args: WorkpaperArgs) -> Result<String, Box<dyn std::error::Error>> {
    let sim = load_input(&args.input)?;
    let mut warnings = Vec::new();
    let (cfg, result) = project(
        &sim.property,
        &sim.global,
        horizon(&sim, args.horizon),
        &mut warnings,
    )?;
    let report = run_full_audit(&cfg, &result.months);
    Ok(render_workpaper(&report))
}

mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::proforma::{AuditArgs, CrosscheckArgs, ProjectArgs, WorkpaperArgs, YearlyArgs};

/// Hotel pro forma projections and independent verification
#[derive(Parser)]
#[command(
    name = "hpf",
    version,
    about = "Hotel pro forma projections and independent verification",
    long_about = "Runs 120-month hospitality pro forma projections with decimal \
                  precision: USALI-style monthly P&L, acquisition debt, straight-line \
                  depreciation, and an optional refinance overlay. Includes an \
                  independent 7-section audit with a GAAP-style opinion and an \
                  orthogonal cross-calculator validation pass."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monthly projection (two-pass, with refinance overlay)
    Project(ProjectArgs),
    /// Aggregate a projection into yearly summaries
    Yearly(YearlyArgs),
    /// Run the independent 7-section audit and derive an opinion
    Audit(AuditArgs),
    /// Run the cross-calculator invariant validation pass
    Crosscheck(CrosscheckArgs),
    /// Render the audit report as a plain-text workpaper
    Workpaper(WorkpaperArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Project(args) => commands::proforma::run_project(args),
        Commands::Yearly(args) => commands::proforma::run_yearly(args),
        Commands::Audit(args) => commands::proforma::run_audit(args),
        Commands::Crosscheck(args) => commands::proforma::run_crosscheck(args),
        Commands::Workpaper(args) => match commands::proforma::run_workpaper(args) {
            Ok(text) => {
                println!("{}", text);
                return;
            }
            Err(e) => {
                eprintln!("{}: {}", "error".red().bold(), e);
                process::exit(1);
            }
        },
        Commands::Version => {
            println!("hpf {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

//! Command-line parsing for the precipitation trend-surface tool.
//!
//! Argument parsing and command dispatch stay separate from the modeling code.
//! Most options have a `PSURF_*` environment fallback; a `.env` file in the
//! working directory is loaded before parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{FailurePolicy, Projection};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "psurf",
    version,
    about = "Polynomial trend-surface interpolation of precipitation with cross-validated degree selection"
)]
pub struct Cli {
    /// Log filter for stderr logs (e.g. `warn`, `info`, `psurf=debug`); `RUST_LOG` wins.
    #[arg(long, global = true, env = "PSURF_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Cross-validate candidate degrees and print the error curve.
    Cv(CvArgs),
    /// Cross-validate, fit the final surface, predict over a grid and mask it.
    Surface(SurfaceArgs),
    /// Plot a previously exported grid JSON.
    Plot(PlotArgs),
    /// Write the synthetic station sample as CSV.
    Sample(SampleArgs),
}

/// Where the stations come from.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Station CSV (header row required). Without it a synthetic California sample is used.
    #[arg(short = 'i', long, env = "PSURF_INPUT", value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Column holding the x coordinate (longitude for `--projection albers`).
    #[arg(long, default_value = "lon")]
    pub x_col: String,

    /// Column holding the y coordinate (latitude for `--projection albers`).
    #[arg(long, default_value = "lat")]
    pub y_col: String,

    /// Column holding the precipitation value.
    #[arg(long, default_value = "precip")]
    pub value_col: String,

    /// Coordinate handling: project lon/lat to California Albers, or use as-is.
    #[arg(long, value_enum, env = "PSURF_PROJECTION", default_value_t = Projection::Albers)]
    pub projection: Projection,

    /// Number of synthetic stations when no CSV is given.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub sample_count: usize,

    /// Seed for the synthetic stations.
    #[arg(long, default_value_t = 7)]
    pub sample_seed: u64,
}

/// Cross-validation settings.
#[derive(Debug, Args, Clone)]
pub struct SelectionArgs {
    /// Lowest candidate degree.
    #[arg(long, default_value_t = 1)]
    pub min_degree: u32,

    /// Highest candidate degree.
    #[arg(long, env = "PSURF_MAX_DEGREE", default_value_t = 5)]
    pub max_degree: u32,

    /// Number of folds.
    #[arg(short = 'k', long, env = "PSURF_FOLDS", default_value_t = 5)]
    pub folds: usize,

    /// Seed for the fold assignment.
    #[arg(long, env = "PSURF_SEED", default_value_t = 42)]
    pub seed: u64,

    /// What to do when a fold fit fails.
    #[arg(long, value_enum, default_value_t = FailurePolicy::SkipDegree)]
    pub on_failure: FailurePolicy,
}

/// Terminal plot settings.
#[derive(Debug, Args, Clone)]
pub struct PlotOptions {
    /// Render ASCII plots in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 24)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct CvArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub plot: PlotOptions,

    /// Export the degree -> RMSE curve to CSV.
    #[arg(long = "export-cv", value_name = "CSV")]
    pub export_cv: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SurfaceArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub plot: PlotOptions,

    /// Degree of the final surface (default: the minimal-RMSE degree).
    #[arg(short = 'd', long)]
    pub degree: Option<u32>,

    /// Approximate number of grid cells.
    #[arg(long, env = "PSURF_CELLS", default_value_t = 5_000)]
    pub cells: usize,

    /// Boundary JSON (`[[x, y], ...]`, same coordinates as the CSV) used to mask the grid.
    #[arg(long, value_name = "JSON")]
    pub boundary: Option<PathBuf>,

    /// Show top-N stations above and below the surface.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Export the degree -> RMSE curve to CSV.
    #[arg(long = "export-cv", value_name = "CSV")]
    pub export_cv: Option<PathBuf>,

    /// Export the masked prediction grid to JSON.
    #[arg(long = "export-grid", value_name = "JSON")]
    pub export_grid: Option<PathBuf>,
}

/// Options for plotting a saved grid.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Grid JSON file produced by `psurf surface --export-grid`.
    #[arg(long, value_name = "JSON")]
    pub grid: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 24)]
    pub height: usize,
}

#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Output CSV (default: stdout).
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Number of stations.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub count: usize,

    /// Seed for the synthetic stations.
    #[arg(long, default_value_t = 7)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn surface_defaults() {
        let cli = Cli::parse_from(["psurf", "surface", "--no-plot", "-d", "3"]);
        let Command::Surface(args) = cli.command else {
            panic!("expected surface");
        };
        assert_eq!(args.degree, Some(3));
        assert!(args.plot.no_plot);
        assert_eq!(args.input.x_col, "lon");
        assert_eq!(args.selection.on_failure, FailurePolicy::SkipDegree);
    }

    #[test]
    fn cv_flags_parse() {
        let cli = Cli::parse_from([
            "psurf",
            "cv",
            "--projection",
            "identity",
            "--on-failure",
            "skip-fold",
            "--max-degree",
            "3",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.log_level, "debug");
        let Command::Cv(args) = cli.command else {
            panic!("expected cv");
        };
        assert_eq!(args.input.projection, Projection::Identity);
        assert_eq!(args.selection.on_failure, FailurePolicy::SkipFold);
        assert_eq!(args.selection.max_degree, 3);
    }
}

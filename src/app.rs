//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - runs cross-validation / the surface pipeline
//! - prints reports/plots
//! - writes optional exports

use std::fs::File;
use std::io::Write;

use clap::Parser;

use crate::cli::{Cli, Command, CvArgs, InputArgs, PlotArgs, SampleArgs, SelectionArgs, SurfaceArgs};
use crate::domain::{GridFile, RunConfig};
use crate::error::AppError;
use crate::io::ingest::ColumnNames;

pub mod pipeline;

/// Rows listed when a CSV had bad lines.
const MAX_ROW_ERRORS_SHOWN: usize = 10;

/// Entry point for the `psurf` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `psurf` on its own runs the surface pipeline on the synthetic sample.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);
    crate::logging::init_tracing(&cli.log_level);

    match cli.command {
        Command::Cv(args) => handle_cv(&args),
        Command::Surface(args) => handle_surface(&args),
        Command::Plot(args) => handle_plot(&args),
        Command::Sample(args) => handle_sample(&args),
    }
}

fn handle_cv(args: &CvArgs) -> Result<(), AppError> {
    let config = cv_config_from_args(args);
    let data = pipeline::load_data(&config)?;
    print_row_errors(&data);

    let cv = pipeline::run_selection(&config, &data)?;
    println!("{}", crate::report::format_cv_summary(&data.stats, &cv, &config));

    if config.plot {
        println!(
            "{}",
            crate::plot::render_cv_curve(&cv, config.plot_width, config.plot_height)
        );
    }

    if let Some(path) = &config.export_cv {
        crate::io::export::write_cv_csv(path, &cv)?;
    }

    Ok(())
}

fn handle_surface(args: &SurfaceArgs) -> Result<(), AppError> {
    let config = surface_config_from_args(args);
    let run = pipeline::run_surface(&config)?;
    print_row_errors(&run.data);

    println!(
        "{}",
        crate::report::format_cv_summary(&run.data.stats, &run.cv, &config)
    );
    println!(
        "{}",
        crate::report::format_surface_summary(&run.model, &run.grid, &run.residuals)
    );
    if config.top_n > 0 {
        println!("{}", crate::report::format_rankings(&run.rankings));
    }

    if config.plot {
        println!(
            "{}",
            crate::plot::render_cv_curve(&run.cv, config.plot_width, config.plot_height)
        );
        println!(
            "{}",
            crate::plot::render_surface(&run.grid, config.plot_width, config.plot_height)
        );
    }

    if let Some(path) = &config.export_cv {
        crate::io::export::write_cv_csv(path, &run.cv)?;
    }
    if let Some(path) = &config.export_grid {
        let file = GridFile::new(&run.grid, run.model.spec(), config.projection);
        crate::io::export::write_grid_json(path, &file)?;
    }

    Ok(())
}

fn handle_plot(args: &PlotArgs) -> Result<(), AppError> {
    let file = crate::io::export::read_grid_json(&args.grid)?;
    let grid = file.to_grid()?;

    println!(
        "Grid: {} ({:?}) generated {}",
        file.model.display_name(),
        file.projection,
        file.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("{}", crate::plot::render_surface(&grid, args.width, args.height));
    Ok(())
}

fn handle_sample(args: &SampleArgs) -> Result<(), AppError> {
    let sample = crate::data::generate_sample(args.count, args.seed)?;
    let columns = ColumnNames::default();

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display())))?;
            crate::io::export::write_observations_csv(file, &sample.observations, &columns)
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            crate::io::export::write_observations_csv(&mut lock, &sample.observations, &columns)?;
            lock.flush()
                .map_err(|e| AppError::new(2, format!("Failed to write sample CSV: {e}")))
        }
    }
}

fn print_row_errors(data: &pipeline::LoadedData) {
    if !data.row_errors.is_empty() {
        eprint!(
            "{}",
            crate::report::format_row_errors(&data.row_errors, MAX_ROW_ERRORS_SHOWN)
        );
    }
}

pub fn cv_config_from_args(args: &CvArgs) -> RunConfig {
    let mut config = base_config(&args.input, &args.selection);
    config.plot = args.plot.plot && !args.plot.no_plot;
    config.plot_width = args.plot.width;
    config.plot_height = args.plot.height;
    config.export_cv = args.export_cv.clone();
    config
}

pub fn surface_config_from_args(args: &SurfaceArgs) -> RunConfig {
    let mut config = base_config(&args.input, &args.selection);
    config.degree = args.degree;
    config.target_cells = args.cells;
    config.boundary = args.boundary.clone();
    config.top_n = args.top;
    config.plot = args.plot.plot && !args.plot.no_plot;
    config.plot_width = args.plot.width;
    config.plot_height = args.plot.height;
    config.export_cv = args.export_cv.clone();
    config.export_grid = args.export_grid.clone();
    config
}

fn base_config(input: &InputArgs, selection: &SelectionArgs) -> RunConfig {
    RunConfig {
        input: input.input.clone(),
        x_col: input.x_col.clone(),
        y_col: input.y_col.clone(),
        value_col: input.value_col.clone(),
        projection: input.projection,
        sample_count: input.sample_count,
        sample_seed: input.sample_seed,

        min_degree: selection.min_degree,
        max_degree: selection.max_degree,
        folds: selection.folds,
        seed: selection.seed,
        failure_policy: selection.on_failure,

        degree: None,
        target_cells: 0,
        boundary: None,
        top_n: 0,

        plot: false,
        plot_width: 0,
        plot_height: 0,

        export_cv: None,
        export_grid: None,
    }
}

/// Rewrite argv so a bare `psurf` defaults to `psurf surface`.
///
/// Rules:
/// - `psurf`                          -> `psurf surface`
/// - `psurf -d 3 ...`                 -> `psurf surface -d 3 ...`
/// - `psurf --help/--version/-h`      -> unchanged
/// - anything naming a subcommand     -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("surface".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let names_subcommand = argv
        .iter()
        .skip(1)
        .any(|a| matches!(a.as_str(), "cv" | "surface" | "plot" | "sample"));
    if names_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "surface flags".
    if arg1.starts_with('-') {
        argv.insert(1, "surface".to_string());
    }
    argv
}

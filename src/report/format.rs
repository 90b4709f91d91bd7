//! Formatted terminal output.
//!
//! Formatting lives in one place so output changes stay localized and the
//! numeric code never prints.

use crate::domain::{DatasetStats, PredictionGrid, RunConfig};
use crate::fit::selection::CvResult;
use crate::io::ingest::RowError;
use crate::models::FittedModel;
use crate::report::{Rankings, StationResidual};

/// Dataset stats + the cross-validated error curve.
pub fn format_cv_summary(stats: &DatasetStats, cv: &CvResult, config: &RunConfig) -> String {
    let mut out = String::new();

    out.push_str("=== psurf - Precipitation Trend Surface ===\n");
    out.push_str(&format!(
        "Source: {} | projection: {:?}\n",
        config
            .input
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("synthetic (n={}, seed={})", config.sample_count, config.sample_seed)),
        config.projection,
    ));
    out.push_str(&format!(
        "Points: n={} | x=[{:.1}, {:.1}] | y=[{:.1}, {:.1}] | value=[{:.2}, {:.2}] mean={:.2}\n",
        stats.n_points,
        stats.extent.min_x,
        stats.extent.max_x,
        stats.extent.min_y,
        stats.extent.max_y,
        stats.value_min,
        stats.value_max,
        stats.value_mean,
    ));
    out.push_str(&format!(
        "Cross-validation: k={} seed={} policy={:?}\n",
        cv.k, cv.seed, config.failure_policy
    ));

    out.push_str("\nDegree diagnostics:\n");
    out.push_str(&format_cv_table(cv));
    out.push_str(&format!("  null model (mean) RMSE={:.4}\n", cv.null_rmse));
    for err in &cv.failures {
        out.push_str(&format!("  (skipped) {err}\n"));
    }

    match cv.best_degree() {
        Some(d) => out.push_str(&format!("\nMinimal CV RMSE: degree {d}\n")),
        None => out.push_str("\nNo degree could be scored.\n"),
    }

    out
}

fn format_cv_table(cv: &CvResult) -> String {
    let best = cv.best_degree();
    let mut out = String::new();
    out.push_str(&format!(
        "  {:>6} {:>6} {:>14} {:>6} {:>8}\n",
        "degree", "params", "mean_rmse", "folds", "ignored"
    ));
    for s in cv.scores.values() {
        let mark = if Some(s.degree) == best { "*" } else { " " };
        out.push_str(&format!(
            "{mark} {:>6} {:>6} {:>14.4} {:>6} {:>8}\n",
            s.degree,
            s.param_count,
            s.mean_rmse,
            s.folds.len(),
            s.ignored_pairs(),
        ));
    }
    out
}

/// Final model + grid summary.
pub fn format_surface_summary(model: &FittedModel, grid: &PredictionGrid, residuals: &[StationResidual]) -> String {
    let mut out = String::new();
    let spec = model.spec();
    let g = &grid.geometry;

    out.push_str("Surface:\n");
    out.push_str(&format!(
        "- model: {} (degree {}, {} params, n={})\n",
        spec.display_name(),
        spec.degree(),
        spec.param_count(),
        model.training_size()
    ));
    out.push_str(&format!("- coefficients: {}\n", fmt_vec(model.coefficients())));
    out.push_str(&format!(
        "- in-sample RMSE: {:.4}\n",
        crate::report::residual_rmse(residuals)
    ));
    let e = g.extent();
    out.push_str(&format!(
        "- grid: {} cols x {} rows, cell {:.1} x {:.1} | x=[{:.1}, {:.1}] y=[{:.1}, {:.1}]\n",
        g.cols, g.rows, g.cell_width, g.cell_height, e.min_x, e.max_x, e.min_y, e.max_y
    ));
    match grid.value_range() {
        Some((lo, hi)) => out.push_str(&format!(
            "- populated cells: {}/{} | value=[{lo:.2}, {hi:.2}]\n",
            grid.populated_cells(),
            g.cell_count()
        )),
        None => out.push_str(&format!("- populated cells: 0/{}\n", g.cell_count())),
    }

    out
}

/// Format the wetter/drier-than-trend tables.
pub fn format_rankings(rankings: &Rankings) -> String {
    let mut out = String::new();

    out.push_str("Wetter than trend (positive residual):\n");
    out.push_str(&format_table(&rankings.wetter));
    out.push('\n');

    out.push_str("Drier than trend (negative residual):\n");
    out.push_str(&format_table(&rankings.drier));

    out
}

fn format_table(rows: &[StationResidual]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>14} {:>14} {:>10} {:>10} {:>10}\n",
        "x", "y", "observed", "fitted", "residual"
    ));
    out.push_str(&format!(
        "{:-<14} {:-<14} {:-<10} {:-<10} {:-<10}\n",
        "", "", "", "", ""
    ));
    for r in rows {
        out.push_str(&format!(
            "{:>14.2} {:>14.2} {:>10.2} {:>10.2} {:>10.2}\n",
            r.observation.coord.x, r.observation.coord.y, r.observation.value, r.fitted, r.residual
        ));
    }
    out
}

/// List skipped CSV rows (at most `max_shown`).
pub fn format_row_errors(errors: &[RowError], max_shown: usize) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let mut out = format!("Skipped {} row(s):\n", errors.len());
    for e in errors.iter().take(max_shown) {
        match &e.id {
            Some(id) => out.push_str(&format!("  line {} ({id}): {}\n", e.line, e.message)),
            None => out.push_str(&format!("  line {}: {}\n", e.line, e.message)),
        }
    }
    if errors.len() > max_shown {
        out.push_str(&format!("  ... and {} more\n", errors.len() - max_shown));
    }
    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.4}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::domain::Observation;
    use crate::error::{FitFailure, ModelError};
    use crate::fit::selection::{DegreeScore, FoldScore};

    fn score(degree: u32, params: usize, rmse: f64, ignored: usize) -> DegreeScore {
        DegreeScore {
            degree,
            param_count: params,
            mean_rmse: rmse,
            folds: vec![FoldScore {
                fold: 1,
                n_test: 4,
                rmse,
                ignored,
            }],
        }
    }

    #[test]
    fn cv_table_marks_best_degree() {
        let mut scores = BTreeMap::new();
        scores.insert(1, score(1, 3, 2.5, 0));
        scores.insert(2, score(2, 6, 1.25, 1));
        let cv = CvResult {
            k: 5,
            seed: 42,
            n_observations: 20,
            null_rmse: 3.0,
            scores,
            failures: vec![],
        };

        let table = format_cv_table(&cv);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("       1      3"), "{table}");
        assert!(lines[2].starts_with("*      2      6         1.2500      1        1"), "{table}");
    }

    #[test]
    fn row_errors_are_truncated() {
        let errors: Vec<RowError> = (0..4)
            .map(|i| RowError {
                line: i + 2,
                id: if i == 0 { Some("s1".to_string()) } else { None },
                message: "bad".to_string(),
            })
            .collect();
        let txt = format_row_errors(&errors, 2);
        assert_eq!(
            txt,
            "Skipped 4 row(s):\n  line 2 (s1): bad\n  line 3: bad\n  ... and 2 more\n"
        );
        assert_eq!(format_row_errors(&[], 5), "");
    }

    #[test]
    fn rankings_table_lists_rows() {
        let rankings = Rankings {
            wetter: vec![StationResidual {
                observation: Observation::new(1.0, 2.0, 30.0),
                fitted: 20.0,
                residual: 10.0,
            }],
            drier: vec![],
        };
        let txt = format_rankings(&rankings);
        assert!(txt.contains("30.00      20.00      10.00"), "{txt}");
        assert!(txt.contains("Drier than trend"));
    }

    #[test]
    fn failures_are_listed_as_skipped() {
        let cv = CvResult {
            k: 5,
            seed: 1,
            n_observations: 10,
            null_rmse: 1.0,
            scores: BTreeMap::new(),
            failures: vec![ModelError::Fit {
                degree: 5,
                fold: Some(2),
                reason: FitFailure::InsufficientData {
                    observations: 8,
                    parameters: 12,
                },
            }],
        };
        let stats = DatasetStats::compute(&[Observation::new(0.0, 0.0, 1.0)]).unwrap();
        let config = test_config();
        let txt = format_cv_summary(&stats, &cv, &config);
        assert!(txt.contains("(skipped) fit failed for degree 5 (fold 2)"), "{txt}");
        assert!(txt.contains("No degree could be scored."));
    }

    #[test]
    fn surface_summary_reports_lattice_bounds() {
        let obs: Vec<Observation> = (0..12)
            .map(|i| {
                let x = (i % 4) as f64 * 3.0;
                let y = (i / 4) as f64 * 2.0;
                Observation::new(x, y, 10.0 + x - y)
            })
            .collect();
        let model = crate::models::fit_model(1, &obs).unwrap();
        let grid = crate::surface::build_grid(crate::domain::Extent::new(0.0, 0.0, 10.0, 5.0), 50).unwrap();
        let grid = crate::surface::predict_over_grid(&model, grid);
        let residuals = crate::report::compute_residuals(&obs, &model).unwrap();

        let txt = format_surface_summary(&model, &grid, &residuals);
        assert!(
            txt.contains("- grid: 10 cols x 5 rows, cell 1.0 x 1.0 | x=[0.0, 10.0] y=[0.0, 5.0]"),
            "{txt}"
        );
        assert!(txt.contains("- populated cells: 50/50"), "{txt}");
        assert!(txt.contains("- in-sample RMSE: 0.0000"), "{txt}");
    }

    fn test_config() -> RunConfig {
        RunConfig {
            input: None,
            x_col: "lon".to_string(),
            y_col: "lat".to_string(),
            value_col: "precip".to_string(),
            projection: crate::domain::Projection::Identity,
            sample_count: 10,
            sample_seed: 1,
            min_degree: 1,
            max_degree: 5,
            folds: 5,
            seed: 1,
            failure_policy: crate::domain::FailurePolicy::SkipDegree,
            degree: None,
            target_cells: 100,
            boundary: None,
            top_n: 3,
            plot: false,
            plot_width: 60,
            plot_height: 20,
            export_cv: None,
            export_grid: None,
        }
    }
}

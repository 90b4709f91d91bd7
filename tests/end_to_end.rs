//! End-to-end scenarios across the public API.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use precip_surface::app::pipeline::{load_data, run_selection, run_surface};
use precip_surface::data::generate_sample;
use precip_surface::domain::{Extent, FailurePolicy, GridFile, Observation, Projection, RunConfig};
use precip_surface::fit::{assign_folds, cross_validate, select_degree};
use precip_surface::io::{ColumnNames, read_grid_json, write_cv_csv, write_grid_json, write_observations_csv};
use precip_surface::plot::render_surface;
use precip_surface::surface::{build_grid, fit_final, predict_over_grid};

fn scattered(n: usize, seed: u64, f: impl Fn(f64, f64) -> f64) -> Vec<Observation> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x: f64 = rng.gen_range(0.0..100.0);
            let y: f64 = rng.gen_range(0.0..100.0);
            Observation::new(x, y, f(x, y))
        })
        .collect()
}

fn config() -> RunConfig {
    RunConfig {
        input: None,
        x_col: "lon".to_string(),
        y_col: "lat".to_string(),
        value_col: "precip".to_string(),
        projection: Projection::Albers,
        sample_count: 120,
        sample_seed: 11,
        min_degree: 1,
        max_degree: 3,
        folds: 5,
        seed: 42,
        failure_policy: FailurePolicy::SkipDegree,
        degree: None,
        target_cells: 600,
        boundary: None,
        top_n: 3,
        plot: false,
        plot_width: 40,
        plot_height: 12,
        export_cv: None,
        export_grid: None,
    }
}

#[test]
fn plane_is_recovered_by_every_degree() {
    let obs = scattered(20, 3, |x, y| 2.0 * x + 3.0 * y);
    let cv = select_degree(&obs, &[1, 2, 3, 4, 5], 5, 42).unwrap();

    assert!(cv.failures.is_empty(), "{:?}", cv.failures);
    assert_eq!(cv.scores.len(), 5);
    for (degree, rmse) in cv.curve() {
        assert!(rmse < 1e-6, "degree {degree}: rmse={rmse}");
    }
}

#[test]
fn constant_response_has_zero_error_everywhere() {
    let obs = scattered(20, 5, |_, _| 100.0);
    let cv = select_degree(&obs, &[1, 2, 3, 4, 5], 5, 7).unwrap();

    assert_eq!(cv.null_rmse, 0.0);
    assert_eq!(cv.scores.len(), 5);
    for (degree, rmse) in cv.curve() {
        assert!(rmse < 1e-6, "degree {degree}: rmse={rmse}");
    }
}

#[test]
fn select_degree_matches_per_degree_cross_validation() {
    let obs = scattered(40, 9, |x, y| 0.01 * x * x - 0.5 * y + 20.0);
    let cv = select_degree(&obs, &[1, 2, 3], 5, 123).unwrap();
    let folds = assign_folds(obs.len(), 5, 123).unwrap();

    for degree in [1, 2, 3] {
        let direct = cross_validate(&obs, degree, &folds).unwrap();
        let from_curve = cv.rmse(degree).unwrap();
        assert!((direct - from_curve).abs() < 1e-12, "degree {degree}");
    }
    // The quadratic trend needs degree >= 2.
    assert!(cv.rmse(2).unwrap() < cv.rmse(1).unwrap());
}

#[test]
fn final_surface_over_grid_matches_plane() {
    let obs = scattered(30, 21, |x, y| 5.0 - x + 0.5 * y);
    let model = fit_final(&obs, 2).unwrap();
    let grid = build_grid(Extent::new(0.0, 0.0, 100.0, 50.0), 200).unwrap();
    let grid = predict_over_grid(&model, grid);

    assert_eq!(grid.populated_cells(), grid.geometry.cell_count());
    for (c, v) in grid.centers().zip(&grid.values) {
        assert!((v - (5.0 - c.x + 0.5 * c.y)).abs() < 1e-8);
    }
}

#[test]
fn synthetic_surface_prefers_a_trend_over_the_mean() {
    let out = run_surface(&config()).unwrap();

    let best = out.cv.best_degree().unwrap();
    assert!(out.cv.rmse(best).unwrap() < out.cv.null_rmse);
    assert!(out.grid.populated_cells() > 0);
    assert!(out.grid.populated_cells() < out.grid.geometry.cell_count());
}

#[test]
fn csv_station_file_round_trip_through_exports() {
    let dir = tempfile::tempdir().unwrap();
    let stations = dir.path().join("stations.csv");
    let cv_path = dir.path().join("cv.csv");
    let grid_path = dir.path().join("grid.json");

    let sample = generate_sample(120, 11).unwrap();
    let file = std::fs::File::create(&stations).unwrap();
    write_observations_csv(file, &sample.observations, &ColumnNames::default()).unwrap();

    let mut cfg = config();
    cfg.input = Some(stations);
    let data = load_data(&cfg).unwrap();
    assert_eq!(data.observations.len(), 120);
    assert!(data.boundary.is_none());
    assert!(data.row_errors.is_empty());

    let cv = run_selection(&cfg, &data).unwrap();
    write_cv_csv(&cv_path, &cv).unwrap();
    let text = std::fs::read_to_string(&cv_path).unwrap();
    assert_eq!(text.lines().count(), 1 + cv.scores.len());

    let out = run_surface(&cfg).unwrap();
    write_grid_json(&grid_path, &GridFile::new(&out.grid, out.model.spec(), cfg.projection)).unwrap();
    let back = read_grid_json(&grid_path).unwrap();
    assert_eq!(back.geometry, out.grid.geometry);
    assert_eq!(back.model, out.model.spec());

    let plot = render_surface(&back.to_grid().unwrap(), 30, 10);
    assert_eq!(plot.lines().count(), 11);
}

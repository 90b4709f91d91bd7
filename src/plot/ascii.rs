//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size character grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Two plots:
//! - the cross-validation curve: `-` line, `o` per degree, `*` for the
//!   minimal-RMSE degree, `.` for the null-model baseline when it is in range
//! - the surface raster: one character per (resampled) cell on a light-to-dark
//!   ramp, blank for masked cells

use crate::domain::PredictionGrid;
use crate::fit::selection::CvResult;

/// Low-to-high character ramp for the surface raster.
const RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Render the degree -> mean RMSE curve.
pub fn render_cv_curve(cv: &CvResult, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let curve: Vec<(f64, f64)> = cv
        .curve()
        .into_iter()
        .map(|(d, rmse)| (d as f64, rmse))
        .collect();
    if curve.is_empty() {
        return "Plot: no scored degrees\n".to_string();
    }

    let (d_min, d_max) = x_range(&curve);
    let (r_min, r_max) = y_range(&curve).unwrap_or((0.0, 1.0));
    let (r_min, r_max) = pad_range(r_min, r_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the curve first (so points can overlay).
    draw_curve(&mut grid, &curve, d_min, d_max, r_min, r_max);

    if cv.null_rmse >= r_min && cv.null_rmse <= r_max {
        let row = map_y(cv.null_rmse, r_min, r_max, height);
        for cell in grid[row].iter_mut().filter(|c| **c == ' ') {
            *cell = '.';
        }
    }

    let best = cv.best_degree();
    for &(d, rmse) in &curve {
        let x = map_x(d, d_min, d_max, width);
        let y = map_y(rmse, r_min, r_max, height);
        grid[y][x] = if best == Some(d as u32) { '*' } else { 'o' };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: degree=[{d_min:.0}, {d_max:.0}] | rmse=[{r_min:.4}, {r_max:.4}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Render a prediction grid as a character raster (north up).
///
/// The grid is resampled by nearest cell to `width` x `height` characters.
pub fn render_surface(grid: &PredictionGrid, width: usize, height: usize) -> String {
    let width = width.max(2);
    let height = height.max(2);
    let cols = grid.geometry.cols;
    let rows = grid.geometry.rows;

    let Some((lo, hi)) = grid.value_range() else {
        return "Surface: no populated cells\n".to_string();
    };

    let mut out = String::new();
    out.push_str(&format!(
        "Surface: value=[{lo:.2}, {hi:.2}] | '{}' low .. '{}' high\n",
        RAMP[0],
        RAMP[RAMP.len() - 1]
    ));

    for r in 0..height {
        let row = r * rows / height;
        let line: String = (0..width)
            .map(|c| ramp_char(grid.value(row, c * cols / width), lo, hi))
            .collect();
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn ramp_char(v: f64, lo: f64, hi: f64) -> char {
    if !v.is_finite() {
        return ' ';
    }
    let span = hi - lo;
    if span <= 0.0 {
        return RAMP[0];
    }
    let u = ((v - lo) / span).clamp(0.0, 1.0);
    RAMP[(u * (RAMP.len() as f64 - 1.0)).round() as usize]
}

fn x_range(curve: &[(f64, f64)]) -> (f64, f64) {
    let min = curve.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max = curve.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    if max > min { (min, max) } else { (min - 0.5, max + 0.5) }
}

fn y_range(curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in curve {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, x_min, x_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::domain::GridGeometry;
    use crate::fit::selection::DegreeScore;

    fn cv(points: &[(u32, f64)], null_rmse: f64) -> CvResult {
        let scores: BTreeMap<u32, DegreeScore> = points
            .iter()
            .map(|&(degree, mean_rmse)| {
                (
                    degree,
                    DegreeScore {
                        degree,
                        param_count: 0,
                        mean_rmse,
                        folds: vec![],
                    },
                )
            })
            .collect();
        CvResult {
            k: 5,
            seed: 0,
            n_observations: 20,
            null_rmse,
            scores,
            failures: vec![],
        }
    }

    #[test]
    fn cv_curve_golden_snapshot_small() {
        let txt = render_cv_curve(&cv(&[(1, 2.0), (2, 1.0)], 10.0), 10, 5);
        let expected = concat!(
            "Plot: degree=[1, 2] | rmse=[0.9500, 2.0500]\n",
            "o-        \n",
            "  --      \n",
            "    --    \n",
            "      --  \n",
            "        -*\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn cv_curve_draws_null_baseline_when_in_range() {
        let txt = render_cv_curve(&cv(&[(1, 1.0), (2, 3.0), (3, 2.0)], 2.0), 12, 5);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(rows.len(), 5);
        assert!(rows[2].contains('.'), "{txt}");
        assert!(rows[4].starts_with('*'), "{txt}");
    }

    #[test]
    fn cv_curve_without_scores() {
        assert_eq!(render_cv_curve(&cv(&[], 1.0), 10, 5), "Plot: no scored degrees\n");
    }

    #[test]
    fn surface_golden_snapshot_small() {
        let grid = PredictionGrid {
            geometry: GridGeometry {
                min_x: 0.0,
                max_y: 2.0,
                cell_width: 1.0,
                cell_height: 1.0,
                cols: 2,
                rows: 2,
            },
            values: vec![0.0, f64::NAN, 5.0, 10.0],
        };
        let txt = render_surface(&grid, 4, 2);
        let expected = concat!(
            "Surface: value=[0.00, 10.00] | '.' low .. '@' high\n",
            "..  \n",
            "++@@\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn fully_masked_surface() {
        let grid = PredictionGrid {
            geometry: GridGeometry {
                min_x: 0.0,
                max_y: 1.0,
                cell_width: 1.0,
                cell_height: 1.0,
                cols: 1,
                rows: 1,
            },
            values: vec![f64::NAN],
        };
        assert_eq!(render_surface(&grid, 10, 5), "Surface: no populated cells\n");
    }
}

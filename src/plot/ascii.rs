//! ASCII plotting of signed approximation errors for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - error profile `approx(x) - Φ⁻¹(x)` on a dense grid: `-` line
//! - training samples (optional): `o`
//! - zero error (when inside the range): `.`
//!
//! The horizontal axis is `x` for the central region and `log10(x)` for the tail.

use crate::domain::{FitResult, Region, X_HIGH, X_LOW};
use crate::error::FitError;
use crate::fit::SampleError;
use crate::fit::grid::{linspace, log_space};
use crate::math::standard_normal_quantile;

/// Smallest probability shown on tail plots.
const TAIL_PLOT_MIN: f64 = 1e-16;

/// Signed error `(coordinate, approx - exact)` on `n` grid points across the region.
pub fn error_profile(fit: &FitResult, n: usize) -> Result<Vec<(f64, f64)>, FitError> {
    let n = n.max(2);
    let xs = match fit.region {
        Region::Central => linspace(X_LOW, X_HIGH, n)?,
        Region::Tail => log_space(TAIL_PLOT_MIN, X_LOW, n)?,
    };
    xs.into_iter()
        .map(|x| {
            let exact = standard_normal_quantile(x)?;
            let approx = fit.approximation.quantile(fit.region, x);
            if !approx.is_finite() {
                return Err(FitError::NonFinite {
                    region: fit.region,
                    probability: x,
                });
            }
            Ok((axis_coord(fit.region, x), approx - exact))
        })
        .collect()
}

/// Render the error profile of `fit`, optionally overlaying training samples.
pub fn render_error_plot(
    fit: &FitResult,
    samples: Option<&[SampleError]>,
    width: usize,
    height: usize,
) -> Result<String, FitError> {
    let curve = error_profile(fit, width.max(2) * 2)?;
    let points: Vec<(f64, f64)> = samples
        .unwrap_or_default()
        .iter()
        .map(|s| (axis_coord(fit.region, s.x), s.z_fit - s.z_exact))
        .collect();
    let (x_min, x_max) = axis_range(fit.region);
    Ok(render_plot(fit.region, &points, &curve, x_min, x_max, width, height))
}

fn axis_coord(region: Region, x: f64) -> f64 {
    match region {
        Region::Central => x,
        Region::Tail => x.log10(),
    }
}

fn axis_range(region: Region) -> (f64, f64) {
    match region {
        Region::Central => (X_LOW, X_HIGH),
        Region::Tail => (TAIL_PLOT_MIN.log10(), X_LOW.log10()),
    }
}

fn axis_label(region: Region) -> &'static str {
    match region {
        Region::Central => "x",
        Region::Tail => "log10(x)",
    }
}

fn render_plot(
    region: Region,
    points: &[(f64, f64)],
    curve: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(points, curve).unwrap_or((-1.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    if y_min < 0.0 && y_max > 0.0 {
        let row = map_y(0.0, y_min, y_max, height);
        grid[row].fill('.');
    }

    // Draw curve first (so points can overlay).
    draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max);

    for &(x, y) in points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {region} signed error (approx - exact) | {}=[{x_min:.3}, {x_max:.3}] | error=[{y_min:.3e}, {y_max:.3e}]\n",
        axis_label(region)
    ));

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out
}

fn y_range(points: &[(f64, f64)], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(_, y) in points.iter().chain(curve) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-300);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish). Only blank or zero-axis cells are overwritten.
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
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if *cell == ' ' || *cell == '.' {
                *cell = ch;
            }
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
    use crate::domain::RegionConfig;
    use crate::fit::fit_tail;

    #[test]
    fn plot_golden_snapshot_small() {
        let points = [(1.0, 100.0), (10.0, 110.0)];
        let curve: Vec<(f64, f64)> = (0..10).map(|i| (1.0 + i as f64, 100.0)).collect();

        let txt = render_plot(Region::Central, &points, &curve, 1.0, 10.0, 10, 5);
        let expected = concat!(
            "Plot: central signed error (approx - exact) | x=[1.000, 10.000] | error=[9.950e1, 1.105e2]\n",
            "         o\n",
            "\n",
            "\n",
            "\n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn zero_axis_is_drawn_inside_the_range() {
        let curve = [(0.0, -1.0), (1.0, 1.0)];
        let txt = render_plot(Region::Central, &[], &curve, 0.0, 1.0, 10, 5);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(rows.len(), 5);
        assert!(rows[2].contains('.'));
        assert!(rows[2].contains('-'));
    }

    #[test]
    fn profile_of_an_accurate_tail_fit_is_small() {
        let fit = fit_tail(&RegionConfig::tail()).unwrap();
        let profile = error_profile(&fit, 200).unwrap();
        assert_eq!(profile.len(), 200);
        assert!((profile[0].0 + 16.0).abs() < 1e-12);
        assert!(profile.iter().all(|&(_, e)| e.abs() < 1e-7));

        let txt = render_error_plot(&fit, None, 40, 10).unwrap();
        assert!(txt.starts_with("Plot: tail signed error (approx - exact) | log10(x)=[-16.000, -1.615]"));
        assert_eq!(txt.lines().count(), 11);
    }
}

//! Weighted, ridge-regularized least squares.
//!
//! Every region fit reduces to one problem of the form:
//!
//! ```text
//! minimize ‖W (A θ − b)‖² + λ ‖θ‖²
//! ```
//!
//! where `W = diag(w_i)` multiplies row `i` of both `A` and `b` by `w_i` directly (the
//! weight is not square-rooted).
//!
//! Two direct solves are available:
//! - `SolveMethod::Qr` (default): Householder QR of `[WA; √λ·I] θ ≈ [Wb; 0]`. The
//!   condition number is not squared, which matters for the monomial bases used here (the
//!   tail basis spans `t⁰ … t⁸` with `t` up to ~8.6).
//! - `SolveMethod::Normal`: form `(WA)ᵗ(WA) + λI` and `(WA)ᵗ(Wb)` and solve by LU with
//!   partial pivoting. Same minimizer, but the default 8/8 tail system is singular to
//!   working precision in this form and is rejected.
//!
//! Both paths apply the same pivot-ratio cut-off: `min|dᵢ| ≤ ε·cols·max|dᵢ|` over the
//! triangular factor's diagonal fails the solve.

use nalgebra::{DMatrix, DVector};

use crate::domain::SolveMethod;
use crate::error::SolveError;

/// Solve the weighted ridge problem for `θ`.
///
/// Fails instead of returning a solution when the system is not invertible to working
/// precision or the result is not finite.
pub fn solve_weighted_ridge(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    weights: &[f64],
    ridge: f64,
    method: SolveMethod,
) -> Result<DVector<f64>, SolveError> {
    let rows = a.nrows();
    if b.len() != rows || weights.len() != rows {
        return Err(SolveError::DimensionMismatch {
            rows,
            rhs: b.len(),
            weights: weights.len(),
        });
    }

    let mut aw = a.clone();
    let mut bw = b.clone();
    for (i, &w) in weights.iter().enumerate() {
        aw.row_mut(i).scale_mut(w);
        bw[i] *= w;
    }

    let theta = match method {
        SolveMethod::Normal => solve_normal_equations(&aw, &bw, ridge)?,
        SolveMethod::Qr => solve_augmented_qr(&aw, &bw, ridge)?,
    };

    if theta.iter().all(|v| v.is_finite()) {
        Ok(theta)
    } else {
        Err(SolveError::NonFinite)
    }
}

fn solve_normal_equations(aw: &DMatrix<f64>, bw: &DVector<f64>, ridge: f64) -> Result<DVector<f64>, SolveError> {
    let mut ata = aw.tr_mul(aw);
    for j in 0..ata.ncols() {
        ata[(j, j)] += ridge;
    }
    let atb = aw.tr_mul(bw);

    let n = ata.ncols();
    let lu = ata.lu();
    if pivot_ratio(&lu.u().diagonal()) <= pivot_cutoff(n) {
        return Err(SolveError::Singular);
    }
    lu.solve(&atb).ok_or(SolveError::Singular)
}

fn solve_augmented_qr(aw: &DMatrix<f64>, bw: &DVector<f64>, ridge: f64) -> Result<DVector<f64>, SolveError> {
    let (rows, cols) = aw.shape();

    let mut aug = DMatrix::<f64>::zeros(rows + cols, cols);
    aug.view_mut((0, 0), (rows, cols)).copy_from(aw);
    let sqrt_ridge = ridge.sqrt();
    for j in 0..cols {
        aug[(rows + j, j)] = sqrt_ridge;
    }

    let mut rhs = DVector::<f64>::zeros(rows + cols);
    rhs.rows_mut(0, rows).copy_from(bw);

    let qr = aug.qr();
    qr.q_tr_mul(&mut rhs);
    let r = qr.r();

    let ratio = pivot_ratio(&r.diagonal());
    if ratio <= pivot_cutoff(cols) {
        return Err(SolveError::RankDeficient { ratio });
    }

    let qtb = rhs.rows(0, cols).into_owned();
    r.solve_upper_triangular(&qtb).ok_or(SolveError::Singular)
}

/// `min|dᵢ| / max|dᵢ|` over a triangular factor's diagonal, 0 when every pivot vanishes.
fn pivot_ratio(diag: &DVector<f64>) -> f64 {
    let (min_diag, max_diag) = diag
        .iter()
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), v| (lo.min(v.abs()), hi.max(v.abs())));
    if max_diag > 0.0 { min_diag / max_diag } else { 0.0 }
}

/// A pivot this small relative to the largest one carries no information at double precision.
fn pivot_cutoff(cols: usize) -> f64 {
    f64::EPSILON * cols as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn line_system() -> (DMatrix<f64>, DVector<f64>) {
        // y = 2 + 3x on x = [0, 1, 2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);
        (x, y)
    }

    #[test]
    fn both_methods_solve_simple_system() {
        let (x, y) = line_system();
        for method in [SolveMethod::Normal, SolveMethod::Qr] {
            let beta = solve_weighted_ridge(&x, &y, &[1.0, 1.0, 1.0], 0.0, method).unwrap();
            assert_abs_diff_eq!(beta[0], 2.0, epsilon = 1e-10);
            assert_abs_diff_eq!(beta[1], 3.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn weights_scale_rows_directly() {
        // Inconsistent data: y = 0 at x = 0 and y = 1 at x = 0, single intercept column.
        // Weighted LS with row weights w gives (w0² · 0 + w1² · 1) / (w0² + w1²).
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        let y = DVector::from_row_slice(&[0.0, 1.0]);
        for method in [SolveMethod::Normal, SolveMethod::Qr] {
            let beta = solve_weighted_ridge(&x, &y, &[1.0, 3.0], 0.0, method).unwrap();
            assert_abs_diff_eq!(beta[0], 0.9, epsilon = 1e-12);
        }
    }

    #[test]
    fn ridge_matches_closed_form() {
        // One column of ones, n rows of y = 1: θ = n / (n + λ).
        let x = DMatrix::from_element(4, 1, 1.0);
        let y = DVector::from_element(4, 1.0);
        for method in [SolveMethod::Normal, SolveMethod::Qr] {
            let beta = solve_weighted_ridge(&x, &y, &[1.0; 4], 0.5, method).unwrap();
            assert_abs_diff_eq!(beta[0], 4.0 / 4.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn ridge_makes_duplicate_columns_solvable() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);

        let beta = solve_weighted_ridge(&x, &y, &[1.0; 3], 1e-6, SolveMethod::Normal).unwrap();
        // The ridge splits the shared coefficient evenly.
        assert_abs_diff_eq!(beta[0], beta[1], epsilon = 1e-9);
        assert_abs_diff_eq!(beta[0] + beta[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn singular_system_fails_explicitly() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 2.0, 0.0, 3.0, 0.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);

        let normal = solve_weighted_ridge(&x, &y, &[1.0; 3], 0.0, SolveMethod::Normal);
        assert_eq!(normal, Err(SolveError::Singular));

        let qr = solve_weighted_ridge(&x, &y, &[1.0; 3], 0.0, SolveMethod::Qr);
        assert!(matches!(qr, Err(SolveError::RankDeficient { .. })));
    }

    #[test]
    fn squared_conditioning_fails_on_normal_equations() {
        // AᵗA = [[1, 1], [1, 1 + 2⁻⁵²]] exactly: the second LU pivot is ε, not zero.
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 0.0, 2f64.powi(-26)]);
        let y = DVector::from_row_slice(&[2.0, 2f64.powi(-26)]);

        let normal = solve_weighted_ridge(&x, &y, &[1.0; 2], 0.0, SolveMethod::Normal);
        assert_eq!(normal, Err(SolveError::Singular));

        let qr = solve_weighted_ridge(&x, &y, &[1.0; 2], 0.0, SolveMethod::Qr).unwrap();
        assert_abs_diff_eq!(qr[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(qr[1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let (x, y) = line_system();
        let err = solve_weighted_ridge(&x, &y, &[1.0, 1.0], 0.0, SolveMethod::Normal).unwrap_err();
        assert_eq!(
            err,
            SolveError::DimensionMismatch {
                rows: 3,
                rhs: 3,
                weights: 2
            }
        );
    }
}

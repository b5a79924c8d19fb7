//! Interpolating B-splines on a fixed node set.
//!
//! Surrogate basis columns all live on the same time grid, so the expensive
//! part of spline interpolation (knot placement and factorizing the
//! collocation matrix) is done once per grid in [`SplineBasis::new`]. Each
//! column then costs one banded triangular solve to fit, and evaluation at a
//! sample costs `degree + 1` basis-function values shared across all columns.
//!
//! Knot placement follows the usual interpolation convention: boundary knots
//! have multiplicity `degree + 1`; for odd degrees the interior knots are the
//! nodes themselves with `(degree + 1) / 2` dropped at each end (the
//! "not-a-knot" condition for cubics), for even degrees they are midpoints
//! between nodes.
//!
//! Numerical notes:
//! - The collocation matrix is totally positive, so Gaussian elimination
//!   without pivoting is stable and the factors stay inside the band.
//! - Outside the node range the boundary polynomial pieces are extrapolated.

use nalgebra::DMatrix;

use crate::error::{AppError, ErrorKind};

/// Degree used when a caller does not ask for another one.
pub const DEFAULT_SPLINE_DEGREE: usize = 3;

/// Highest supported spline degree.
pub const MAX_SPLINE_DEGREE: usize = 5;

/// Pivot magnitude below which the collocation matrix is treated as singular.
const PIVOT_EPS: f64 = 1e-300;

/// Interpolating spline space over a strictly increasing node set.
#[derive(Debug, Clone)]
pub struct SplineBasis {
    degree: usize,
    nodes_min: f64,
    nodes_max: f64,
    knots: Vec<f64>,
    collocation: BandedLu,
}

impl SplineBasis {
    /// Place knots for `nodes` and factorize the interpolation system.
    pub fn new(nodes: &[f64], degree: usize) -> Result<Self, AppError> {
        if degree == 0 || degree > MAX_SPLINE_DEGREE {
            return Err(AppError::new(
                ErrorKind::InvalidInput,
                format!("Spline degree must be in 1..={MAX_SPLINE_DEGREE}, got {degree}."),
            ));
        }
        let n = nodes.len();
        if n < degree + 1 {
            return Err(AppError::new(
                ErrorKind::InvalidInput,
                format!("A degree-{degree} spline needs at least {} nodes, got {n}.", degree + 1),
            ));
        }
        if nodes.iter().any(|x| !x.is_finite()) || nodes.windows(2).any(|w| w[1] <= w[0]) {
            return Err(AppError::new(
                ErrorKind::InvalidInput,
                "Spline nodes must be finite and strictly increasing.",
            ));
        }

        let knots = interpolation_knots(nodes, degree);
        let mut basis = Self {
            degree,
            nodes_min: nodes[0],
            nodes_max: nodes[n - 1],
            knots,
            collocation: BandedLu::zeros(n, degree),
        };

        let mut band = BandedLu::zeros(n, degree);
        for (i, &x) in nodes.iter().enumerate() {
            let (first, weights) = basis.locate(x);
            for (j, &w) in weights.iter().take(degree + 1).enumerate() {
                let col = first + j;
                if w == 0.0 {
                    continue;
                }
                if col.abs_diff(i) > degree {
                    return Err(AppError::new(
                        ErrorKind::Numerical,
                        "Spline collocation matrix is not banded; nodes violate the interpolation conditions.",
                    ));
                }
                band.set(i, col, w);
            }
        }
        band.factorize()?;
        basis.collocation = band;
        Ok(basis)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of spline coefficients (equal to the number of nodes).
    pub fn len(&self) -> usize {
        self.knots.len() - self.degree - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(first, last)` node of the interpolation grid.
    pub fn domain(&self) -> (f64, f64) {
        (self.nodes_min, self.nodes_max)
    }

    /// Spline coefficients interpolating `values` at the nodes.
    pub fn fit(&self, values: &[f64]) -> Result<Vec<f64>, AppError> {
        if values.len() != self.len() {
            return Err(AppError::new(
                ErrorKind::InvalidInput,
                format!(
                    "Spline fit expects {} values, got {}.",
                    self.len(),
                    values.len()
                ),
            ));
        }
        let mut coeffs = values.to_vec();
        self.collocation.solve(&mut coeffs);
        Ok(coeffs)
    }

    /// Fit every column of `values` (rows = nodes). Returns coefficients with the same shape.
    pub fn fit_columns(&self, values: &DMatrix<f64>) -> Result<DMatrix<f64>, AppError> {
        if values.nrows() != self.len() {
            return Err(AppError::new(
                ErrorKind::InvalidInput,
                format!(
                    "Spline fit expects {} rows, got {}.",
                    self.len(),
                    values.nrows()
                ),
            ));
        }
        let mut coeffs = DMatrix::zeros(values.nrows(), values.ncols());
        let mut work = vec![0.0; values.nrows()];
        for (c, column) in values.column_iter().enumerate() {
            work.iter_mut().zip(column.iter()).for_each(|(w, v)| *w = *v);
            self.collocation.solve(&mut work);
            for (r, w) in work.iter().enumerate() {
                coeffs[(r, c)] = *w;
            }
        }
        Ok(coeffs)
    }

    /// Evaluate a single fitted spline at `x`.
    pub fn evaluate(&self, coeffs: &[f64], x: f64) -> f64 {
        let (first, weights) = self.locate(x);
        weights
            .iter()
            .take(self.degree + 1)
            .enumerate()
            .map(|(j, w)| w * coeffs[first + j])
            .sum()
    }

    /// Evaluate every fitted column at every sample. Output rows follow `samples`.
    pub fn evaluate_columns(&self, coeffs: &DMatrix<f64>, samples: &[f64]) -> DMatrix<f64> {
        let mut out = DMatrix::zeros(samples.len(), coeffs.ncols());
        for (r, &x) in samples.iter().enumerate() {
            let (first, weights) = self.locate(x);
            for c in 0..coeffs.ncols() {
                let mut acc = 0.0;
                for (j, w) in weights.iter().take(self.degree + 1).enumerate() {
                    acc += w * coeffs[(first + j, c)];
                }
                out[(r, c)] = acc;
            }
        }
        out
    }

    /// Index of the first non-zero basis function at `x` and the `degree + 1`
    /// non-zero basis values starting there.
    fn locate(&self, x: f64) -> (usize, [f64; MAX_SPLINE_DEGREE + 1]) {
        let span = self.find_span(x);
        (span - self.degree, self.basis_funs(span, x))
    }

    fn find_span(&self, x: f64) -> usize {
        let k = self.degree;
        let n = self.len();
        if x >= self.knots[n] {
            return n - 1;
        }
        if x <= self.knots[k] {
            return k;
        }
        let mut lo = k;
        let mut hi = n;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if x < self.knots[mid] {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        lo
    }

    /// Cox-de Boor recurrence for the non-vanishing basis functions on `span`.
    fn basis_funs(&self, span: usize, x: f64) -> [f64; MAX_SPLINE_DEGREE + 1] {
        let k = self.degree;
        let mut n = [0.0; MAX_SPLINE_DEGREE + 1];
        let mut left = [0.0; MAX_SPLINE_DEGREE + 1];
        let mut right = [0.0; MAX_SPLINE_DEGREE + 1];
        n[0] = 1.0;
        for j in 1..=k {
            left[j] = x - self.knots[span + 1 - j];
            right[j] = self.knots[span + j] - x;
            let mut saved = 0.0;
            for r in 0..j {
                let temp = n[r] / (right[r + 1] + left[j - r]);
                n[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            n[j] = saved;
        }
        n
    }
}

fn interpolation_knots(nodes: &[f64], degree: usize) -> Vec<f64> {
    let n = nodes.len();
    let mut knots = Vec::with_capacity(n + degree + 1);
    knots.extend(std::iter::repeat_n(nodes[0], degree + 1));
    if degree % 2 == 1 {
        let half = (degree + 1) / 2;
        knots.extend_from_slice(&nodes[half..n - half]);
    } else {
        let half = degree / 2;
        for i in 0..(n - degree - 1) {
            knots.push(0.5 * (nodes[i + half] + nodes[i + half + 1]));
        }
    }
    knots.extend(std::iter::repeat_n(nodes[n - 1], degree + 1));
    knots
}

/// Square banded matrix with equal lower/upper bandwidth, factorized in place
/// as `L U` without pivoting.
#[derive(Debug, Clone)]
struct BandedLu {
    n: usize,
    width: usize,
    data: Vec<f64>,
}

impl BandedLu {
    fn zeros(n: usize, width: usize) -> Self {
        Self {
            n,
            width,
            data: vec![0.0; n * (2 * width + 1)],
        }
    }

    fn idx(&self, i: usize, j: usize) -> usize {
        i * (2 * self.width + 1) + (j + self.width - i)
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.data[self.idx(i, j)]
    }

    fn set(&mut self, i: usize, j: usize, v: f64) {
        let idx = self.idx(i, j);
        self.data[idx] = v;
    }

    fn factorize(&mut self) -> Result<(), AppError> {
        let (n, w) = (self.n, self.width);
        for p in 0..n {
            let pivot = self.get(p, p);
            if !(pivot.abs() > PIVOT_EPS) {
                return Err(AppError::new(
                    ErrorKind::Numerical,
                    format!("Singular spline collocation matrix at row {p}."),
                ));
            }
            let last = (p + w).min(n - 1);
            for i in (p + 1)..=last {
                let l = self.get(i, p) / pivot;
                self.set(i, p, l);
                if l == 0.0 {
                    continue;
                }
                for j in (p + 1)..=last {
                    let v = self.get(i, j) - l * self.get(p, j);
                    self.set(i, j, v);
                }
            }
        }
        Ok(())
    }

    fn solve(&self, rhs: &mut [f64]) {
        let (n, w) = (self.n, self.width);
        for i in 0..n {
            let mut acc = rhs[i];
            for j in i.saturating_sub(w)..i {
                acc -= self.get(i, j) * rhs[j];
            }
            rhs[i] = acc;
        }
        for i in (0..n).rev() {
            let mut acc = rhs[i];
            for j in (i + 1)..=(i + w).min(n - 1) {
                acc -= self.get(i, j) * rhs[j];
            }
            rhs[i] = acc / self.get(i, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid(n: usize, a: f64, b: f64) -> Vec<f64> {
        (0..n)
            .map(|i| a + (b - a) * i as f64 / (n as f64 - 1.0))
            .collect()
    }

    #[test]
    fn spline_passes_through_data_points() {
        let xs = vec![0.0, 0.7, 1.1, 2.0, 3.5, 4.0, 6.0];
        let ys: Vec<f64> = xs.iter().map(|x: &f64| (1.3 * x).sin() + 0.1 * x).collect();
        for degree in 1..=MAX_SPLINE_DEGREE {
            let basis = SplineBasis::new(&xs, degree).unwrap();
            let coeffs = basis.fit(&ys).unwrap();
            for (x, y) in xs.iter().zip(&ys) {
                assert_abs_diff_eq!(basis.evaluate(&coeffs, *x), *y, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn cubic_spline_reproduces_cubic_polynomials() {
        let xs = grid(12, -3.0, 5.0);
        let f = |x: f64| 0.5 * x * x * x - 2.0 * x * x + x - 7.0;
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        let basis = SplineBasis::new(&xs, 3).unwrap();
        let coeffs = basis.fit(&ys).unwrap();
        for &x in &[-2.9, -1.234, 0.0, 0.5, 3.3, 4.99] {
            assert_abs_diff_eq!(basis.evaluate(&coeffs, x), f(x), epsilon = 1e-9);
        }
    }

    #[test]
    fn linear_spline_is_piecewise_linear_interpolation() {
        let xs = vec![0.0, 1.0, 3.0];
        let ys = vec![1.0, 3.0, -1.0];
        let basis = SplineBasis::new(&xs, 1).unwrap();
        let coeffs = basis.fit(&ys).unwrap();
        assert_abs_diff_eq!(basis.evaluate(&coeffs, 0.5), 2.0, epsilon = 1e-14);
        assert_abs_diff_eq!(basis.evaluate(&coeffs, 2.0), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn column_evaluation_matches_single_evaluation() {
        let xs = grid(20, 0.0, 10.0);
        let mut values = DMatrix::zeros(xs.len(), 3);
        for (i, &x) in xs.iter().enumerate() {
            values[(i, 0)] = x.cos();
            values[(i, 1)] = (0.3 * x).exp();
            values[(i, 2)] = x * x;
        }
        let basis = SplineBasis::new(&xs, 3).unwrap();
        let coeffs = basis.fit_columns(&values).unwrap();
        let samples = [0.05, 2.5, 7.77, 10.0];
        let out = basis.evaluate_columns(&coeffs, &samples);
        for c in 0..3 {
            let col: Vec<f64> = coeffs.column(c).iter().copied().collect();
            for (r, &x) in samples.iter().enumerate() {
                assert_abs_diff_eq!(out[(r, c)], basis.evaluate(&col, x), epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn invalid_nodes_are_rejected() {
        let err = SplineBasis::new(&[0.0, 1.0, 1.0, 2.0, 3.0], 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = SplineBasis::new(&[0.0, 1.0, 2.0], 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = SplineBasis::new(&[0.0, 1.0, 2.0, 3.0], 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}

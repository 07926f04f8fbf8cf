//! Correlation matrices and their Cholesky factors.

use nalgebra::{Cholesky, DMatrix, SymmetricEigen};

use crate::error::{MathError, MathResult};

/// Tolerance for unit diagonal and symmetry checks.
pub const CORRELATION_TOLERANCE: f64 = 1e-10;

/// Checks that `matrix` is a finite, square, symmetric matrix with unit
/// diagonal and entries in `[-1, 1]`.
pub fn validate_correlation(matrix: &DMatrix<f64>) -> MathResult<()> {
    let n = matrix.nrows();
    if n == 0 || matrix.ncols() != n {
        return Err(MathError::invalid_correlation(format!(
            "matrix must be square and non-empty, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        )));
    }

    for i in 0..n {
        let d = matrix[(i, i)];
        if !d.is_finite() || (d - 1.0).abs() > CORRELATION_TOLERANCE {
            return Err(MathError::invalid_correlation(format!(
                "diagonal entry {i} is {d}, expected 1"
            )));
        }
        for j in 0..n {
            let rho = matrix[(i, j)];
            if !rho.is_finite() || rho.abs() > 1.0 {
                return Err(MathError::invalid_correlation(format!(
                    "entry ({i}, {j}) = {rho} is outside [-1, 1]"
                )));
            }
            if (rho - matrix[(j, i)]).abs() > CORRELATION_TOLERANCE {
                return Err(MathError::invalid_correlation(format!(
                    "entries ({i}, {j}) and ({j}, {i}) differ"
                )));
            }
        }
    }
    Ok(())
}

/// Lower Cholesky factor `L` with `L Lᵀ = matrix`.
///
/// Falls back to a semidefinite factorisation when the matrix is singular
/// but has no negative eigenvalue (for example perfectly correlated
/// assets).
pub fn cholesky_lower(matrix: &DMatrix<f64>) -> MathResult<DMatrix<f64>> {
    if let Some(chol) = Cholesky::new(matrix.clone()) {
        return Ok(chol.l());
    }

    let min_eigenvalue = SymmetricEigen::new(matrix.clone())
        .eigenvalues
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);
    if min_eigenvalue < -CORRELATION_TOLERANCE {
        return Err(MathError::NotPositiveDefinite);
    }
    Ok(cholesky_semidefinite(matrix))
}

/// Validates a correlation matrix and returns its lower Cholesky factor.
pub fn correlation_cholesky(matrix: &DMatrix<f64>) -> MathResult<DMatrix<f64>> {
    validate_correlation(matrix)?;
    cholesky_lower(matrix)
}

/// One-factor correlation matrix with `ρ_ij = β_i β_j` off the diagonal.
pub fn one_factor_correlation(loadings: &[f64]) -> MathResult<DMatrix<f64>> {
    if loadings.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    if let Some(b) = loadings.iter().find(|b| !b.is_finite() || b.abs() > 1.0) {
        return Err(MathError::invalid_correlation(format!(
            "factor loading {b} is outside [-1, 1]"
        )));
    }
    let n = loadings.len();
    Ok(DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            1.0
        } else {
            loadings[i] * loadings[j]
        }
    }))
}

/// Matrix with unit diagonal and a constant `rho` off the diagonal.
pub fn constant_correlation(n: usize, rho: f64) -> MathResult<DMatrix<f64>> {
    let m = DMatrix::from_fn(n, n, |i, j| if i == j { 1.0 } else { rho });
    validate_correlation(&m)?;
    Ok(m)
}

fn cholesky_semidefinite(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let n = matrix.nrows();
    let mut l = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        for j in 0..=i {
            let mut sum = matrix[(i, j)];
            for k in 0..j {
                sum -= l[(i, k)] * l[(j, k)];
            }
            if i == j {
                l[(i, j)] = sum.max(0.0).sqrt();
            } else if l[(j, j)] > CORRELATION_TOLERANCE {
                l[(i, j)] = sum / l[(j, j)];
            }
        }
    }
    l
}

//! Eigenvalues of a dense, general (non-symmetric) square matrix.

use anyhow::{anyhow, ensure, Result};
use nalgebra::{Complex, DMatrix, Schur};

/// Iteration budget per row for the QR sweeps inside the Schur decomposition.
const SCHUR_ITERATIONS_PER_ROW: usize = 1000;

/// Compute all eigenvalues of `matrix` via its real Schur form.
///
/// Real eigenvalues come back with a zero imaginary part; complex ones come in
/// conjugate pairs. Order follows the diagonal of the Schur form.
pub fn eigenvalues(matrix: &DMatrix<f64>) -> Result<Vec<Complex<f64>>> {
    ensure!(
        matrix.is_square(),
        "eigenvalues need a square matrix, got {}x{}",
        matrix.nrows(),
        matrix.ncols()
    );
    let n = matrix.nrows();
    if n == 0 {
        return Ok(Vec::new());
    }

    let schur = Schur::try_new(matrix.clone(), f64::EPSILON, SCHUR_ITERATIONS_PER_ROW * n)
        .ok_or_else(|| anyhow!("Schur decomposition of a {n}x{n} matrix did not converge"))?;

    Ok(schur.complex_eigenvalues().iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn sorted(mut values: Vec<Complex<f64>>) -> Vec<Complex<f64>> {
        values.sort_by(|a, b| a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im)));
        values
    }

    #[test]
    fn diagonal_matrix() {
        let m = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![3.0, 1.0, 2.0]));
        let ev = sorted(eigenvalues(&m).unwrap());
        for (got, want) in ev.iter().zip([1.0, 2.0, 3.0]) {
            assert!((got.re - want).abs() < TOL, "{got}");
            assert!(got.im.abs() < TOL, "{got}");
        }
    }

    #[test]
    fn rotation_has_imaginary_pair() {
        let m = DMatrix::from_row_slice(2, 2, &[0.0, -1.0, 1.0, 0.0]);
        let ev = sorted(eigenvalues(&m).unwrap());
        assert_eq!(ev.len(), 2);
        assert!(ev[0].re.abs() < TOL && (ev[0].im + 1.0).abs() < TOL, "{}", ev[0]);
        assert!(ev[1].re.abs() < TOL && (ev[1].im - 1.0).abs() < TOL, "{}", ev[1]);
    }

    #[test]
    fn upper_triangular_reads_diagonal() {
        let m = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 2.0, 0.0, -1.0, 5.0, 0.0, 0.0, 7.0]);
        let ev = sorted(eigenvalues(&m).unwrap());
        for (got, want) in ev.iter().zip([-1.0, 4.0, 7.0]) {
            assert!((got.re - want).abs() < TOL, "{got}");
        }
    }

    #[test]
    fn trace_matches_eigenvalue_sum() {
        let m = DMatrix::from_fn(12, 12, |r, c| ((r * 7 + c * 3) % 11) as f64 - 5.0);
        let ev = eigenvalues(&m).unwrap();
        let sum: Complex<f64> = ev.iter().sum();
        assert!((sum.re - m.trace()).abs() < 1e-8, "{sum} vs {}", m.trace());
        assert!(sum.im.abs() < 1e-8);
    }

    #[test]
    fn non_square_is_an_error() {
        let m = DMatrix::<f64>::zeros(2, 3);
        let err = eigenvalues(&m).unwrap_err();
        assert!(err.to_string().contains("2x3"), "{err}");
    }

    #[test]
    fn empty_matrix_has_no_eigenvalues() {
        assert!(eigenvalues(&DMatrix::<f64>::zeros(0, 0)).unwrap().is_empty());
    }
}

//! Dense eigen-solution of the buckling problem `(−Kff)⁻¹·Kffg·{Δ} = λ·{Δ}`
//!
//! With `Kff = L·Lᵀ` positive definite and `Kffg` symmetric the problem is reduced to the
//! symmetric matrix `−L⁻¹·Kffg·L⁻ᵀ` and solved with [`SymmetricEigen`], mapping each
//! eigenvector back through `L⁻ᵀ`. Any other pair of matrices goes through a bounded real
//! Schur decomposition of `(−Kff)⁻¹·Kffg`, keeping the eigenvalues complex, with
//! eigenvectors recovered by shifted inverse iteration.

use std::cmp::Ordering;

use nalgebra::linalg::{Cholesky, Schur, SymmetricEigen};
use nalgebra::{Complex, Dyn};

use crate::error::{FEAError, FEAResult};

use super::{CMat, CVec, Mat};

/// Iteration cap of the symmetric and Schur eigen-solvers
const MAX_ITERATIONS: usize = 10_000;

/// Largest asymmetry, relative to the largest entry, still treated as symmetric
const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Inverse iteration sweeps per shift
const INVERSE_ITERATIONS: usize = 4;

/// Shift offsets tried before inverse iteration gives up
const SHIFT_ATTEMPTS: i32 = 4;

/// A critical load factor together with the raw eigenvalue it was derived from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EigenPair {
    /// Critical load factor, the reciprocal of `raw`
    pub load_factor: Complex<f64>,
    /// Eigenvalue of `(−Kff)⁻¹·Kffg`
    pub raw: Complex<f64>,
}

impl EigenPair {
    fn from_raw(raw: Complex<f64>, zero_threshold: f64) -> Self {
        let load_factor = if raw.norm() <= zero_threshold {
            Complex::new(f64::INFINITY, 0.0)
        } else {
            Complex::new(1.0, 0.0) / raw
        };
        Self { load_factor, raw }
    }
}

/// Eigenpairs sorted ascending by load factor, each with its mode shape
#[derive(Debug, Clone, Default)]
pub struct BucklingSpectrum {
    pub pairs: Vec<EigenPair>,
    /// Unit-length eigenvectors, in the order of `pairs`
    pub mode_shapes: Vec<CVec>,
}

impl BucklingSpectrum {
    /// Pair raw eigenvalues with their vectors and sort them by load factor
    ///
    /// Raw eigenvalues whose modulus is at most `zero_tolerance` times the spectral radius
    /// map to an infinite load factor, so they sort last instead of landing at ±1/ε.
    fn from_raw(raw: Vec<Complex<f64>>, mode_shapes: Vec<CVec>, zero_tolerance: f64) -> Self {
        let radius = raw.iter().fold(0.0_f64, |acc, v| acc.max(v.norm()));
        let zero_threshold = zero_tolerance * radius;

        let mut entries: Vec<(EigenPair, CVec)> = raw
            .into_iter()
            .map(|v| EigenPair::from_raw(v, zero_threshold))
            .zip(mode_shapes)
            .collect();
        entries.sort_by(|a, b| compare_complex(&a.0.load_factor, &b.0.load_factor));

        let (pairs, mode_shapes): (Vec<EigenPair>, Vec<CVec>) = entries.into_iter().unzip();
        Self { pairs, mode_shapes }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Ascending order on the real part, ties broken by the imaginary part
pub fn compare_complex(a: &Complex<f64>, b: &Complex<f64>) -> Ordering {
    a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im))
}

/// Solve the buckling eigenproblem of the free-free elastic and geometric stiffness matrices
pub fn buckling_spectrum(kff: &Mat, kffg: &Mat, zero_tolerance: f64) -> FEAResult<BucklingSpectrum> {
    let n = kff.nrows();
    if n == 0 {
        return Ok(BucklingSpectrum::default());
    }

    if kffg.iter().all(|&v| v == 0.0) {
        // no geometric stiffness: every raw eigenvalue is zero
        let raw = vec![Complex::new(0.0, 0.0); n];
        let shapes = (0..n).map(|i| unit_vector(n, i)).collect();
        return Ok(BucklingSpectrum::from_raw(raw, shapes, zero_tolerance));
    }

    if is_symmetric(kff) && is_symmetric(kffg) {
        if let Some(cholesky) = Cholesky::new(kff.clone()) {
            return symmetric_spectrum(&cholesky, kffg, zero_tolerance);
        }
        log::debug!("Kff is not positive definite, using the general eigen-solver");
    }

    general_spectrum(kff, kffg, zero_tolerance)
}

fn symmetric_spectrum(
    cholesky: &Cholesky<f64, Dyn>,
    kffg: &Mat,
    zero_tolerance: f64,
) -> FEAResult<BucklingSpectrum> {
    let l_inv = cholesky.l().try_inverse().ok_or(FEAError::SingularMatrix)?;
    let l_inv_t = l_inv.transpose();

    let reduced = -(&l_inv * kffg * &l_inv_t);
    let reduced = (&reduced + reduced.transpose()) * 0.5;
    let eigen = SymmetricEigen::try_new(reduced, f64::EPSILON, MAX_ITERATIONS)
        .ok_or_else(|| FEAError::MathError("symmetric eigen-solver did not converge".to_string()))?;

    let raw = eigen.eigenvalues.iter().map(|&v| Complex::new(v, 0.0)).collect();
    let shapes = eigen
        .eigenvectors
        .column_iter()
        .map(|psi| {
            let phi = &l_inv_t * psi;
            normalize_phase(phi.map(|v| Complex::new(v, 0.0)))
        })
        .collect();

    Ok(BucklingSpectrum::from_raw(raw, shapes, zero_tolerance))
}

fn general_spectrum(kff: &Mat, kffg: &Mat, zero_tolerance: f64) -> FEAResult<BucklingSpectrum> {
    let a = super::solve_matrix_system(&(-kff), kffg).ok_or(FEAError::SingularMatrix)?;
    let schur = Schur::try_new(a.clone(), f64::EPSILON, MAX_ITERATIONS)
        .ok_or_else(|| FEAError::MathError("Schur decomposition did not converge".to_string()))?;

    let raw: Vec<Complex<f64>> = schur.complex_eigenvalues().iter().copied().collect();
    let mut shapes = Vec::with_capacity(raw.len());
    for &value in &raw {
        let shape = eigenvector(&a, value)
            .ok_or_else(|| FEAError::MathError(format!("no eigenvector found for eigenvalue {value}")))?;
        shapes.push(shape);
    }

    Ok(BucklingSpectrum::from_raw(raw, shapes, zero_tolerance))
}

fn is_symmetric(m: &Mat) -> bool {
    (m - m.transpose()).amax() <= SYMMETRY_TOLERANCE * m.amax()
}

fn unit_vector(n: usize, i: usize) -> CVec {
    CVec::from_fn(n, |r, _| {
        if r == i {
            Complex::new(1.0, 0.0)
        } else {
            Complex::new(0.0, 0.0)
        }
    })
}

/// Eigenvector of `a` for `eigenvalue` by shifted inverse iteration
///
/// The vector is scaled to unit length and rotated so that its largest component is real
/// and positive. Returns `None` when every shifted system is singular.
pub fn eigenvector(a: &Mat, eigenvalue: Complex<f64>) -> Option<CVec> {
    let n = a.nrows();
    if n == 0 {
        return None;
    }

    let norm = a.norm();
    let scale = if norm > 0.0 { norm } else { 1.0 };
    let complex_a: CMat = a.map(|v| Complex::new(v, 0.0));

    for attempt in 0..SHIFT_ATTEMPTS {
        let offset = scale * 1e-10 * 10f64.powi(attempt);
        let shift = eigenvalue + Complex::new(offset, 0.0);

        let mut shifted = complex_a.clone();
        for i in 0..n {
            shifted[(i, i)] -= shift;
        }
        let lu = shifted.lu();

        let mut x = starting_vector(n);
        let mut failed = false;
        for _ in 0..INVERSE_ITERATIONS {
            let Some(y) = lu.solve(&x) else {
                failed = true;
                break;
            };
            let norm = y.norm();
            if !norm.is_finite() || norm == 0.0 {
                failed = true;
                break;
            }
            x = y.map(|c| c / norm);
        }

        if !failed {
            return Some(normalize_phase(x));
        }
        log::debug!("inverse iteration failed with shift offset {offset:e}, retrying");
    }

    None
}

/// Deliberately non-uniform so it is unlikely to be orthogonal to a symmetric or
/// antisymmetric mode
fn starting_vector(n: usize) -> CVec {
    let v = CVec::from_fn(n, |i, _| Complex::new(1.0 + i as f64 / n as f64, 0.0));
    let norm = v.norm();
    v.map(|c| c / norm)
}

/// Scale to unit length and rotate the largest component onto the positive real axis
fn normalize_phase(x: CVec) -> CVec {
    let norm = x.norm();
    if norm == 0.0 {
        return x;
    }
    let x = x.map(|c| c / norm);
    let largest = x
        .iter()
        .copied()
        .max_by(|a, b| a.norm().total_cmp(&b.norm()))
        .unwrap_or(Complex::new(1.0, 0.0));
    let modulus = largest.norm();
    if modulus == 0.0 {
        return x;
    }
    let phase = largest / modulus;
    x.map(|c| c / phase)
}

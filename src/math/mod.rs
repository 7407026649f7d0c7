//! Mathematical utilities for 2D frame calculations

pub mod eigen;
pub mod stability;

use nalgebra::{Complex, DMatrix, DVector};

pub use eigen::{buckling_spectrum, BucklingSpectrum, EigenPair};
pub use stability::StabilityFunctions;

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;
pub type CMat = DMatrix<Complex<f64>>;
pub type CVec = DVector<Complex<f64>>;

/// Local stiffness matrix of a 2D Euler-Bernoulli frame element
///
/// DOF order: [u_i, v_i, θ_i, u_j, v_j, θ_j]
pub fn frame_local_stiffness(e: f64, a: f64, i: f64, length: f64) -> Mat {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let ea_l = e * a / l;
    let ei_l3 = e * i / l3;
    let ei_l2 = e * i / l2;
    let ei_l = e * i / l;

    #[rustfmt::skip]
    let data = [
        ea_l,   0.0,          0.0,         -ea_l,  0.0,          0.0,
        0.0,    12.0*ei_l3,   6.0*ei_l2,   0.0,    -12.0*ei_l3,  6.0*ei_l2,
        0.0,    6.0*ei_l2,    4.0*ei_l,    0.0,    -6.0*ei_l2,   2.0*ei_l,
        -ea_l,  0.0,          0.0,         ea_l,   0.0,          0.0,
        0.0,    -12.0*ei_l3,  -6.0*ei_l2,  0.0,    12.0*ei_l3,   -6.0*ei_l2,
        0.0,    6.0*ei_l2,    2.0*ei_l,    0.0,    -6.0*ei_l2,   4.0*ei_l,
    ];

    Mat::from_row_slice(6, 6, &data)
}

/// Consistent geometric stiffness matrix of a 2D frame element
///
/// # Arguments
/// * `p` - Axial force at the j-node in local coordinates (negative = compression)
/// * `length` - Member length
pub fn frame_geometric_stiffness(p: f64, length: f64) -> Mat {
    let l = length;
    let l2 = l * l;
    let p_l = p / l;

    #[rustfmt::skip]
    let data = [
        1.0,   0.0,        0.0,             -1.0,  0.0,        0.0,
        0.0,   6.0/5.0,    l/10.0,          0.0,   -6.0/5.0,   l/10.0,
        0.0,   l/10.0,     2.0*l2/15.0,     0.0,   -l/10.0,    -l2/30.0,
        -1.0,  0.0,        0.0,             1.0,   0.0,        0.0,
        0.0,   -6.0/5.0,   -l/10.0,         0.0,   6.0/5.0,    -l/10.0,
        0.0,   l/10.0,     -l2/30.0,        0.0,   -l/10.0,    2.0*l2/15.0,
    ];

    Mat::from_row_slice(6, 6, &data) * p_l
}

/// Local stiffness matrix of a 2D truss element, DOF order [u_i, v_i, u_j, v_j]
pub fn truss_local_stiffness(e: f64, a: f64, length: f64) -> Mat {
    #[rustfmt::skip]
    let data = [
        1.0,  0.0, -1.0, 0.0,
        0.0,  0.0,  0.0, 0.0,
        -1.0, 0.0,  1.0, 0.0,
        0.0,  0.0,  0.0, 0.0,
    ];

    Mat::from_row_slice(4, 4, &data) * (e * a / length)
}

/// Geometric stiffness matrix of a 2D truss element
pub fn truss_geometric_stiffness(p: f64, length: f64) -> Mat {
    #[rustfmt::skip]
    let data = [
        1.0,  0.0,  -1.0, 0.0,
        0.0,  1.0,  0.0,  -1.0,
        -1.0, 0.0,  1.0,  0.0,
        0.0,  -1.0, 0.0,  1.0,
    ];

    Mat::from_row_slice(4, 4, &data) * (p / length)
}

/// Stiffness matrix of a linear rotational spring between two rotations
pub fn rotational_spring_stiffness(k: f64) -> Mat {
    Mat::from_row_slice(2, 2, &[k, -k, -k, k])
}

/// Direction cosines (c, s) of the line from `start` to `end`
pub fn direction_cosines(start: [f64; 2], end: [f64; 2]) -> (f64, f64) {
    let dx = end[0] - start[0];
    let dy = end[1] - start[1];
    let length = (dx * dx + dy * dy).sqrt();
    (dx / length, dy / length)
}

/// Block-diagonal rotation matrix built from `blocks` copies of the node rotation
///
/// Each block rotates the translational pair (x, y); when `with_rotation` is set the block
/// is 3x3 and carries the rotational DOF through unchanged.
pub fn transformation_matrix(c: f64, s: f64, blocks: usize, with_rotation: bool) -> Mat {
    let size = if with_rotation { 3 } else { 2 };
    let mut t = Mat::zeros(blocks * size, blocks * size);

    for block in 0..blocks {
        let o = block * size;
        t[(o, o)] = c;
        t[(o, o + 1)] = s;
        t[(o + 1, o)] = -s;
        t[(o + 1, o + 1)] = c;
        if with_rotation {
            t[(o + 2, o + 2)] = 1.0;
        }
    }

    t
}

/// Interpolation matrix of a frame element at local coordinate `x`
///
/// Row 0 interpolates the axial displacement linearly, row 1 interpolates the transverse
/// displacement with cubic Hermite polynomials.
pub fn frame_shape_function(x: f64, length: f64) -> Mat {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;
    let x2 = x * x;
    let x3 = x2 * x;

    #[rustfmt::skip]
    let data = [
        1.0 - x / l, 0.0,                                   0.0,                          x / l, 0.0,                             0.0,
        0.0,         1.0 - 3.0*x2/l2 + 2.0*x3/l3,           x - 2.0*x2/l + x3/l2,          0.0,   3.0*x2/l2 - 2.0*x3/l3,          -x2/l + x3/l2,
    ];

    Mat::from_row_slice(2, 6, &data)
}

/// Interpolation matrix of a truss element at local coordinate `x`
pub fn truss_shape_function(x: f64, length: f64) -> Mat {
    let n1 = 1.0 - x / length;
    let n2 = x / length;
    Mat::from_row_slice(2, 4, &[n1, 0.0, n2, 0.0, 0.0, n1, 0.0, n2])
}

/// Strain-displacement matrix of a frame element, scaled by the square roots of the
/// axial and flexural rigidities so that `BᵀB` integrates to the stiffness matrix
pub fn frame_b_matrix(x: f64, e: f64, a: f64, i: f64, length: f64) -> Mat {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;
    let ea = (e * a).sqrt();
    let ei = (e * i).sqrt();

    #[rustfmt::skip]
    let data = [
        -ea / l, 0.0,                              0.0,                         ea / l, 0.0,                             0.0,
        0.0,     ei * (12.0*x/l3 - 6.0/l2),        ei * (6.0*x/l2 - 4.0/l),     0.0,    ei * (6.0/l2 - 12.0*x/l3),       ei * (6.0*x/l2 - 2.0/l),
    ];

    Mat::from_row_slice(2, 6, &data)
}

/// Frame stiffness matrix integrated numerically with two-point Gauss quadrature
pub fn frame_quadrature_stiffness(e: f64, a: f64, i: f64, length: f64) -> Mat {
    let mut k = Mat::zeros(6, 6);

    for x in gauss_points(length) {
        let b = frame_b_matrix(x, e, a, i, length);
        k += b.transpose() * b;
    }

    k * (length / 2.0)
}

/// Strain-displacement matrix of a truss element, scaled by the square root of the axial
/// rigidity. Constant along the element.
pub fn truss_b_matrix(e: f64, a: f64, length: f64) -> Mat {
    let ea = (e * a).sqrt();
    Mat::from_row_slice(1, 4, &[-ea / length, 0.0, ea / length, 0.0])
}

/// Truss stiffness matrix integrated numerically with two-point Gauss quadrature
pub fn truss_quadrature_stiffness(e: f64, a: f64, length: f64) -> Mat {
    let mut k = Mat::zeros(4, 4);
    for _ in gauss_points(length) {
        let b = truss_b_matrix(e, a, length);
        k += b.transpose() * b;
    }
    k * (length / 2.0)
}

/// Local coordinates of the two Gauss points of an element of `length`
fn gauss_points(length: f64) -> [f64; 2] {
    let xi = 1.0 / 3.0_f64.sqrt();
    [-xi, xi].map(|point| length / 2.0 * (point + 1.0))
}

/// Scatter-add `local` into `global` at the row/column positions in `indices`
pub fn scatter_add(global: &mut Mat, local: &Mat, indices: &[usize]) {
    for (a, &m) in indices.iter().enumerate() {
        for (b, &n) in indices.iter().enumerate() {
            global[(m, n)] += local[(a, b)];
        }
    }
}

/// True when the LU factor `u` has a pivot at round-off level relative to the largest one
fn has_negligible_pivot(u: &Mat) -> bool {
    let pivots = u.diagonal();
    let largest = pivots.iter().fold(0.0_f64, |acc, p| acc.max(p.abs()));
    if largest == 0.0 {
        return true;
    }
    let tolerance = pivots.len() as f64 * f64::EPSILON * largest;
    pivots.iter().any(|p| !p.is_finite() || p.abs() <= tolerance)
}

/// Solve a linear system using LU decomposition
///
/// Returns `None` for a singular (or numerically singular) coefficient matrix.
pub fn solve_linear_system(a: &Mat, b: &Vec) -> Option<Vec> {
    let lu = a.clone().lu();
    if has_negligible_pivot(&lu.u()) {
        return None;
    }
    lu.solve(b)
}

/// Solve `A·X = B` for a matrix right-hand side using LU decomposition
pub fn solve_matrix_system(a: &Mat, b: &Mat) -> Option<Mat> {
    let lu = a.clone().lu();
    if has_negligible_pivot(&lu.u()) {
        return None;
    }
    lu.solve(b)
}

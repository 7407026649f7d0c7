//! Stability functions for frame members carrying axial load
//!
//! The functions follow Livesley's notation. With φ = L·√(|P|/EI):
//! - compression: s = φ(sin φ − φ cos φ) / (2 − 2 cos φ − φ sin φ),
//!   c = (φ − sin φ) / (sin φ − φ cos φ)
//! - tension: s = φ(φ cosh φ − sinh φ) / (2 − 2 cosh φ + φ sinh φ),
//!   c = (sinh φ − φ) / (φ cosh φ − sinh φ)
//!
//! Both reduce to the elastic values s = 4, c = 1/2 as the load vanishes. In compression `s`
//! is unbounded at φ = 2π.

use super::Mat;

/// Below this value of φ the series expansions are used
const SERIES_LIMIT: f64 = 1e-2;

/// Stability functions of a prismatic member at a given axial load
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityFunctions {
    /// Load parameter φ = L·√(|P|/EI)
    pub phi: f64,
    /// Rotational stiffness coefficient (4 for an unloaded member)
    pub s: f64,
    /// Carry-over factor (1/2 for an unloaded member)
    pub c: f64,
    /// True when the axial load is compressive
    pub compression: bool,
}

impl StabilityFunctions {
    /// Evaluate the stability functions for an axial load (positive = compression)
    pub fn new(axial_load: f64, e: f64, i: f64, length: f64) -> Self {
        let compression = axial_load >= 0.0;
        let phi = length * (axial_load.abs() / (e * i)).sqrt();

        let (s, c) = if phi < SERIES_LIMIT {
            let sign = if compression { -1.0 } else { 1.0 };
            let s = 4.0 + sign * 2.0 * phi * phi / 15.0;
            let sc = 2.0 - sign * phi * phi / 30.0;
            (s, sc / s)
        } else if compression {
            let (sin, cos) = phi.sin_cos();
            let s = phi * (sin - phi * cos) / (2.0 - 2.0 * cos - phi * sin);
            let c = (phi - sin) / (sin - phi * cos);
            (s, c)
        } else {
            let (sinh, cosh) = (phi.sinh(), phi.cosh());
            let s = phi * (phi * cosh - sinh) / (2.0 - 2.0 * cosh + phi * sinh);
            let c = (sinh - phi) / (phi * cosh - sinh);
            (s, c)
        };

        Self {
            phi,
            s,
            c,
            compression,
        }
    }

    /// Carry-over stiffness s·c (2 for an unloaded member)
    pub fn sc(&self) -> f64 {
        self.s * self.c
    }

    /// Moment-sway coefficient s(1 + c) (6 for an unloaded member)
    pub fn s_bar(&self) -> f64 {
        self.s * (1.0 + self.c)
    }

    /// Shear-sway coefficient 2s(1 + c) ∓ φ² (12 for an unloaded member)
    pub fn s_sway(&self) -> f64 {
        let phi2 = self.phi * self.phi;
        if self.compression {
            2.0 * self.s_bar() - phi2
        } else {
            2.0 * self.s_bar() + phi2
        }
    }
}

/// Exact stiffness matrix of a 2D frame element under a constant axial load
///
/// # Arguments
/// * `e` - Modulus of elasticity
/// * `a` - Cross-sectional area
/// * `i` - Moment of inertia
/// * `length` - Member length
/// * `axial_load` - Axial load, positive in compression
pub fn frame_stability_stiffness(e: f64, a: f64, i: f64, length: f64, axial_load: f64) -> Mat {
    let f = StabilityFunctions::new(axial_load, e, i, length);
    let l = length;
    let l2 = l * l;
    let r2_inv = a / i;
    let (s, sc, sb, ss) = (f.s, f.sc(), f.s_bar(), f.s_sway());

    #[rustfmt::skip]
    let data = [
        r2_inv,   0.0,       0.0,     -r2_inv,  0.0,       0.0,
        0.0,      ss/l2,     sb/l,    0.0,      -ss/l2,    sb/l,
        0.0,      sb/l,      s,       0.0,      -sb/l,     sc,
        -r2_inv,  0.0,       0.0,     r2_inv,   0.0,       0.0,
        0.0,      -ss/l2,    -sb/l,   0.0,      ss/l2,     -sb/l,
        0.0,      sb/l,      sc,      0.0,      -sb/l,     s,
    ];

    Mat::from_row_slice(6, 6, &data) * (e * i / l)
}

//! Section properties for unidimensional elements

use serde::{Deserialize, Serialize};

/// Cross-section properties of a frame or truss element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Section {
    /// Solid rectangle bending about the axis parallel to its width
    Rectangle { width: f64, height: f64 },
    /// Section given directly by its area and moment of inertia
    UserDefined { area: f64, inertia: f64 },
}

impl Section {
    /// Create a rectangular section
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self::Rectangle { width, height }
    }

    /// Create a section from explicit properties
    pub fn user_defined(area: f64, inertia: f64) -> Self {
        Self::UserDefined { area, inertia }
    }

    /// Cross-sectional area
    pub fn area(&self) -> f64 {
        match *self {
            Self::Rectangle { width, height } => width * height,
            Self::UserDefined { area, .. } => area,
        }
    }

    /// Moment of inertia about the bending axis
    pub fn inertia(&self) -> f64 {
        match *self {
            Self::Rectangle { width, height } => width * height.powi(3) / 12.0,
            Self::UserDefined { inertia, .. } => inertia,
        }
    }

    /// Radius of gyration, zero for a section without area
    pub fn radius_of_gyration(&self) -> f64 {
        let area = self.area();
        if area == 0.0 {
            0.0
        } else {
            (self.inertia() / area).sqrt()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangular_section() {
        let section = Section::rectangle(100.0, 150.0);
        assert_eq!(section.area(), 15000.0);
        assert_eq!(section.inertia(), 28125000.0);
    }

    #[test]
    fn test_user_defined_section() {
        let section = Section::user_defined(400.0, 10_000.0);
        assert_eq!(section.area(), 400.0);
        assert_eq!(section.inertia(), 10_000.0);
        assert!((section.radius_of_gyration() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_area_radius_of_gyration() {
        let section = Section::user_defined(0.0, 10.0);
        assert_eq!(section.radius_of_gyration(), 0.0);
    }
}

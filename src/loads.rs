//! Load and deformation value types for laminate analysis.

use nalgebra::{Vector3, Vector6};
use serde::{Deserialize, Serialize};

/// In-plane force resultants in N/mm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Forces {
    /// Normal force resultant along the laminate x axis.
    pub nx: f64,
    /// Normal force resultant along the laminate y axis.
    pub ny: f64,
    /// In-plane shear force resultant.
    pub nxy: f64,
}

impl Forces {
    /// Create [`Forces`] with explicit components.
    #[must_use]
    pub const fn new(nx: f64, ny: f64, nxy: f64) -> Self {
        Self { nx, ny, nxy }
    }

    /// Convert the resultants into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.nx, self.ny, self.nxy)
    }
}

/// Moment resultants in N·mm/mm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    /// Bending moment about the laminate y axis, stressing fibres along x.
    pub mx: f64,
    /// Bending moment about the laminate x axis, stressing fibres along y.
    pub my: f64,
    /// Twisting moment.
    pub mxy: f64,
}

impl Moments {
    /// Create [`Moments`] with explicit components.
    #[must_use]
    pub const fn new(mx: f64, my: f64, mxy: f64) -> Self {
        Self { mx, my, mxy }
    }

    /// Convert the resultants into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.mx, self.my, self.mxy)
    }
}

/// Engineering strains `(εx, εy, γxy)` in the laminate axis system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Strains {
    /// Normal strain along x.
    pub ex: f64,
    /// Normal strain along y.
    pub ey: f64,
    /// Engineering shear strain.
    pub gxy: f64,
}

impl Strains {
    /// Create [`Strains`] with explicit components.
    #[must_use]
    pub const fn new(ex: f64, ey: f64, gxy: f64) -> Self {
        Self { ex, ey, gxy }
    }

    /// Convert the strains into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.ex, self.ey, self.gxy)
    }
}

impl From<Vector3<f64>> for Strains {
    fn from(value: Vector3<f64>) -> Self {
        Self::new(value.x, value.y, value.z)
    }
}

/// Mid-plane curvatures `(κx, κy, κxy)` in 1/mm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Curvatures {
    /// Bending curvature about y.
    pub kx: f64,
    /// Bending curvature about x.
    pub ky: f64,
    /// Twist curvature.
    pub kxy: f64,
}

impl Curvatures {
    /// Create [`Curvatures`] with explicit components.
    #[must_use]
    pub const fn new(kx: f64, ky: f64, kxy: f64) -> Self {
        Self { kx, ky, kxy }
    }

    /// Convert the curvatures into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.kx, self.ky, self.kxy)
    }
}

/// Mid-plane deformation of the laminate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Deformation {
    /// Mid-plane strains.
    pub strains: Strains,
    /// Mid-plane curvatures.
    pub curvatures: Curvatures,
}

impl Deformation {
    /// Split a stacked `(ε⁰, κ)` vector.
    #[must_use]
    pub fn from_vector(value: &Vector6<f64>) -> Self {
        Self {
            strains: Strains::new(value[0], value[1], value[2]),
            curvatures: Curvatures::new(value[3], value[4], value[5]),
        }
    }

    /// Strain in the laminate axes at height `z` above the mid-plane.
    #[must_use]
    pub fn strains_at(&self, z: f64) -> Strains {
        (self.strains.to_vector() + self.curvatures.to_vector() * z).into()
    }
}

/// External load applied to the laminate for one load case.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoadState {
    /// Force and moment resultants; the deformation follows from the compliance.
    Resultants {
        /// In-plane force resultants.
        #[serde(default)]
        forces: Forces,
        /// Moment resultants.
        #[serde(default)]
        moments: Moments,
    },
    /// Prescribed mid-plane strains and curvatures.
    Deformation {
        /// Mid-plane strains.
        #[serde(default)]
        strains: Strains,
        /// Mid-plane curvatures.
        #[serde(default)]
        curvatures: Curvatures,
    },
}

impl LoadState {
    /// Load case with force resultants only.
    #[must_use]
    pub const fn forces(nx: f64, ny: f64, nxy: f64) -> Self {
        Self::Resultants {
            forces: Forces::new(nx, ny, nxy),
            moments: Moments::new(0.0, 0.0, 0.0),
        }
    }

    /// Load case with moment resultants only.
    #[must_use]
    pub const fn moments(mx: f64, my: f64, mxy: f64) -> Self {
        Self::Resultants {
            forces: Forces::new(0.0, 0.0, 0.0),
            moments: Moments::new(mx, my, mxy),
        }
    }
}

impl Default for LoadState {
    fn default() -> Self {
        Self::forces(0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strains_vary_linearly_through_thickness() {
        let deformation = Deformation {
            strains: Strains::new(1.0e-3, 0.0, 0.0),
            curvatures: Curvatures::new(2.0e-3, -1.0e-3, 0.0),
        };
        let top = deformation.strains_at(-0.5);
        assert_eq!(top, Strains::new(0.0, 5.0e-4, 0.0));
        let mid = deformation.strains_at(0.0);
        assert_eq!(mid, deformation.strains);
    }

    #[test]
    fn deformation_splits_stacked_vector() {
        let vector = Vector6::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let deformation = Deformation::from_vector(&vector);
        assert_eq!(deformation.strains, Strains::new(1.0, 2.0, 3.0));
        assert_eq!(deformation.curvatures, Curvatures::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn load_state_reads_tagged_json() {
        let text = r#"{"kind": "resultants", "forces": {"nx": 100.0, "ny": 0.0, "nxy": 0.0}}"#;
        let load: LoadState = serde_json::from_str(text).expect("valid load");
        assert_eq!(load, LoadState::forces(100.0, 0.0, 0.0));
        assert_eq!(
            LoadState::default(),
            LoadState::moments(0.0, 0.0, 0.0)
        );
    }
}

//! Ply and laminate stiffness by classical laminate theory.
//!
//! The reduced stiffness `Q` of each ply is rotated into the laminate axes and
//! integrated through the thickness to give the membrane (`A`), coupling (`B`)
//! and bending (`D`) blocks of the ABD matrix. See
//! <https://en.wikipedia.org/wiki/Composite_laminate>.

use nalgebra::{Matrix3, Matrix6};

use crate::errors::MatrixError;
use crate::laminate::StackedPly;
use crate::material::Material;
use crate::matrix::{block_symmetric, inverse_with_tolerance};

/// Plane-stress reduced stiffness of a ply in its material axes.
///
/// A material whose matrix properties have been degraded to zero yields a
/// matrix with only the fibre term `Q11 = E_par` left.
#[must_use]
pub fn reduced_stiffness(material: &Material) -> Matrix3<f64> {
    let nu21 = material.nu21();
    let denominator = 1.0 - material.nu12 * nu21;
    let q11 = material.e_par / denominator;
    let q22 = material.e_nor / denominator;
    let q12 = material.nu12 * material.e_nor / denominator;
    Matrix3::new(q11, q12, 0.0, q12, q22, 0.0, 0.0, 0.0, material.g12)
}

/// Rotate a reduced stiffness matrix by `angle` degrees into the laminate axes.
#[must_use]
pub fn rotated_stiffness(q: &Matrix3<f64>, angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.to_radians().sin_cos();
    let (c2, s2) = (c * c, s * s);
    let (c4, s4, s2c2) = (c2 * c2, s2 * s2, s2 * c2);

    let q11 = q[(0, 0)];
    let q12 = q[(0, 1)];
    let q22 = q[(1, 1)];
    let q66 = q[(2, 2)];

    let qb11 = q11 * c4 + 2.0 * (q12 + 2.0 * q66) * s2c2 + q22 * s4;
    let qb22 = q11 * s4 + 2.0 * (q12 + 2.0 * q66) * s2c2 + q22 * c4;
    let qb12 = (q11 + q22 - 4.0 * q66) * s2c2 + q12 * (s4 + c4);
    let qb66 = (q11 + q22 - 2.0 * q12 - 2.0 * q66) * s2c2 + q66 * (s4 + c4);
    let qb16 = (q11 - q12 - 2.0 * q66) * s * c * c2 + (q12 - q22 + 2.0 * q66) * s * s2 * c;
    let qb26 = (q11 - q12 - 2.0 * q66) * s * s2 * c + (q12 - q22 + 2.0 * q66) * s * c * c2;

    Matrix3::new(qb11, qb12, qb16, qb12, qb22, qb26, qb16, qb26, qb66)
}

/// Transformation of engineering strains from laminate to material axes.
#[must_use]
pub fn strain_transformation(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.to_radians().sin_cos();
    Matrix3::new(
        c * c,
        s * s,
        s * c,
        s * s,
        c * c,
        -s * c,
        -2.0 * s * c,
        2.0 * s * c,
        c * c - s * s,
    )
}

/// Stiffness contribution of one stacked ply.
#[derive(Clone, Copy, Debug)]
pub struct Layer<'a> {
    /// Material providing the ply stiffness, possibly a degraded copy.
    pub material: &'a Material,
    /// Fibre orientation in degrees.
    pub angle: f64,
    /// Coordinate of the top face.
    pub z_top: f64,
    /// Coordinate of the bottom face.
    pub z_bottom: f64,
}

impl<'a> Layer<'a> {
    /// Create a layer from a stacked ply and the material that stiffens it.
    #[must_use]
    pub fn new(material: &'a Material, stacked: &StackedPly<'_>) -> Self {
        Self {
            material,
            angle: stacked.ply.angle,
            z_top: stacked.z_top,
            z_bottom: stacked.z_bottom,
        }
    }

    /// Layer thickness.
    #[must_use]
    pub fn thickness(&self) -> f64 {
        self.z_bottom - self.z_top
    }

    /// Reduced stiffness in the material axes.
    #[must_use]
    pub fn local_stiffness(&self) -> Matrix3<f64> {
        reduced_stiffness(self.material)
    }

    /// Reduced stiffness rotated into the laminate axes.
    #[must_use]
    pub fn global_stiffness(&self) -> Matrix3<f64> {
        rotated_stiffness(&self.local_stiffness(), self.angle)
    }
}

/// Engineering constants of the laminate's membrane response.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct EngineeringConstants {
    /// Effective modulus along x.
    pub ex: f64,
    /// Effective modulus along y.
    pub ey: f64,
    /// Effective in-plane shear modulus.
    pub gxy: f64,
    /// Poisson ratio for loading along x.
    pub nu_xy: f64,
    /// Poisson ratio for loading along y.
    pub nu_yx: f64,
}

/// Laminate stiffness blocks together with the inverted ABD matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StiffnessMatrices {
    /// Membrane stiffness `A`.
    pub a: Matrix3<f64>,
    /// Membrane-bending coupling `B`.
    pub b: Matrix3<f64>,
    /// Bending stiffness `D`.
    pub d: Matrix3<f64>,
    /// Inverse of the full ABD matrix.
    pub compliance: Matrix6<f64>,
    /// Total laminate thickness.
    pub thickness: f64,
}

impl StiffnessMatrices {
    /// Integrate ply stiffness through the thickness and invert the result.
    ///
    /// `A = Σ Q̄ t`, `B = Σ Q̄ t z̄` and `D = Σ Q̄ (t³/12 + t z̄²)`, with `z̄` the
    /// ply mid-plane coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Singular`] when the ABD matrix has no inverse,
    /// which is how total loss of stiffness shows up after degradation.
    pub fn assemble(layers: &[Layer<'_>], pivot_tolerance: f64) -> Result<Self, MatrixError> {
        let mut a = Matrix3::zeros();
        let mut b = Matrix3::zeros();
        let mut d = Matrix3::zeros();
        let mut thickness = 0.0;
        for layer in layers {
            let q_bar = layer.global_stiffness();
            let t = layer.thickness();
            let z_mid = 0.5 * (layer.z_top + layer.z_bottom);
            a += q_bar * t;
            b += q_bar * (t * z_mid);
            d += q_bar * (t.powi(3) / 12.0 + t * z_mid * z_mid);
            thickness += t;
        }
        let compliance = inverse_with_tolerance(&block_symmetric(&a, &b, &d), pivot_tolerance)?;
        Ok(Self {
            a,
            b,
            d,
            compliance,
            thickness,
        })
    }

    /// The full 6×6 ABD matrix.
    #[must_use]
    pub fn abd(&self) -> Matrix6<f64> {
        block_symmetric(&self.a, &self.b, &self.d)
    }

    /// Membrane block `a` of the compliance.
    #[must_use]
    pub fn a_compliance(&self) -> Matrix3<f64> {
        self.compliance.fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// Coupling block `b` of the compliance.
    #[must_use]
    pub fn b_compliance(&self) -> Matrix3<f64> {
        self.compliance.fixed_view::<3, 3>(0, 3).into_owned()
    }

    /// Bending block `d` of the compliance.
    #[must_use]
    pub fn d_compliance(&self) -> Matrix3<f64> {
        self.compliance.fixed_view::<3, 3>(3, 3).into_owned()
    }

    /// Effective membrane engineering constants.
    #[must_use]
    pub fn engineering_constants(&self) -> EngineeringConstants {
        let a = self.a_compliance();
        let h = self.thickness;
        EngineeringConstants {
            ex: 1.0 / (h * a[(0, 0)]),
            ey: 1.0 / (h * a[(1, 1)]),
            gxy: 1.0 / (h * a[(2, 2)]),
            nu_xy: -a[(0, 1)] / a[(0, 0)],
            nu_yx: -a[(0, 1)] / a[(1, 1)],
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::laminate::{Laminate, Ply};
    use crate::material::MaterialLibrary;
    use crate::matrix::{is_symmetric, DEFAULT_PIVOT_TOLERANCE};

    fn cfrp() -> Material {
        Material::orthotropic(
            "CFRP",
            [141_000.0, 9_340.0, 0.35, 4_500.0],
            [2_000.0, 1_200.0, 50.0, 200.0, 80.0],
        )
    }

    fn laminate(angles: &[f64]) -> Laminate {
        let mut materials = MaterialLibrary::new();
        let id = materials.add(cfrp());
        let mut laminate = Laminate::new(materials);
        for &angle in angles {
            laminate.add_ply(Ply::new(id, 0.125, angle));
        }
        laminate
    }

    #[test]
    fn reduced_stiffness_matches_closed_form() {
        let q = reduced_stiffness(&cfrp());
        let nu21 = 0.35 * 9_340.0 / 141_000.0;
        let denominator = 1.0 - 0.35 * nu21;
        assert_relative_eq!(q[(0, 0)], 141_000.0 / denominator);
        assert_relative_eq!(q[(1, 1)], 9_340.0 / denominator);
        assert_relative_eq!(q[(0, 1)], 0.35 * 9_340.0 / denominator);
        assert_eq!(q[(2, 2)], 4_500.0);
    }

    #[test]
    fn quarter_turn_swaps_directions() {
        let q = reduced_stiffness(&cfrp());
        let q90 = rotated_stiffness(&q, 90.0);
        assert_relative_eq!(q90[(0, 0)], q[(1, 1)], max_relative = 1.0e-12);
        assert_relative_eq!(q90[(1, 1)], q[(0, 0)], max_relative = 1.0e-12);
        assert_relative_eq!(q90[(2, 2)], q[(2, 2)], max_relative = 1.0e-12);
        assert!(q90[(0, 2)].abs() < 1.0e-9);
    }

    #[test]
    fn opposite_angles_flip_shear_coupling_terms() {
        let q = reduced_stiffness(&cfrp());
        let plus = rotated_stiffness(&q, 45.0);
        let minus = rotated_stiffness(&q, -45.0);
        assert_relative_eq!(plus[(0, 2)], -minus[(0, 2)], max_relative = 1.0e-12);
        assert_relative_eq!(plus[(1, 2)], -minus[(1, 2)], max_relative = 1.0e-12);
        assert_relative_eq!(plus[(0, 0)], minus[(0, 0)], max_relative = 1.0e-12);
        assert_relative_eq!(rotated_stiffness(&q, 180.0), q, epsilon = 1.0e-8);
    }

    #[test]
    fn strain_transformation_is_identity_at_zero_degrees() {
        assert_relative_eq!(strain_transformation(0.0), Matrix3::identity());
    }

    #[test]
    fn cross_ply_has_no_shear_coupling() {
        let stiffness = laminate(&[0.0, 90.0, 90.0, 0.0])
            .stiffness()
            .expect("valid laminate");

        assert!(is_symmetric(&stiffness.a, 1.0e-12));
        assert!(is_symmetric(&stiffness.d, 1.0e-12));
        assert!(stiffness.b.amax() < 1.0e-9);
        assert!(stiffness.d[(0, 2)].abs() < 1.0e-9 * stiffness.d.amax());
        assert!(stiffness.d[(1, 2)].abs() < 1.0e-9 * stiffness.d.amax());

        assert_relative_eq!(stiffness.a[(0, 0)], 37_892.480_007, max_relative = 1.0e-9);
        assert_relative_eq!(stiffness.a[(0, 1)], 1_647.871_719, max_relative = 1.0e-9);
        assert_relative_eq!(stiffness.a[(2, 2)], 2_250.0, max_relative = 1.0e-12);
        assert_relative_eq!(stiffness.d[(0, 0)], 1_307.930_965, max_relative = 1.0e-9);
        assert_relative_eq!(stiffness.d[(1, 1)], 270.922_368, max_relative = 1.0e-8);
        assert_relative_eq!(stiffness.d[(2, 2)], 46.875, max_relative = 1.0e-12);
    }

    #[test]
    fn stiffness_blocks_are_symmetric_for_angle_ply_laminates() {
        for angles in [
            vec![45.0, -45.0],
            vec![30.0, -60.0, 10.0],
            vec![0.0, 45.0, -45.0, 90.0, 90.0, -45.0, 45.0, 0.0],
        ] {
            let stiffness = laminate(&angles).stiffness().expect("valid laminate");
            assert!(is_symmetric(&stiffness.a, 1.0e-12), "{angles:?}");
            assert!(is_symmetric(&stiffness.d, 1.0e-12), "{angles:?}");
        }
    }

    #[test]
    fn unsymmetric_laminate_couples_membrane_and_bending() {
        let stiffness = laminate(&[0.0, 90.0]).stiffness().expect("valid laminate");
        assert!(stiffness.b[(0, 0)].abs() > 1.0);
        assert_relative_eq!(stiffness.b[(0, 0)], -stiffness.b[(1, 1)], max_relative = 1.0e-12);
    }

    #[test]
    fn compliance_inverts_abd() {
        let stiffness = laminate(&[0.0, 45.0, -45.0, 90.0])
            .stiffness()
            .expect("valid laminate");
        let product = stiffness.abd() * stiffness.compliance;
        assert_relative_eq!(product, Matrix6::identity(), epsilon = 1.0e-10);
    }

    #[test]
    fn compliance_blocks_of_a_symmetric_laminate_invert_a_and_d() {
        let stiffness = laminate(&[0.0, 90.0, 90.0, 0.0])
            .stiffness()
            .expect("valid laminate");
        assert_relative_eq!(
            stiffness.a_compliance() * stiffness.a,
            Matrix3::identity(),
            epsilon = 1.0e-9
        );
        assert_relative_eq!(
            stiffness.d_compliance() * stiffness.d,
            Matrix3::identity(),
            epsilon = 1.0e-9
        );
        assert!(stiffness.b_compliance().amax() < 1.0e-12);
    }

    #[test]
    fn unidirectional_engineering_constants_recover_ply_moduli() {
        let stiffness = laminate(&[0.0, 0.0]).stiffness().expect("valid laminate");
        let constants = stiffness.engineering_constants();
        assert_relative_eq!(constants.ex, 141_000.0, max_relative = 1.0e-10);
        assert_relative_eq!(constants.ey, 9_340.0, max_relative = 1.0e-10);
        assert_relative_eq!(constants.gxy, 4_500.0, max_relative = 1.0e-10);
        assert_relative_eq!(constants.nu_xy, 0.35, max_relative = 1.0e-10);
    }

    #[test]
    fn fully_degraded_cross_ply_is_singular() {
        let degraded = cfrp().matrix_degraded();
        let laminate = laminate(&[0.0, 90.0, 90.0, 0.0]);
        let layers = laminate
            .layers(|_| Some(&degraded))
            .expect("materials resolved");
        let error = StiffnessMatrices::assemble(&layers, DEFAULT_PIVOT_TOLERANCE)
            .expect_err("no shear stiffness left");
        assert!(matches!(error, MatrixError::Singular { .. }));
    }
}

//! LaRC03 criterion for fibre-reinforced plies.
//!
//! Fibre and matrix failure are checked separately and the smaller reserve
//! factor governs. Matrix strengths are raised to their in-situ values,
//! which depend on ply thickness and on whether neighbours constrain the ply.
//! Compressive matrix failure searches the fracture-plane angle between 0°
//! and the pure-compression fracture angle `α0`. Under high fibre compression
//! the stresses are first rotated into the misaligned kink-band frame.
//!
//! Criterion parameters are read from the material:
//!
//! | parameter                     | meaning                                   | default |
//! |-------------------------------|-------------------------------------------|---------|
//! | `larc03.g_ic`                 | mode I fracture toughness, N/mm           | required |
//! | `larc03.g_iic`                | mode II fracture toughness, N/mm          | required |
//! | `larc03.alpha0`               | pure-compression fracture angle, degrees  | 53      |
//! | `larc03.thick_ply_threshold`  | thickness above which a ply is thick, mm  | 0.7     |

use std::f64::consts::{PI, SQRT_2};

use serde::Serialize;

use super::{
    linear_reserve_factor, macaulay, quadratic_reserve_factor, FailureCriterion, FailureMode,
    ReserveFactor,
};
use crate::laminate::Ply;
use crate::material::Material;
use crate::recovery::{PlyStress, StressStrainState};

/// Mode I critical energy release rate.
pub const G_IC: &str = "larc03.g_ic";
/// Mode II critical energy release rate.
pub const G_IIC: &str = "larc03.g_iic";
/// Fracture angle under pure transverse compression.
pub const ALPHA0: &str = "larc03.alpha0";
/// Thickness separating thin from thick embedded plies.
pub const THICK_PLY_THRESHOLD: &str = "larc03.thick_ply_threshold";

/// Fracture angle of most carbon/epoxy systems.
pub const DEFAULT_ALPHA0: f64 = 53.0;
/// Thickness of roughly five standard plies.
pub const DEFAULT_THICK_PLY_THRESHOLD: f64 = 0.7;

/// Matrix strengths corrected for the constraint of neighbouring plies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct InSituStrengths {
    /// In-situ transverse tensile strength `YT_is`.
    pub transverse_tension: f64,
    /// In-situ longitudinal shear strength `SL_is`.
    pub longitudinal_shear: f64,
}

/// In-situ strengths of a ply, never below the unidirectional values.
#[must_use]
pub fn in_situ_strengths(material: &Material, thickness: f64, embedded: bool) -> InSituStrengths {
    let unidirectional = InSituStrengths {
        transverse_tension: material.r_nor_tension,
        longitudinal_shear: material.r_shear,
    };
    let (Some(g_ic), Some(g_iic)) = (material.parameter(G_IC), material.parameter(G_IIC)) else {
        return unidirectional;
    };
    let threshold = material
        .parameter(THICK_PLY_THRESHOLD)
        .unwrap_or(DEFAULT_THICK_PLY_THRESHOLD);
    let nu21 = material.nu21();
    let lambda = 2.0 * (material.e_nor.recip() - nu21 * nu21 / material.e_par);
    let (transverse_tension, longitudinal_shear) = if !embedded {
        (
            1.79 * (g_ic / (PI * thickness * lambda)).sqrt(),
            (4.0 * g_iic * material.g12 / (PI * thickness)).sqrt(),
        )
    } else if thickness < threshold {
        (
            (8.0 * g_ic / (PI * thickness * lambda)).sqrt(),
            (8.0 * g_iic * material.g12 / (PI * thickness)).sqrt(),
        )
    } else {
        (
            1.12 * SQRT_2 * material.r_nor_tension,
            SQRT_2 * material.r_shear,
        )
    };
    InSituStrengths {
        transverse_tension: transverse_tension.max(unidirectional.transverse_tension),
        longitudinal_shear: longitudinal_shear.max(unidirectional.longitudinal_shear),
    }
}

/// Orientation and failure index of the critical fracture plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FracturePlane {
    /// Fracture-plane angle in degrees.
    pub angle: f64,
    /// Failure index on that plane.
    pub failure_index: f64,
}

/// Quantities shared by all failure modes of one ply.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FractureParameters {
    /// Pure-compression fracture angle in degrees.
    pub alpha0: f64,
    /// Transverse friction coefficient `ηT`.
    pub eta_t: f64,
    /// Longitudinal friction coefficient `ηL`.
    pub eta_l: f64,
    /// Transverse shear strength `ST`.
    pub transverse_shear: f64,
    /// Toughness ratio `G_Ic / G_IIc`.
    pub toughness_ratio: f64,
    /// In-situ matrix strengths.
    pub in_situ: InSituStrengths,
}

impl FractureParameters {
    /// Derive the parameters of `ply` made of `material`.
    #[must_use]
    pub fn new(material: &Material, ply: &Ply) -> Self {
        let alpha0 = material.parameter(ALPHA0).unwrap_or(DEFAULT_ALPHA0);
        let (sin, cos) = alpha0.to_radians().sin_cos();
        let tan_2a = (2.0 * alpha0).to_radians().tan();
        let cos_2a = (2.0 * alpha0).to_radians().cos();
        let yc = material.r_nor_compression;
        let toughness_ratio = match (material.parameter(G_IC), material.parameter(G_IIC)) {
            (Some(g_ic), Some(g_iic)) => g_ic / g_iic,
            _ => 1.0,
        };
        Self {
            alpha0,
            eta_t: -tan_2a.recip(),
            eta_l: -material.r_shear * cos_2a / (yc * cos * cos),
            transverse_shear: yc * cos * (sin + cos / tan_2a),
            toughness_ratio,
            in_situ: in_situ_strengths(material, ply.thickness, ply.embedded),
        }
    }

    /// Failure index on the plane at `angle` degrees.
    #[must_use]
    pub fn failure_index(&self, angle: f64, s22: f64, t12: f64) -> f64 {
        let (sin, cos) = angle.to_radians().sin_cos();
        let tau_t = macaulay(-s22 * cos * (sin - self.eta_t * cos));
        let tau_l = macaulay(cos * (t12.abs() + self.eta_l * s22 * cos));
        (tau_t / self.transverse_shear).powi(2) + (tau_l / self.in_situ.longitudinal_shear).powi(2)
    }

    /// Search the fracture plane between 0° and `α0` in whole degrees.
    ///
    /// `α0` itself is always evaluated. On equal failure indices the larger
    /// angle is kept.
    #[must_use]
    pub fn critical_plane(&self, s22: f64, t12: f64) -> FracturePlane {
        search_angles(self.alpha0).fold(
            FracturePlane {
                angle: 0.0,
                failure_index: 0.0,
            },
            |critical, angle| {
                let failure_index = self.failure_index(angle, s22, t12);
                if failure_index >= critical.failure_index {
                    FracturePlane {
                        angle,
                        failure_index,
                    }
                } else {
                    critical
                }
            },
        )
    }

    /// Reserve factor of the mixed-mode matrix tension interaction.
    fn matrix_tension(&self, s22: f64, t12: f64) -> f64 {
        let a = s22 / self.in_situ.transverse_tension;
        let b = t12 / self.in_situ.longitudinal_shear;
        let g = self.toughness_ratio;
        quadratic_reserve_factor((1.0 - g) * a, g * a * a + b * b)
    }

    /// Initial fibre misalignment under pure axial compression, in radians.
    fn kink_angle(&self, xc: f64) -> f64 {
        let ratio = self.in_situ.longitudinal_shear / xc;
        let sum = ratio + self.eta_l;
        let angle = ((1.0 - (1.0 - 4.0 * sum * ratio).sqrt()) / (2.0 * sum)).atan();
        if angle.is_finite() {
            angle
        } else {
            0.0
        }
    }

    /// Stresses in the misaligned kink-band frame.
    fn kink_frame(&self, material: &Material, stress: &PlyStress) -> PlyStress {
        let phi_c = self.kink_angle(material.r_par_compression);
        let shear = stress.t12.abs();
        let phi = (shear + (material.g12 - material.r_par_compression) * phi_c)
            / (material.g12 + stress.s11 - stress.s22);
        let phi = if phi.is_finite() { phi } else { phi_c };
        let (sin, cos) = phi.sin_cos();
        PlyStress::new(
            stress.s11 * cos * cos + stress.s22 * sin * sin + 2.0 * shear * sin * cos,
            stress.s11 * sin * sin + stress.s22 * cos * cos - 2.0 * shear * sin * cos,
            -(stress.s11 - stress.s22) * sin * cos + shear * (cos * cos - sin * sin),
        )
    }
}

/// Angles visited by the fracture-plane search.
fn search_angles(alpha0: f64) -> impl Iterator<Item = f64> {
    let alpha0 = alpha0.clamp(0.0, 90.0);
    let whole = alpha0.floor();
    let tail = (alpha0 > whole).then_some(alpha0);
    (0..=whole as u32).map(f64::from).chain(tail)
}

/// The LaRC03 criterion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Larc03;

impl Larc03 {
    /// Fibre-dominated failure.
    fn fiber(
        material: &Material,
        parameters: &FractureParameters,
        stress: &PlyStress,
    ) -> ReserveFactor {
        if stress.s11 >= 0.0 {
            return ReserveFactor::new(
                linear_reserve_factor(stress.s11 / material.r_par_tension),
                FailureMode::Fiber,
                "fiber tension",
            );
        }
        let kink = parameters.kink_frame(material, stress);
        if kink.s22 < 0.0 {
            let index = macaulay(
                (kink.t12.abs() + parameters.eta_l * kink.s22)
                    / parameters.in_situ.longitudinal_shear,
            );
            ReserveFactor::new(
                linear_reserve_factor(index),
                FailureMode::Fiber,
                "fiber kinking",
            )
        } else {
            ReserveFactor::new(
                parameters.matrix_tension(kink.s22, kink.t12),
                FailureMode::Fiber,
                "fiber kinking with matrix tension",
            )
        }
    }

    /// Matrix-dominated failure.
    fn matrix(
        material: &Material,
        parameters: &FractureParameters,
        stress: &PlyStress,
    ) -> ReserveFactor {
        if stress.s22 >= 0.0 {
            return ReserveFactor::new(
                parameters.matrix_tension(stress.s22, stress.t12),
                FailureMode::Matrix,
                "matrix tension",
            );
        }
        let (plane, label) = if stress.s11 >= -material.r_nor_compression {
            (
                parameters.critical_plane(stress.s22, stress.t12),
                "matrix compression",
            )
        } else {
            let kink = parameters.kink_frame(material, stress);
            if kink.s22 >= 0.0 {
                return ReserveFactor::new(
                    parameters.matrix_tension(kink.s22, kink.t12),
                    FailureMode::Matrix,
                    "matrix tension in kink band",
                );
            }
            (
                parameters.critical_plane(kink.s22, kink.t12),
                "matrix compression in kink band",
            )
        };
        let value = if plane.failure_index > 0.0 {
            plane.failure_index.sqrt().recip()
        } else {
            f64::INFINITY
        };
        ReserveFactor::new(value, FailureMode::Matrix, label).with_fracture_angle(plane.angle)
    }
}

impl FailureCriterion for Larc03 {
    fn name(&self) -> &'static str {
        "LaRC03"
    }

    fn evaluate(
        &self,
        material: &Material,
        ply: &Ply,
        state: &StressStrainState,
    ) -> ReserveFactor {
        let stress = &state.stress;
        if stress.is_zero() {
            return ReserveFactor::no_failure();
        }
        let parameters = FractureParameters::new(material, ply);
        let fiber = Self::fiber(material, &parameters, stress);
        fiber.min(Self::matrix(material, &parameters, stress))
    }

    fn missing_parameter(&self, material: &Material) -> Option<&'static str> {
        [G_IC, G_IIC]
            .into_iter()
            .find(|name| material.parameter(name).is_none())
    }
}

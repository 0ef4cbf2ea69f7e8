//! Quadratic interaction criteria of the Tsai family.
//!
//! The failure index is a polynomial `Q + L` of the stress, where
//! `Q = F11σ1² + 2F12σ1σ2 + F22σ2² + F66τ12²` and `L = F1σ1 + F2σ2`. Scaling
//! the stress by the reserve factor `r` turns the envelope into
//! `Q·r² + L·r = 1`.

use super::{quadratic_reserve_factor, FailureCriterion, FailureMode, ReserveFactor};
use crate::laminate::Ply;
use crate::material::Material;
use crate::recovery::{PlyStress, StressStrainState};

/// Material parameter holding the normalised Tsai-Wu interaction `f12*`.
pub const F12_STAR: &str = "tsai_wu.f12_star";

/// Interaction used when the material does not define [`F12_STAR`].
pub const DEFAULT_F12_STAR: f64 = -0.5;

/// Strength tensor coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
struct StrengthTensor {
    /// Linear fibre-direction coefficient.
    f1: f64,
    /// Linear transverse coefficient.
    f2: f64,
    /// Quadratic fibre-direction coefficient.
    f11: f64,
    /// Quadratic transverse coefficient.
    f22: f64,
    /// Quadratic shear coefficient.
    f66: f64,
    /// Interaction coefficient.
    f12: f64,
}

impl StrengthTensor {
    /// Coefficients shared by Tsai-Wu and Hoffman, with the interaction left open.
    fn from_strengths(material: &Material, f12: impl FnOnce(f64, f64) -> f64) -> Self {
        let (xt, xc) = (material.r_par_tension, material.r_par_compression);
        let (yt, yc) = (material.r_nor_tension, material.r_nor_compression);
        let f11 = (xt * xc).recip();
        let f22 = (yt * yc).recip();
        Self {
            f1: xt.recip() - xc.recip(),
            f2: yt.recip() - yc.recip(),
            f11,
            f22,
            f66: material.r_shear.powi(2).recip(),
            f12: f12(f11, f22),
        }
    }

    /// Reserve factor of `stress` against the envelope.
    fn reserve_factor(&self, stress: &PlyStress) -> f64 {
        let PlyStress { s11, s22, t12 } = *stress;
        let quadratic = self.f11 * s11 * s11
            + 2.0 * self.f12 * s11 * s22
            + self.f22 * s22 * s22
            + self.f66 * t12 * t12;
        let linear = self.f1 * s11 + self.f2 * s22;
        quadratic_reserve_factor(linear, quadratic)
    }
}

/// Strengths acting against the signs of the normal stresses.
fn directional_strengths(material: &Material, stress: &PlyStress) -> (f64, f64) {
    let x = if stress.s11 >= 0.0 {
        material.r_par_tension
    } else {
        material.r_par_compression
    };
    let y = if stress.s22 >= 0.0 {
        material.r_nor_tension
    } else {
        material.r_nor_compression
    };
    (x, y)
}

/// Mode of the stress component closest to its own strength.
///
/// Fibre failure is reported when the fibre-direction exposure is at least as
/// large as both matrix exposures.
pub(crate) fn dominant_mode(material: &Material, stress: &PlyStress) -> FailureMode {
    let (x, y) = directional_strengths(material, stress);
    let fiber = stress.s11.abs() / x;
    let matrix = (stress.s22.abs() / y).max(stress.t12.abs() / material.r_shear);
    if fiber >= matrix {
        FailureMode::Fiber
    } else {
        FailureMode::Matrix
    }
}

/// Reserve factor with the mode and label derived from the stress.
fn classified(value: f64, material: &Material, stress: &PlyStress) -> ReserveFactor {
    match dominant_mode(material, stress) {
        FailureMode::Fiber => ReserveFactor::new(value, FailureMode::Fiber, "fiber failure"),
        _ => ReserveFactor::new(value, FailureMode::Matrix, "matrix failure"),
    }
}

/// Tsai-Wu criterion with `F12 = f12*·sqrt(F11·F22)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TsaiWu;

impl FailureCriterion for TsaiWu {
    fn name(&self) -> &'static str {
        "Tsai-Wu"
    }

    fn evaluate(
        &self,
        material: &Material,
        _ply: &Ply,
        state: &StressStrainState,
    ) -> ReserveFactor {
        let stress = &state.stress;
        if stress.is_zero() {
            return ReserveFactor::no_failure();
        }
        let f12_star = material.parameter(F12_STAR).unwrap_or(DEFAULT_F12_STAR);
        let tensor =
            StrengthTensor::from_strengths(material, |f11, f22| f12_star * (f11 * f22).sqrt());
        classified(tensor.reserve_factor(stress), material, stress)
    }
}

/// Hoffman criterion, `F12 = -1/(2·Xt·Xc)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hoffman;

impl FailureCriterion for Hoffman {
    fn name(&self) -> &'static str {
        "Hoffman"
    }

    fn evaluate(
        &self,
        material: &Material,
        _ply: &Ply,
        state: &StressStrainState,
    ) -> ReserveFactor {
        let stress = &state.stress;
        if stress.is_zero() {
            return ReserveFactor::no_failure();
        }
        let tensor = StrengthTensor::from_strengths(material, |f11, _| -0.5 * f11);
        classified(tensor.reserve_factor(stress), material, stress)
    }
}

/// Tsai-Hill criterion with strengths chosen by the sign of each normal stress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TsaiHill;

impl FailureCriterion for TsaiHill {
    fn name(&self) -> &'static str {
        "Tsai-Hill"
    }

    fn evaluate(
        &self,
        material: &Material,
        _ply: &Ply,
        state: &StressStrainState,
    ) -> ReserveFactor {
        let stress = &state.stress;
        if stress.is_zero() {
            return ReserveFactor::no_failure();
        }
        let (x, y) = directional_strengths(material, stress);
        let PlyStress { s11, s22, t12 } = *stress;
        let quadratic = (s11 / x).powi(2) - s11 * s22 / (x * x)
            + (s22 / y).powi(2)
            + (t12 / material.r_shear).powi(2);
        classified(quadratic_reserve_factor(0.0, quadratic), material, stress)
    }
}

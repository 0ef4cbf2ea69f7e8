//! Maximum-stress criterion.

use super::{FailureCriterion, FailureMode, ReserveFactor};
use crate::laminate::Ply;
use crate::material::Material;
use crate::recovery::StressStrainState;

/// Each stress component checked against its own strength, without interaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaxStress;

impl FailureCriterion for MaxStress {
    fn name(&self) -> &'static str {
        "Max stress"
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
        let (fiber_strength, fiber_label) = if stress.s11 >= 0.0 {
            (material.r_par_tension, "fiber tension")
        } else {
            (material.r_par_compression, "fiber compression")
        };
        let (transverse_strength, transverse_label) = if stress.s22 >= 0.0 {
            (material.r_nor_tension, "matrix tension")
        } else {
            (material.r_nor_compression, "matrix compression")
        };
        let fiber = ReserveFactor::new(
            fiber_strength / stress.s11.abs(),
            FailureMode::Fiber,
            fiber_label,
        );
        let transverse = ReserveFactor::new(
            transverse_strength / stress.s22.abs(),
            FailureMode::Matrix,
            transverse_label,
        );
        let shear = ReserveFactor::new(
            material.r_shear / stress.t12.abs(),
            FailureMode::Matrix,
            "matrix shear",
        );
        fiber.min(transverse).min(shear)
    }
}

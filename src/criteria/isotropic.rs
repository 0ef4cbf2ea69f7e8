//! Yield criteria for isotropic metals.
//!
//! Both criteria read the strength from `r_par_tension`. They are only
//! meaningful for materials that pass [`Material::is_isotropic`]; the
//! degradation engine reports a warning otherwise and evaluates anyway.

use super::{linear_reserve_factor, FailureCriterion, FailureMode, ReserveFactor};
use crate::laminate::Ply;
use crate::material::Material;
use crate::recovery::{PlyStress, StressStrainState};

/// In-plane principal stresses, larger first.
#[must_use]
pub fn principal_stresses(stress: &PlyStress) -> (f64, f64) {
    let centre = 0.5 * (stress.s11 + stress.s22);
    let radius = (0.5 * (stress.s11 - stress.s22)).hypot(stress.t12);
    (centre + radius, centre - radius)
}

/// Maximum shear stress criterion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tresca;

impl FailureCriterion for Tresca {
    fn name(&self) -> &'static str {
        "Tresca"
    }

    fn evaluate(
        &self,
        material: &Material,
        _ply: &Ply,
        state: &StressStrainState,
    ) -> ReserveFactor {
        if state.stress.is_zero() {
            return ReserveFactor::no_failure();
        }
        let (major, minor) = principal_stresses(&state.stress);
        let equivalent = major.abs().max(minor.abs()).max((major - minor).abs());
        ReserveFactor::new(
            linear_reserve_factor(equivalent / material.r_par_tension),
            FailureMode::General,
            "yield",
        )
    }

    fn requires_isotropy(&self) -> bool {
        true
    }
}

/// Distortion energy criterion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VonMises;

impl FailureCriterion for VonMises {
    fn name(&self) -> &'static str {
        "von Mises"
    }

    fn evaluate(
        &self,
        material: &Material,
        _ply: &Ply,
        state: &StressStrainState,
    ) -> ReserveFactor {
        let PlyStress { s11, s22, t12 } = state.stress;
        let equivalent_squared = s11 * s11 + s22 * s22 - s11 * s22 + 3.0 * t12 * t12;
        if equivalent_squared <= 0.0 {
            return ReserveFactor::no_failure();
        }
        let strength = material.r_par_tension;
        ReserveFactor::new(
            (strength * strength / equivalent_squared).sqrt(),
            FailureMode::General,
            "yield",
        )
    }

    fn requires_isotropy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::material::MaterialId;

    fn evaluate(criterion: &dyn FailureCriterion, s11: f64, s22: f64, t12: f64) -> ReserveFactor {
        let steel = Material::isotropic("steel", 210_000.0, 0.3, 200.0);
        let ply = Ply::new(MaterialId(0), 1.0, 0.0);
        let state = StressStrainState::from_stress(PlyStress::new(s11, s22, t12));
        criterion.evaluate(&steel, &ply, &state)
    }

    #[test]
    fn uniaxial_tension_uses_the_strength_directly() {
        let tresca = evaluate(&Tresca, 100.0, 0.0, 0.0);
        assert_relative_eq!(tresca.value, 2.0);
        assert_eq!(tresca.mode, FailureMode::General);
        let mises = evaluate(&VonMises, 100.0, 0.0, 0.0);
        assert_relative_eq!(mises.value, 2.0);
    }

    #[test]
    fn pure_shear_separates_the_criteria() {
        let tresca = evaluate(&Tresca, 0.0, 0.0, 50.0);
        assert_relative_eq!(tresca.value, 2.0, max_relative = 1.0e-12);
        let mises = evaluate(&VonMises, 0.0, 0.0, 50.0);
        assert_relative_eq!(mises.value, 4.0 / 3.0_f64.sqrt(), max_relative = 1.0e-12);
    }

    #[test]
    fn opposite_principal_stresses_use_their_difference() {
        let tresca = evaluate(&Tresca, 80.0, -20.0, 0.0);
        assert_relative_eq!(tresca.value, 2.0, max_relative = 1.0e-12);
    }

    #[test]
    fn principal_stresses_follow_mohr_circle() {
        let (major, minor) = principal_stresses(&PlyStress::new(50.0, -30.0, 30.0));
        assert_relative_eq!(major, 60.0, max_relative = 1.0e-12);
        assert_relative_eq!(minor, -40.0, max_relative = 1.0e-12);
    }
}

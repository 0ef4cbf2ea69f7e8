//! Ply failure criteria.
//!
//! Every criterion turns the local stress state of one ply face into a
//! [`ReserveFactor`]: the multiplier on the applied load at which the
//! criterion predicts failure. A stress-free state always yields an infinite
//! reserve factor.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::laminate::Ply;
use crate::material::Material;
use crate::recovery::StressStrainState;

pub mod isotropic;
pub mod larc03;
pub mod max_stress;
pub mod quadratic;

pub use isotropic::{Tresca, VonMises};
pub use larc03::Larc03;
pub use max_stress::MaxStress;
pub use quadratic::{Hoffman, TsaiHill, TsaiWu};

/// Physical mechanism predicted to cause failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Fibre rupture or kinking; ends the load-carrying capability of the ply.
    Fiber,
    /// Matrix cracking; the ply keeps its fibre stiffness.
    Matrix,
    /// Failure of a material without a fibre direction.
    General,
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Fiber => "fiber",
            Self::Matrix => "matrix",
            Self::General => "general",
        };
        f.write_str(text)
    }
}

/// Result of one criterion evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReserveFactor {
    /// Load multiplier at failure; infinite when no failure is possible.
    pub value: f64,
    /// Predicted failure mechanism.
    pub mode: FailureMode,
    /// Short description of the governing sub-mode.
    pub label: &'static str,
    /// Critical fracture-plane angle in degrees, for criteria that search one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fracture_angle: Option<f64>,
}

impl ReserveFactor {
    /// Create a reserve factor without a fracture plane.
    #[must_use]
    pub const fn new(value: f64, mode: FailureMode, label: &'static str) -> Self {
        Self {
            value,
            mode,
            label,
            fracture_angle: None,
        }
    }

    /// Reserve factor of a stress-free state.
    #[must_use]
    pub const fn no_failure() -> Self {
        Self::new(f64::INFINITY, FailureMode::General, "no failure")
    }

    /// Attach the critical fracture-plane angle.
    #[must_use]
    pub const fn with_fracture_angle(mut self, angle: f64) -> Self {
        self.fracture_angle = Some(angle);
        self
    }

    /// Whether the criterion predicts that failure can occur at all.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }

    /// The smaller of two reserve factors, keeping `self` on ties.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        if other.value < self.value {
            other
        } else {
            self
        }
    }
}

/// Common contract of all ply failure criteria.
pub trait FailureCriterion {
    /// Display name of the criterion.
    fn name(&self) -> &'static str;

    /// Reserve factor of `ply` (made of `material`) in the given local state.
    fn evaluate(&self, material: &Material, ply: &Ply, state: &StressStrainState) -> ReserveFactor;

    /// Name of a material parameter the criterion needs but `material` lacks.
    fn missing_parameter(&self, _material: &Material) -> Option<&'static str> {
        None
    }

    /// Whether the criterion is only meaningful for isotropic materials.
    fn requires_isotropy(&self) -> bool {
        false
    }
}

/// Failure criterion assigned to a ply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// Tsai-Wu quadratic interaction.
    #[default]
    TsaiWu,
    /// Hoffman quadratic interaction.
    Hoffman,
    /// Tsai-Hill quadratic interaction.
    TsaiHill,
    /// Independent limits per stress component.
    MaxStress,
    /// LaRC03 with fracture-plane search and in-situ strengths.
    Larc03,
    /// Maximum shear stress.
    Tresca,
    /// Distortion energy.
    VonMises,
}

impl Criterion {
    /// Every available criterion.
    pub const ALL: [Self; 7] = [
        Self::TsaiWu,
        Self::Hoffman,
        Self::TsaiHill,
        Self::MaxStress,
        Self::Larc03,
        Self::Tresca,
        Self::VonMises,
    ];

    /// Implementation behind the tag.
    fn implementation(self) -> &'static dyn FailureCriterion {
        match self {
            Self::TsaiWu => &TsaiWu,
            Self::Hoffman => &Hoffman,
            Self::TsaiHill => &TsaiHill,
            Self::MaxStress => &MaxStress,
            Self::Larc03 => &Larc03,
            Self::Tresca => &Tresca,
            Self::VonMises => &VonMises,
        }
    }
}

impl FailureCriterion for Criterion {
    fn name(&self) -> &'static str {
        self.implementation().name()
    }

    fn evaluate(
        &self,
        material: &Material,
        ply: &Ply,
        state: &StressStrainState,
    ) -> ReserveFactor {
        self.implementation().evaluate(material, ply, state)
    }

    fn missing_parameter(&self, material: &Material) -> Option<&'static str> {
        self.implementation().missing_parameter(material)
    }

    fn requires_isotropy(&self) -> bool {
        self.implementation().requires_isotropy()
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Smallest positive root `r` of `quadratic·r² + linear·r = 1`.
///
/// Without a real positive root the envelope is never reached and the
/// reserve factor is infinite.
#[must_use]
pub fn quadratic_reserve_factor(linear: f64, quadratic: f64) -> f64 {
    if quadratic == 0.0 {
        return linear_reserve_factor(linear);
    }
    let discriminant = linear.mul_add(linear, 4.0 * quadratic);
    if discriminant < 0.0 || (quadratic < 0.0 && linear <= 0.0) {
        return f64::INFINITY;
    }
    let root = discriminant.sqrt();
    if linear >= 0.0 {
        // Equal to (root - linear) / (2 quadratic) without the cancellation.
        2.0 / (root + linear)
    } else {
        (root - linear) / (2.0 * quadratic)
    }
}

/// Reserve factor of a failure index that scales linearly with the load.
pub(crate) fn linear_reserve_factor(index: f64) -> f64 {
    if index > 0.0 {
        index.recip()
    } else {
        f64::INFINITY
    }
}

/// Macaulay bracket.
pub(crate) fn macaulay(value: f64) -> f64 {
    value.max(0.0)
}

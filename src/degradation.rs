//! Progressive ply degradation.
//!
//! Each iteration recovers the ply states under the current stiffness,
//! evaluates every ply and records the result. Plies that fail in matrix mode
//! together with the governing ply lose their transverse and shear stiffness,
//! and the laminate stiffness is rebuilt. The run ends at fibre failure, when
//! the stiffness becomes singular, or when nothing is left to degrade.
//!
//! The controlling (last-ply) result is the iteration with the largest
//! governing reserve factor, which is not necessarily the final one.

use std::borrow::Cow;
use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{AnalysisConfig, AnalysisMode};
use crate::criteria::{FailureCriterion, FailureMode, ReserveFactor};
use crate::errors::{AnalysisError, AnalysisWarning, LaminateError, MatrixError};
use crate::laminate::{Laminate, StackedPly};
use crate::loads::LoadState;
use crate::material::Material;
use crate::recovery::{recover, PlyStates};
use crate::stiffness::{Layer, StiffnessMatrices};

/// Failure flags of one analysis run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DegradationState {
    /// Matrix-failed flag per effective ply.
    matrix_failed: Vec<bool>,
    /// Set once a ply fails in fibre or general mode.
    fiber_failed: bool,
}

impl DegradationState {
    /// Undamaged state of a stack with `plies` effective plies.
    #[must_use]
    pub fn new(plies: usize) -> Self {
        Self {
            matrix_failed: vec![false; plies],
            fiber_failed: false,
        }
    }

    /// Whether ply `index` has failed in matrix mode.
    #[must_use]
    pub fn is_matrix_failed(&self, index: usize) -> bool {
        self.matrix_failed.get(index).copied().unwrap_or(false)
    }

    /// Flag ply `index` as matrix-failed, returning whether it was intact.
    pub fn mark_matrix_failed(&mut self, index: usize) -> bool {
        match self.matrix_failed.get_mut(index) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }

    /// Whether the laminate has lost its fibre load path.
    #[must_use]
    pub fn is_fiber_failed(&self) -> bool {
        self.fiber_failed
    }

    /// Flag terminal fibre failure.
    pub fn mark_fiber_failed(&mut self) {
        self.fiber_failed = true;
    }

    /// Number of matrix-failed plies.
    #[must_use]
    pub fn matrix_failed_count(&self) -> usize {
        self.matrix_failed.iter().filter(|flag| **flag).count()
    }
}

/// Evaluation of one ply within an iteration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlyResult {
    /// Position in the effective stack.
    pub index: usize,
    /// Listed ply the entry was created from.
    pub source: usize,
    /// Fibre angle in degrees.
    pub angle: f64,
    /// Whether the ply was already matrix-failed when evaluated.
    pub matrix_failed: bool,
    /// Local states at both faces.
    pub states: PlyStates,
    /// Reserve factor at the top face.
    pub top: ReserveFactor,
    /// Reserve factor at the bottom face.
    pub bottom: ReserveFactor,
}

impl PlyResult {
    /// The lower of the two face reserve factors, the top face on ties.
    #[must_use]
    pub fn reserve_factor(&self) -> ReserveFactor {
        self.top.min(self.bottom)
    }
}

/// Snapshot of one degradation step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IterationResult {
    /// Zero-based iteration number.
    pub iteration: usize,
    /// Effective index of the ply with the lowest reserve factor.
    pub governing_ply: usize,
    /// Reserve factor of the governing ply.
    pub reserve_factor: ReserveFactor,
    /// Every ply of the stack.
    pub plies: Vec<PlyResult>,
}

impl IterationResult {
    /// Failure mode of the governing ply.
    #[must_use]
    pub fn mode(&self) -> FailureMode {
        self.reserve_factor.mode
    }
}

/// Why the analysis stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// First-ply analysis, stopped after one evaluation.
    FirstPly,
    /// The load cannot cause failure.
    NoFailure,
    /// A governing ply failed in fibre or general mode.
    FiberFailure,
    /// The degraded laminate stiffness is singular.
    StiffnessDegenerate,
    /// No ply could be degraded further.
    Stagnated,
    /// The iteration cap was reached.
    IterationLimit,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FirstPly => "first ply failure",
            Self::NoFailure => "no failure possible",
            Self::FiberFailure => "fiber failure",
            Self::StiffnessDegenerate => "stiffness degenerate",
            Self::Stagnated => "no further degradation",
            Self::IterationLimit => "iteration limit reached",
        };
        f.write_str(text)
    }
}

/// Complete result of one load case.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    /// Every evaluation in order; never empty.
    pub iterations: Vec<IterationResult>,
    /// Index of the controlling iteration within `iterations`.
    pub governing: usize,
    /// Reason the analysis stopped.
    pub termination: Termination,
    /// Usage warnings raised while setting up the run.
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisOutcome {
    /// The controlling iteration, the one with the largest reserve factor.
    #[must_use]
    pub fn governing(&self) -> &IterationResult {
        &self.iterations[self.governing]
    }

    /// Reserve factor of the controlling iteration.
    #[must_use]
    pub fn reserve_factor(&self) -> ReserveFactor {
        self.governing().reserve_factor
    }

    /// The evaluation of the undamaged laminate.
    #[must_use]
    pub fn first_ply(&self) -> &IterationResult {
        &self.iterations[0]
    }

    /// Governing reserve factor of each iteration.
    #[must_use]
    pub fn history(&self) -> Vec<f64> {
        self.iterations
            .iter()
            .map(|iteration| iteration.reserve_factor.value)
            .collect()
    }
}

/// Run a first-ply or last-ply analysis of one load case.
///
/// The laminate and its material library are never modified; degraded plies
/// use private copies of their materials.
///
/// # Errors
///
/// Returns [`AnalysisError::Configuration`] when the laminate is invalid and
/// [`AnalysisError::SingularStiffness`] when the undamaged stiffness cannot be
/// inverted.
///
/// # Examples
/// ```
/// use laminax::{
///     analyze, AnalysisConfig, Laminate, LoadState, Material, MaterialLibrary, Ply,
/// };
///
/// let mut materials = MaterialLibrary::new();
/// let cfrp = materials.add(Material::orthotropic(
///     "CFRP",
///     [141_000.0, 9_340.0, 0.35, 4_500.0],
///     [2_000.0, 1_200.0, 50.0, 200.0, 80.0],
/// ));
/// let mut laminate = Laminate::new(materials);
/// for angle in [0.0, 90.0, 90.0, 0.0] {
///     laminate.add_ply(Ply::new(cfrp, 0.125, angle));
/// }
///
/// let load = LoadState::forces(100.0, 0.0, 0.0);
/// let outcome = analyze(&laminate, &load, &AnalysisConfig::default()).expect("valid laminate");
/// assert!(outcome.reserve_factor().value > outcome.first_ply().reserve_factor.value);
/// ```
pub fn analyze(
    laminate: &Laminate,
    load: &LoadState,
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome, AnalysisError> {
    laminate.validate()?;
    let warnings = isotropy_warnings(laminate);
    for warning in &warnings {
        warn!(%warning, "criterion used outside its range of validity");
    }

    let stack = laminate.stack();
    let pristine = stack
        .iter()
        .map(|stacked| {
            laminate
                .material_of(stacked.ply)
                .ok_or(LaminateError::UnknownMaterial {
                    ply: stacked.source,
                    material: stacked.ply.material,
                })
        })
        .collect::<Result<Vec<&Material>, _>>()?;
    let mut working: Vec<Cow<'_, Material>> =
        pristine.iter().map(|material| Cow::Borrowed(*material)).collect();
    let mut state = DegradationState::new(stack.len());
    let limit = config.iteration_limit(stack.len());
    let mut iterations: Vec<IterationResult> = Vec::new();

    let termination = loop {
        let evaluation = evaluate(
            iterations.len(),
            &stack,
            &pristine,
            &working,
            &state,
            load,
            config.pivot_tolerance,
        );
        let iteration = match evaluation {
            Ok(iteration) => iteration,
            Err(source) if iterations.is_empty() => {
                return Err(AnalysisError::SingularStiffness(source));
            }
            Err(source) => {
                debug!(
                    %source,
                    failed = state.matrix_failed_count(),
                    "degraded stiffness is singular"
                );
                break Termination::StiffnessDegenerate;
            }
        };
        debug!(
            iteration = iteration.iteration,
            ply = iteration.governing_ply,
            reserve_factor = iteration.reserve_factor.value,
            mode = %iteration.mode(),
            "evaluated laminate"
        );
        let governing = iteration.reserve_factor;
        let threshold = governing.value * (1.0 + config.simultaneous_failure_tolerance);
        let failing: Vec<(usize, FailureMode)> = iteration
            .plies
            .iter()
            .map(|ply| (ply.index, ply.reserve_factor()))
            .filter(|(_, rf)| rf.value <= threshold)
            .map(|(index, rf)| (index, rf.mode))
            .collect();
        iterations.push(iteration);

        if config.mode == AnalysisMode::FirstPly {
            break Termination::FirstPly;
        }
        if !governing.is_finite() {
            break Termination::NoFailure;
        }

        let mut degraded = 0;
        for (index, mode) in failing {
            match mode {
                FailureMode::Matrix => {
                    if state.mark_matrix_failed(index) {
                        working[index] = Cow::Owned(pristine[index].matrix_degraded());
                        degraded += 1;
                    }
                }
                FailureMode::Fiber | FailureMode::General => state.mark_fiber_failed(),
            }
        }
        if state.is_fiber_failed() {
            break Termination::FiberFailure;
        }
        if degraded == 0 {
            break Termination::Stagnated;
        }
        if iterations.len() >= limit {
            break Termination::IterationLimit;
        }
    };

    let governing = controlling_iteration(&iterations);
    let outcome = AnalysisOutcome {
        iterations,
        governing,
        termination,
        warnings,
    };
    info!(
        %termination,
        reserve_factor = outcome.reserve_factor().value,
        iterations = outcome.iterations.len(),
        "analysis finished"
    );
    Ok(outcome)
}

/// Analyse independent load cases in parallel.
///
/// Results keep the order of `loads`.
#[must_use]
pub fn analyze_load_cases(
    laminate: &Laminate,
    loads: &[LoadState],
    config: &AnalysisConfig,
) -> Vec<Result<AnalysisOutcome, AnalysisError>> {
    loads
        .par_iter()
        .map(|load| analyze(laminate, load, config))
        .collect()
}

/// Isotropic-only criteria assigned to materials that fail the isotropy check.
fn isotropy_warnings(laminate: &Laminate) -> Vec<AnalysisWarning> {
    laminate
        .plies
        .iter()
        .enumerate()
        .filter(|(_, ply)| ply.criterion.requires_isotropy())
        .filter(|(_, ply)| laminate.materials.is_isotropic(ply.material) == Some(false))
        .filter_map(|(index, ply)| {
            laminate
                .material_of(ply)
                .map(|material| AnalysisWarning::NonIsotropicMaterial {
                    ply: index,
                    material: material.name.clone(),
                    criterion: ply.criterion.name(),
                })
        })
        .collect()
}

/// Build the stiffness from the working materials and evaluate every ply.
///
/// Criteria always see the pristine material; only the stiffness uses the
/// degraded copies.
fn evaluate(
    number: usize,
    stack: &[StackedPly<'_>],
    pristine: &[&Material],
    working: &[Cow<'_, Material>],
    state: &DegradationState,
    load: &LoadState,
    pivot_tolerance: f64,
) -> Result<IterationResult, MatrixError> {
    let layers: Vec<Layer<'_>> = stack
        .iter()
        .zip(working)
        .map(|(stacked, material)| Layer::new(material, stacked))
        .collect();
    let stiffness = StiffnessMatrices::assemble(&layers, pivot_tolerance)?;
    let plies: Vec<PlyResult> = recover(&layers, &stiffness, load)
        .into_iter()
        .zip(stack.iter().zip(pristine))
        .map(|(states, (stacked, material))| {
            let criterion = stacked.ply.criterion;
            PlyResult {
                index: stacked.index,
                source: stacked.source,
                angle: stacked.ply.angle,
                matrix_failed: state.is_matrix_failed(stacked.index),
                states,
                top: criterion.evaluate(material, stacked.ply, &states.top),
                bottom: criterion.evaluate(material, stacked.ply, &states.bottom),
            }
        })
        .collect();

    let mut governing = 0;
    for (index, ply) in plies.iter().enumerate() {
        if ply.reserve_factor().value < plies[governing].reserve_factor().value {
            governing = index;
        }
    }
    let reserve_factor = plies
        .get(governing)
        .map_or_else(ReserveFactor::no_failure, PlyResult::reserve_factor);
    Ok(IterationResult {
        iteration: number,
        governing_ply: governing,
        reserve_factor,
        plies,
    })
}

/// Iteration with the largest governing reserve factor, the first on ties.
fn controlling_iteration(iterations: &[IterationResult]) -> usize {
    let mut governing = 0;
    for (index, iteration) in iterations.iter().enumerate() {
        if iteration.reserve_factor.value > iterations[governing].reserve_factor.value {
            governing = index;
        }
    }
    governing
}

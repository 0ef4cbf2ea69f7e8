//! Analysis configuration.
//!
//! Parameters that control the progressive degradation run: stopping after
//! the first ply or continuing to last-ply failure, the tolerance that groups
//! simultaneously failing plies, and the singular-pivot threshold.

use serde::{Deserialize, Serialize};

use crate::matrix::DEFAULT_PIVOT_TOLERANCE;

/// Which failure load the analysis determines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Stop after evaluating the undamaged laminate.
    FirstPly,
    /// Degrade failed plies until the laminate can no longer carry load.
    #[default]
    LastPly,
}

/// Configuration for [`crate::analyze`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// First-ply or last-ply analysis.
    pub mode: AnalysisMode,

    /// Relative band `ε` within which plies fail together with the governing one.
    /// A ply fails in the same step when `RF_ply <= RF_gov·(1 + ε)`.
    pub simultaneous_failure_tolerance: f64,

    /// Relative pivot threshold of the ABD inversion.
    pub pivot_tolerance: f64,

    /// Maximum number of evaluations. `None` allows one per effective ply plus one.
    pub max_iterations: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::LastPly,
            simultaneous_failure_tolerance: 1.0e-6,
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
            max_iterations: None,
        }
    }
}

impl AnalysisConfig {
    /// Creates a config that evaluates the undamaged laminate only.
    #[must_use]
    pub fn first_ply() -> Self {
        Self {
            mode: AnalysisMode::FirstPly,
            ..Default::default()
        }
    }

    /// Creates a config that runs the full degradation sequence.
    #[must_use]
    pub fn last_ply() -> Self {
        Self::default()
    }

    /// Iteration cap for a stack of `plies` effective plies.
    #[must_use]
    pub fn iteration_limit(&self, plies: usize) -> usize {
        match self.mode {
            AnalysisMode::FirstPly => 1,
            AnalysisMode::LastPly => self.max_iterations.unwrap_or(plies + 1).max(1),
        }
    }
}

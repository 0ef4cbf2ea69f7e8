#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_doc_code_examples)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod criteria;
pub mod degradation;
pub mod errors;
pub mod laminate;
pub mod loads;
pub mod material;
pub mod matrix;
pub mod recovery;
pub mod stiffness;

pub use config::{AnalysisConfig, AnalysisMode};
pub use criteria::{Criterion, FailureCriterion, FailureMode, ReserveFactor};
pub use degradation::{
    analyze, analyze_load_cases, AnalysisOutcome, DegradationState, IterationResult, PlyResult,
    Termination,
};
pub use errors::{
    AnalysisError, AnalysisWarning, LaminateEditError, LaminateError, MaterialPropertyError,
    MatrixError,
};
pub use laminate::{Laminate, Ply, StackedPly};
pub use loads::{Curvatures, Deformation, Forces, LoadState, Moments, Strains};
pub use material::{Material, MaterialId, MaterialLibrary};
pub use recovery::{PlyStates, PlyStrain, PlyStress, StressStrainState, Surface};
pub use stiffness::{EngineeringConstants, StiffnessMatrices};

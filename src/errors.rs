//! Error and warning types produced while building or analysing laminates.

use thiserror::Error;

use crate::material::MaterialId;

/// Error returned by the small dense matrix kernel.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum MatrixError {
    /// Returned when elimination meets a pivot smaller than the tolerance.
    #[error("matrix is singular (pivot {pivot} has magnitude {magnitude:e})")]
    Singular {
        /// Column at which elimination stalled.
        pivot: usize,
        /// Magnitude of the best available pivot in that column.
        magnitude: f64,
    },
}

/// Error returned when a material carries physically meaningless values.
///
/// The variants name the offending property so callers can present actionable
/// feedback to users.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MaterialPropertyError {
    /// Returned when an elastic modulus is zero, negative or not finite.
    #[error("{property} must be positive (received {value})")]
    NonPositiveModulus {
        /// Name of the rejected modulus.
        property: &'static str,
        /// Rejected value in MPa.
        value: f64,
    },
    /// Returned when a strength is zero, negative or not finite.
    #[error("{property} must be positive (received {value})")]
    NonPositiveStrength {
        /// Name of the rejected strength.
        property: &'static str,
        /// Rejected value in MPa.
        value: f64,
    },
    /// Returned when the major Poisson ratio violates `nu12^2 < E_par / E_nor`.
    #[error("Poisson ratio {nu12} is not admissible for the given moduli")]
    InadmissiblePoissonRatio {
        /// Rejected major Poisson ratio.
        nu12: f64,
    },
}

/// Error returned when a laminate definition cannot be analysed.
///
/// These are precondition violations and are detected before any matrix work.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LaminateError {
    /// Returned when the stack contains no plies.
    #[error("laminate has no plies")]
    EmptyStack,
    /// Returned when a ply thickness is zero, negative or not finite.
    #[error("ply {ply} has non-positive thickness {thickness}")]
    NonPositiveThickness {
        /// Index of the offending ply in the listed stack.
        ply: usize,
        /// Rejected thickness in millimetres.
        thickness: f64,
    },
    /// Returned when a ply references a material missing from the library.
    #[error("ply {ply} references unknown material {material:?}")]
    UnknownMaterial {
        /// Index of the offending ply in the listed stack.
        ply: usize,
        /// Identifier that could not be resolved.
        material: MaterialId,
    },
    /// Returned when a referenced material has invalid properties.
    #[error("material {material:?} has invalid properties: {source}")]
    InvalidMaterial {
        /// Name of the offending material.
        material: String,
        /// Description of the invalid property.
        #[source]
        source: MaterialPropertyError,
    },
    /// Returned when a criterion needs a named material parameter that is absent.
    #[error("ply {ply}: criterion {criterion} requires material parameter `{parameter}`")]
    MissingParameter {
        /// Index of the offending ply in the listed stack.
        ply: usize,
        /// Name of the criterion assigned to the ply.
        criterion: &'static str,
        /// Name of the missing parameter.
        parameter: &'static str,
    },
}

/// Error returned when editing a [`Laminate`](crate::Laminate) with invalid indices.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LaminateEditError {
    /// Returned when a ply cannot be found in the listed stack.
    #[error("ply {0} does not exist in this laminate")]
    UnknownPly(usize),
    /// Returned when a material cannot be found in the library.
    #[error("material {0:?} does not exist in this library")]
    UnknownMaterial(MaterialId),
}

/// Error returned when a laminate analysis cannot be started.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Returned when the laminate definition is invalid.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] LaminateError),
    /// Returned when the undamaged laminate stiffness cannot be inverted.
    #[error("laminate stiffness is singular before any degradation: {0}")]
    SingularStiffness(#[source] MatrixError),
}

/// Usage warning surfaced alongside analysis results.
///
/// Warnings never stop a computation; the supplied values are used as given.
#[derive(Clone, Debug, Error, PartialEq, serde::Serialize)]
pub enum AnalysisWarning {
    /// An isotropic-metal criterion is assigned to an orthotropic material.
    #[error("ply {ply}: {criterion} assumes an isotropic material but `{material}` is not isotropic")]
    NonIsotropicMaterial {
        /// Index of the affected ply in the listed stack.
        ply: usize,
        /// Name of the material.
        material: String,
        /// Name of the criterion.
        criterion: &'static str,
    },
}

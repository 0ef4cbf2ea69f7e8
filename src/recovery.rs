//! Recovery of ply stresses and strains from the laminate response.
//!
//! 1. Solve the mid-plane deformation from the compliance (or take it as given).
//! 2. Evaluate the laminate-axis strain at the top and bottom face of each ply.
//! 3. Rotate into the material axes and apply the ply's reduced stiffness.

use nalgebra::{Vector3, Vector6};
use serde::Serialize;

use crate::loads::{Deformation, LoadState};
use crate::stiffness::{strain_transformation, Layer, StiffnessMatrices};

/// Stresses `(σ1, σ2, τ12)` in the ply material axes, in MPa.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PlyStress {
    /// Normal stress along the fibres.
    pub s11: f64,
    /// Normal stress across the fibres.
    pub s22: f64,
    /// In-plane shear stress.
    pub t12: f64,
}

impl PlyStress {
    /// Create a [`PlyStress`] with explicit components.
    #[must_use]
    pub const fn new(s11: f64, s22: f64, t12: f64) -> Self {
        Self { s11, s22, t12 }
    }

    /// Whether all components vanish.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.s11 == 0.0 && self.s22 == 0.0 && self.t12 == 0.0
    }

    /// Convert the stress into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.s11, self.s22, self.t12)
    }
}

impl From<Vector3<f64>> for PlyStress {
    fn from(value: Vector3<f64>) -> Self {
        Self::new(value.x, value.y, value.z)
    }
}

/// Engineering strains `(ε1, ε2, γ12)` in the ply material axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PlyStrain {
    /// Normal strain along the fibres.
    pub e11: f64,
    /// Normal strain across the fibres.
    pub e22: f64,
    /// Engineering shear strain.
    pub g12: f64,
}

impl From<Vector3<f64>> for PlyStrain {
    fn from(value: Vector3<f64>) -> Self {
        Self {
            e11: value.x,
            e22: value.y,
            g12: value.z,
        }
    }
}

/// Face of a ply at which a state is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Face with the smaller z coordinate.
    Top,
    /// Face with the larger z coordinate.
    Bottom,
}

/// Local stress and strain at one face of one ply.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct StressStrainState {
    /// Face the state belongs to.
    pub surface: Surface,
    /// Through-thickness coordinate of the face.
    pub z: f64,
    /// Material-axis stress.
    pub stress: PlyStress,
    /// Material-axis strain.
    pub strain: PlyStrain,
}

impl StressStrainState {
    /// State with the given stress and no strain, mainly for direct criterion use.
    #[must_use]
    pub fn from_stress(stress: PlyStress) -> Self {
        Self {
            surface: Surface::Top,
            z: 0.0,
            stress,
            strain: PlyStrain::default(),
        }
    }
}

/// Top and bottom states of one ply.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlyStates {
    /// State at the top face.
    pub top: StressStrainState,
    /// State at the bottom face.
    pub bottom: StressStrainState,
}

/// Mid-plane deformation produced by a load case.
#[must_use]
pub fn deformation(stiffness: &StiffnessMatrices, load: &LoadState) -> Deformation {
    match *load {
        LoadState::Resultants { forces, moments } => {
            let f = forces.to_vector();
            let m = moments.to_vector();
            let resultants = Vector6::new(f.x, f.y, f.z, m.x, m.y, m.z);
            Deformation::from_vector(&(stiffness.compliance * resultants))
        }
        LoadState::Deformation {
            strains,
            curvatures,
        } => Deformation {
            strains,
            curvatures,
        },
    }
}

/// Local state of a layer at coordinate `z`.
fn state_at(
    layer: &Layer<'_>,
    deformation: &Deformation,
    surface: Surface,
    z: f64,
) -> StressStrainState {
    let global = deformation.strains_at(z).to_vector();
    let local = strain_transformation(layer.angle) * global;
    let stress = layer.local_stiffness() * local;
    StressStrainState {
        surface,
        z,
        stress: stress.into(),
        strain: local.into(),
    }
}

/// Recover top and bottom states for every layer.
#[must_use]
pub fn recover(
    layers: &[Layer<'_>],
    stiffness: &StiffnessMatrices,
    load: &LoadState,
) -> Vec<PlyStates> {
    let deformation = deformation(stiffness, load);
    layers
        .iter()
        .map(|layer| PlyStates {
            top: state_at(layer, &deformation, Surface::Top, layer.z_top),
            bottom: state_at(layer, &deformation, Surface::Bottom, layer.z_bottom),
        })
        .collect()
}

//! Ply stacks and their through-thickness geometry.

use serde::{Deserialize, Serialize};

use crate::criteria::{Criterion, FailureCriterion};
use crate::errors::{AnalysisError, LaminateEditError, LaminateError};
use crate::material::{Material, MaterialId, MaterialLibrary};
use crate::stiffness::{Layer, StiffnessMatrices};

/// One lamina of the stack as listed by the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ply {
    /// Material of the ply.
    pub material: MaterialId,
    /// Ply thickness in millimetres.
    pub thickness: f64,
    /// Fibre orientation in degrees, measured from the laminate x axis.
    pub angle: f64,
    /// Whether neighbouring plies constrain the ply on both faces.
    #[serde(default = "default_embedded")]
    pub embedded: bool,
    /// Failure criterion evaluated for the ply.
    #[serde(default)]
    pub criterion: Criterion,
}

/// Serde default for [`Ply::embedded`].
fn default_embedded() -> bool {
    true
}

impl Ply {
    /// Create an embedded ply evaluated with the default criterion.
    #[must_use]
    pub fn new(material: MaterialId, thickness: f64, angle: f64) -> Self {
        Self {
            material,
            thickness,
            angle,
            embedded: true,
            criterion: Criterion::default(),
        }
    }

    /// Assign a failure criterion, returning the updated ply.
    #[must_use]
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }
}

/// Ply placed in the effective stack with its through-thickness position.
#[derive(Clone, Copy, Debug)]
pub struct StackedPly<'a> {
    /// Position in the effective (possibly mirrored) stack.
    pub index: usize,
    /// Index of the listed ply this entry was created from.
    pub source: usize,
    /// The listed ply.
    pub ply: &'a Ply,
    /// Coordinate of the top face, measured from the mid-plane.
    pub z_top: f64,
    /// Coordinate of the bottom face, measured from the mid-plane.
    pub z_bottom: f64,
}

impl StackedPly<'_> {
    /// Coordinate of the ply mid-plane.
    #[must_use]
    pub fn z_mid(&self) -> f64 {
        0.5 * (self.z_top + self.z_bottom)
    }
}

/// Ordered stack of plies together with the materials they reference.
///
/// The z axis points from the first ply towards the last one, with the origin
/// on the laminate mid-plane, so the top face of the first ply sits at `-h/2`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Laminate {
    /// Materials referenced by the plies.
    pub materials: MaterialLibrary,
    /// Plies in stacking order.
    pub plies: Vec<Ply>,
    /// Mirror the listed plies about the mid-plane.
    #[serde(default)]
    pub symmetric: bool,
    /// With `symmetric`, the last listed ply straddles the mid-plane and is not mirrored.
    #[serde(default)]
    pub middle_layer: bool,
}

impl Laminate {
    /// Create an empty laminate around a material library.
    #[must_use]
    pub fn new(materials: MaterialLibrary) -> Self {
        Self {
            materials,
            ..Self::default()
        }
    }

    /// Append a ply to the listed stack and return its index.
    pub fn add_ply(&mut self, ply: Ply) -> usize {
        self.plies.push(ply);
        self.plies.len() - 1
    }

    /// Remove a listed ply.
    ///
    /// # Errors
    ///
    /// Returns [`LaminateEditError::UnknownPly`] when `index` is out of range.
    pub fn remove_ply(&mut self, index: usize) -> Result<Ply, LaminateEditError> {
        if index >= self.plies.len() {
            return Err(LaminateEditError::UnknownPly(index));
        }
        Ok(self.plies.remove(index))
    }

    /// Change the orientation of a listed ply.
    ///
    /// # Errors
    ///
    /// Returns [`LaminateEditError::UnknownPly`] when `index` is out of range.
    pub fn set_angle(&mut self, index: usize, angle: f64) -> Result<(), LaminateEditError> {
        let ply = self
            .plies
            .get_mut(index)
            .ok_or(LaminateEditError::UnknownPly(index))?;
        ply.angle = angle;
        Ok(())
    }

    /// Assign a failure criterion to a listed ply.
    ///
    /// # Errors
    ///
    /// Returns [`LaminateEditError::UnknownPly`] when `index` is out of range.
    pub fn set_criterion(
        &mut self,
        index: usize,
        criterion: Criterion,
    ) -> Result<(), LaminateEditError> {
        let ply = self
            .plies
            .get_mut(index)
            .ok_or(LaminateEditError::UnknownPly(index))?;
        ply.criterion = criterion;
        Ok(())
    }

    /// Number of plies in the effective stack.
    #[must_use]
    pub fn ply_count(&self) -> usize {
        let listed = self.plies.len();
        match (self.symmetric, self.middle_layer) {
            (false, _) => listed,
            (true, false) => 2 * listed,
            (true, true) => (2 * listed).saturating_sub(1),
        }
    }

    /// Listed-ply indices in effective stacking order.
    fn effective_order(&self) -> Vec<usize> {
        let listed = self.plies.len();
        let mut order: Vec<usize> = (0..listed).collect();
        if self.symmetric {
            let mirrored = if self.middle_layer {
                listed.saturating_sub(1)
            } else {
                listed
            };
            order.extend((0..mirrored).rev());
        }
        order
    }

    /// Total thickness of the effective stack.
    #[must_use]
    pub fn thickness(&self) -> f64 {
        self.effective_order()
            .into_iter()
            .map(|idx| self.plies[idx].thickness)
            .sum()
    }

    /// Areal mass of the effective stack.
    #[must_use]
    pub fn areal_mass(&self) -> f64 {
        self.effective_order()
            .into_iter()
            .map(|idx| {
                let ply = &self.plies[idx];
                let density = self.materials.get(ply.material).map_or(0.0, |m| m.density);
                density * ply.thickness
            })
            .sum()
    }

    /// Place the effective plies through the thickness.
    #[must_use]
    pub fn stack(&self) -> Vec<StackedPly<'_>> {
        let mut z = -0.5 * self.thickness();
        self.effective_order()
            .into_iter()
            .enumerate()
            .map(|(index, source)| {
                let ply = &self.plies[source];
                let z_top = z;
                z += ply.thickness;
                StackedPly {
                    index,
                    source,
                    ply,
                    z_top,
                    z_bottom: z,
                }
            })
            .collect()
    }

    /// Flag the outermost listed plies as not embedded and all others as embedded.
    ///
    /// For a symmetric laminate the first listed ply forms both outer faces.
    pub fn mark_outer_plies(&mut self) {
        let last = self.plies.len().saturating_sub(1);
        let symmetric = self.symmetric;
        for (idx, ply) in self.plies.iter_mut().enumerate() {
            ply.embedded = !(idx == 0 || (!symmetric && idx == last));
        }
    }

    /// Resolve the material of a listed ply.
    #[must_use]
    pub fn material_of(&self, ply: &Ply) -> Option<&Material> {
        self.materials.get(ply.material)
    }

    /// Check the definition before any matrix work.
    ///
    /// # Errors
    ///
    /// Returns the first [`LaminateError`] found: an empty stack, a ply with
    /// non-positive thickness, an unresolved or invalid material, or a missing
    /// criterion parameter.
    pub fn validate(&self) -> Result<(), LaminateError> {
        if self.plies.is_empty() {
            return Err(LaminateError::EmptyStack);
        }
        for (idx, ply) in self.plies.iter().enumerate() {
            if !(ply.thickness.is_finite() && ply.thickness > 0.0) {
                return Err(LaminateError::NonPositiveThickness {
                    ply: idx,
                    thickness: ply.thickness,
                });
            }
            let material = self
                .material_of(ply)
                .ok_or(LaminateError::UnknownMaterial {
                    ply: idx,
                    material: ply.material,
                })?;
            material
                .validate()
                .map_err(|source| LaminateError::InvalidMaterial {
                    material: material.name.clone(),
                    source,
                })?;
            if let Some(parameter) = ply.criterion.missing_parameter(material) {
                return Err(LaminateError::MissingParameter {
                    ply: idx,
                    criterion: ply.criterion.name(),
                    parameter,
                });
            }
        }
        Ok(())
    }

    /// Stiffness of the undamaged laminate.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Configuration`] for an invalid definition and
    /// [`AnalysisError::SingularStiffness`] when the ABD matrix cannot be inverted.
    ///
    /// # Examples
    /// ```
    /// use laminax::{Laminate, Material, MaterialLibrary, Ply};
    ///
    /// let mut materials = MaterialLibrary::new();
    /// let cfrp = materials.add(Material::orthotropic(
    ///     "CFRP",
    ///     [141_000.0, 9_340.0, 0.35, 4_500.0],
    ///     [2_000.0, 1_200.0, 50.0, 200.0, 80.0],
    /// ));
    /// let mut laminate = Laminate::new(materials);
    /// laminate.add_ply(Ply::new(cfrp, 0.125, 0.0));
    /// laminate.add_ply(Ply::new(cfrp, 0.125, 90.0));
    /// laminate.symmetric = true;
    ///
    /// let stiffness = laminate.stiffness().expect("valid laminate");
    /// assert!(stiffness.b.amax() < 1.0e-9);
    /// ```
    pub fn stiffness(&self) -> Result<StiffnessMatrices, AnalysisError> {
        self.validate()?;
        let layers = self.layers(|stacked| self.material_of(stacked.ply))?;
        StiffnessMatrices::assemble(&layers, crate::matrix::DEFAULT_PIVOT_TOLERANCE)
            .map_err(AnalysisError::SingularStiffness)
    }

    /// Build stiffness layers for the effective stack.
    ///
    /// `material` resolves the material used for the stiffness of each stacked
    /// ply, which lets callers substitute degraded working copies.
    pub(crate) fn layers<'m>(
        &self,
        material: impl Fn(&StackedPly<'_>) -> Option<&'m Material>,
    ) -> Result<Vec<Layer<'m>>, LaminateError> {
        self.stack()
            .iter()
            .map(|stacked| {
                let resolved = material(stacked).ok_or(LaminateError::UnknownMaterial {
                    ply: stacked.source,
                    material: stacked.ply.material,
                })?;
                Ok(Layer::new(resolved, stacked))
            })
            .collect()
    }
}

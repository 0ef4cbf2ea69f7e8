//! Ply materials and the library that owns them.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::errors::{LaminateEditError, MaterialPropertyError};

/// Relative tolerance used when deciding whether a material is isotropic.
pub const ISOTROPY_TOLERANCE: f64 = 0.01;

/// Identifier of a material inside a [`MaterialLibrary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(pub usize);

/// Orthotropic ply material in the fibre (∥) / transverse (⊥) axis system.
///
/// Moduli and strengths are in MPa. Strengths are magnitudes, so compressive
/// strengths are positive numbers as well.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Human readable name.
    pub name: String,
    /// Modulus parallel to the fibres.
    pub e_par: f64,
    /// Modulus normal to the fibres.
    pub e_nor: f64,
    /// Major in-plane Poisson ratio.
    pub nu12: f64,
    /// In-plane shear modulus.
    pub g12: f64,
    /// Transverse shear modulus in the 1-3 plane.
    #[serde(default)]
    pub g13: Option<f64>,
    /// Transverse shear modulus in the 2-3 plane.
    #[serde(default)]
    pub g23: Option<f64>,
    /// Tensile strength parallel to the fibres.
    pub r_par_tension: f64,
    /// Compressive strength parallel to the fibres.
    pub r_par_compression: f64,
    /// Tensile strength normal to the fibres.
    pub r_nor_tension: f64,
    /// Compressive strength normal to the fibres.
    pub r_nor_compression: f64,
    /// In-plane shear strength.
    pub r_shear: f64,
    /// Density in t/mm³.
    #[serde(default)]
    pub density: f64,
    /// Thermal expansion coefficient parallel to the fibres.
    #[serde(default)]
    pub alpha_par: f64,
    /// Thermal expansion coefficient normal to the fibres.
    #[serde(default)]
    pub alpha_nor: f64,
    /// Moisture swelling coefficient parallel to the fibres.
    #[serde(default)]
    pub beta_par: f64,
    /// Moisture swelling coefficient normal to the fibres.
    #[serde(default)]
    pub beta_nor: f64,
    /// Named scalar parameters consumed by individual failure criteria.
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

impl Material {
    /// Create an orthotropic material with elastic constants and strengths.
    ///
    /// `strengths` are ordered as parallel tension, parallel compression, normal
    /// tension, normal compression and shear.
    ///
    /// # Examples
    /// ```
    /// use laminax::Material;
    ///
    /// let cfrp = Material::orthotropic(
    ///     "CFRP",
    ///     [141_000.0, 9_340.0, 0.35, 4_500.0],
    ///     [2_000.0, 1_200.0, 50.0, 200.0, 80.0],
    /// );
    /// assert!(!cfrp.is_isotropic());
    /// ```
    #[must_use]
    pub fn orthotropic(name: impl Into<String>, elastic: [f64; 4], strengths: [f64; 5]) -> Self {
        let [e_par, e_nor, nu12, g12] = elastic;
        let [r_par_tension, r_par_compression, r_nor_tension, r_nor_compression, r_shear] =
            strengths;
        Self {
            name: name.into(),
            e_par,
            e_nor,
            nu12,
            g12,
            g13: None,
            g23: None,
            r_par_tension,
            r_par_compression,
            r_nor_tension,
            r_nor_compression,
            r_shear,
            density: 0.0,
            alpha_par: 0.0,
            alpha_nor: 0.0,
            beta_par: 0.0,
            beta_nor: 0.0,
            parameters: BTreeMap::new(),
        }
    }

    /// Create an isotropic material from modulus, Poisson ratio and one strength.
    ///
    /// The shear modulus follows `G = E / (2 (1 + nu))` and the shear strength the
    /// von Mises relation `R / sqrt(3)`.
    #[must_use]
    pub fn isotropic(name: impl Into<String>, modulus: f64, nu: f64, strength: f64) -> Self {
        Self::orthotropic(
            name,
            [modulus, modulus, nu, modulus / (2.0 * (1.0 + nu))],
            [strength, strength, strength, strength, strength / 3.0_f64.sqrt()],
        )
    }

    /// Attach a named criterion parameter, returning the updated material.
    #[must_use]
    pub fn with_parameter(mut self, name: &str, value: f64) -> Self {
        self.parameters.insert(name.to_owned(), value);
        self
    }

    /// Look up a named criterion parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }

    /// Minor Poisson ratio `nu21 = nu12 E_nor / E_par`.
    #[must_use]
    pub fn nu21(&self) -> f64 {
        if self.e_par == 0.0 {
            0.0
        } else {
            self.nu12 * self.e_nor / self.e_par
        }
    }

    /// Check that moduli, strengths and Poisson ratio are physically meaningful.
    ///
    /// # Errors
    ///
    /// Returns the first offending property as a [`MaterialPropertyError`].
    pub fn validate(&self) -> Result<(), MaterialPropertyError> {
        let moduli = [("e_par", self.e_par), ("e_nor", self.e_nor), ("g12", self.g12)];
        for (property, value) in moduli {
            if !(value.is_finite() && value > 0.0) {
                return Err(MaterialPropertyError::NonPositiveModulus { property, value });
            }
        }
        let strengths = [
            ("r_par_tension", self.r_par_tension),
            ("r_par_compression", self.r_par_compression),
            ("r_nor_tension", self.r_nor_tension),
            ("r_nor_compression", self.r_nor_compression),
            ("r_shear", self.r_shear),
        ];
        for (property, value) in strengths {
            if !(value.is_finite() && value > 0.0) {
                return Err(MaterialPropertyError::NonPositiveStrength { property, value });
            }
        }
        if !self.nu12.is_finite() || self.nu12 * self.nu12 >= self.e_par / self.e_nor {
            return Err(MaterialPropertyError::InadmissiblePoissonRatio { nu12: self.nu12 });
        }
        Ok(())
    }

    /// Decide whether the material behaves isotropically in the ply plane.
    ///
    /// Moduli, Poisson ratios and all four direct strengths must agree and the
    /// shear modulus must match `E / (2 (1 + nu))`, each within
    /// [`ISOTROPY_TOLERANCE`].
    #[must_use]
    pub fn is_isotropic(&self) -> bool {
        let close = |a: f64, b: f64| {
            let scale = a.abs().max(b.abs());
            scale == 0.0 || (a - b).abs() <= ISOTROPY_TOLERANCE * scale
        };
        let isotropic_shear = self.e_par / (2.0 * (1.0 + self.nu12));
        close(self.e_par, self.e_nor)
            && close(self.nu12, self.nu21())
            && close(self.r_par_tension, self.r_par_compression)
            && close(self.r_par_tension, self.r_nor_tension)
            && close(self.r_par_tension, self.r_nor_compression)
            && close(self.g12, isotropic_shear)
    }

    /// Return a copy with the matrix-dominated stiffness removed.
    ///
    /// The transverse modulus, Poisson ratio and shear modulus are zeroed; only
    /// the fibres keep carrying load.
    #[must_use]
    pub fn matrix_degraded(&self) -> Self {
        Self {
            e_nor: 0.0,
            nu12: 0.0,
            g12: 0.0,
            ..self.clone()
        }
    }
}

/// Library entry pairing a material with its cached isotropy check.
#[derive(Debug)]
struct Entry {
    /// The stored material.
    material: Material,
    /// Result of [`Material::is_isotropic`], computed on first request.
    isotropic: OnceLock<bool>,
}

impl Entry {
    /// Create an entry with an empty cache.
    fn new(material: Material) -> Self {
        Self {
            material,
            isotropic: OnceLock::new(),
        }
    }
}

impl Clone for Entry {
    fn clone(&self) -> Self {
        Self::new(self.material.clone())
    }
}

/// Owner of the materials referenced by plies.
///
/// Plies hold a [`MaterialId`] rather than a copy, so changes made through
/// [`MaterialLibrary::update`] are seen by every ply that uses the material.
#[derive(Clone, Debug, Default)]
pub struct MaterialLibrary {
    /// Stored materials in insertion order.
    entries: Vec<Entry>,
}

impl MaterialLibrary {
    /// Create an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material and return its identifier.
    pub fn add(&mut self, material: Material) -> MaterialId {
        self.entries.push(Entry::new(material));
        MaterialId(self.entries.len() - 1)
    }

    /// Number of stored materials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the library holds no materials.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow a material.
    #[must_use]
    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.entries.get(id.0).map(|entry| &entry.material)
    }

    /// Iterate over all materials with their identifiers.
    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (MaterialId(idx), &entry.material))
    }

    /// Modify a material in place and drop its cached isotropy result.
    ///
    /// # Errors
    ///
    /// Returns [`LaminateEditError::UnknownMaterial`] when `id` is not stored here.
    pub fn update(
        &mut self,
        id: MaterialId,
        edit: impl FnOnce(&mut Material),
    ) -> Result<(), LaminateEditError> {
        let entry = self
            .entries
            .get_mut(id.0)
            .ok_or(LaminateEditError::UnknownMaterial(id))?;
        edit(&mut entry.material);
        entry.isotropic = OnceLock::new();
        Ok(())
    }

    /// Cached isotropy check for a stored material.
    #[must_use]
    pub fn is_isotropic(&self, id: MaterialId) -> Option<bool> {
        self.entries
            .get(id.0)
            .map(|entry| *entry.isotropic.get_or_init(|| entry.material.is_isotropic()))
    }

    /// Whether the isotropy result of a material is currently cached.
    #[must_use]
    pub fn isotropy_cached(&self, id: MaterialId) -> bool {
        self.entries
            .get(id.0)
            .is_some_and(|entry| entry.isotropic.get().is_some())
    }
}

impl Serialize for MaterialLibrary {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter().map(|entry| &entry.material))
    }
}

impl<'de> Deserialize<'de> for MaterialLibrary {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let materials = Vec::<Material>::deserialize(deserializer)?;
        Ok(Self {
            entries: materials.into_iter().map(Entry::new).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aluminium() -> Material {
        Material::isotropic("Al 2024", 72_000.0, 0.33, 290.0)
    }

    #[test]
    fn isotropic_constructor_passes_the_isotropy_check() {
        let material = aluminium();
        assert!(material.is_isotropic());
        assert!(material.validate().is_ok());
    }

    #[test]
    fn perturbing_any_field_breaks_isotropy() {
        let perturbations: [fn(&mut Material); 7] = [
            |m| m.e_nor *= 1.05,
            |m| m.nu12 *= 1.05,
            |m| m.g12 *= 1.02,
            |m| m.r_par_compression *= 0.9,
            |m| m.r_nor_tension *= 1.1,
            |m| m.r_nor_compression *= 1.02,
            |m| m.r_par_tension *= 1.02,
        ];
        for perturb in perturbations {
            let mut material = aluminium();
            perturb(&mut material);
            assert!(!material.is_isotropic(), "{material:?}");
        }
    }

    #[test]
    fn perturbation_within_tolerance_keeps_isotropy() {
        let mut material = aluminium();
        material.g12 *= 1.005;
        assert!(material.is_isotropic());
    }

    #[test]
    fn validate_rejects_non_positive_strength() {
        let mut material = aluminium();
        material.r_shear = 0.0;
        assert_eq!(
            material.validate(),
            Err(MaterialPropertyError::NonPositiveStrength {
                property: "r_shear",
                value: 0.0
            })
        );
    }

    #[test]
    fn validate_rejects_inadmissible_poisson_ratio() {
        let mut material = Material::orthotropic(
            "bad",
            [10_000.0, 1_000.0, 3.5, 500.0],
            [100.0, 100.0, 10.0, 10.0, 10.0],
        );
        assert!(matches!(
            material.validate(),
            Err(MaterialPropertyError::InadmissiblePoissonRatio { .. })
        ));
        material.nu12 = 0.3;
        assert!(material.validate().is_ok());
    }

    #[test]
    fn degraded_copy_leaves_original_untouched() {
        let material = aluminium();
        let degraded = material.matrix_degraded();
        assert_eq!(degraded.e_nor, 0.0);
        assert_eq!(degraded.nu12, 0.0);
        assert_eq!(degraded.g12, 0.0);
        assert_eq!(degraded.e_par, material.e_par);
        assert_eq!(material.e_nor, 72_000.0);
    }

    #[test]
    fn update_invalidates_cached_isotropy() {
        let mut library = MaterialLibrary::new();
        let id = library.add(aluminium());
        assert!(!library.isotropy_cached(id));
        assert_eq!(library.is_isotropic(id), Some(true));
        assert!(library.isotropy_cached(id));

        library
            .update(id, |m| m.e_nor = 10_000.0)
            .expect("material exists");
        assert!(!library.isotropy_cached(id));
        assert_eq!(library.is_isotropic(id), Some(false));
    }

    #[test]
    fn update_rejects_unknown_material() {
        let mut library = MaterialLibrary::new();
        let error = library
            .update(MaterialId(3), |m| m.g12 = 1.0)
            .expect_err("unknown material rejected");
        assert_eq!(error, LaminateEditError::UnknownMaterial(MaterialId(3)));
        assert_eq!(library.is_isotropic(MaterialId(3)), None);
    }

    #[test]
    fn library_round_trips_through_json() {
        let mut library = MaterialLibrary::new();
        library.add(aluminium().with_parameter("larc03.alpha0", 53.0));
        let json = serde_json::to_string(&library).expect("serialises");
        let restored: MaterialLibrary = serde_json::from_str(&json).expect("deserialises");
        let material = restored.get(MaterialId(0)).expect("material restored");
        assert_eq!(material.parameter("larc03.alpha0"), Some(53.0));
        assert_eq!(restored.len(), 1);
    }
}

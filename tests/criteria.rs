#![warn(clippy::pedantic)]

use approx::assert_relative_eq;
use laminax::criteria::larc03::{self, FractureParameters};
use laminax::{
    Criterion, FailureCriterion, FailureMode, Material, MaterialId, MaterialLibrary, Ply,
    PlyStress, StressStrainState,
};

fn cfrp() -> Material {
    Material::orthotropic(
        "CFRP",
        [141_000.0, 9_340.0, 0.35, 4_500.0],
        [2_000.0, 1_200.0, 50.0, 200.0, 80.0],
    )
    .with_parameter(larc03::G_IC, 0.2)
    .with_parameter(larc03::G_IIC, 1.0)
}

fn state(s11: f64, s22: f64, t12: f64) -> StressStrainState {
    StressStrainState::from_stress(PlyStress::new(s11, s22, t12))
}

#[test]
fn fiber_strength_is_exactly_on_the_quadratic_envelopes() {
    let material = cfrp();
    let ply = Ply::new(MaterialId(0), 0.125, 0.0);
    for criterion in [Criterion::TsaiWu, Criterion::Hoffman, Criterion::TsaiHill] {
        let rf = criterion.evaluate(&material, &ply, &state(2_000.0, 0.0, 0.0));
        assert_relative_eq!(rf.value, 1.0, max_relative = 1.0e-12);
        assert_eq!(rf.mode, FailureMode::Fiber);
    }
}

#[test]
fn tresca_on_isotropic_material() {
    let steel = Material::isotropic("steel", 210_000.0, 0.3, 200.0);
    let ply = Ply::new(MaterialId(0), 1.0, 0.0).with_criterion(Criterion::Tresca);
    let rf = ply.criterion.evaluate(&steel, &ply, &state(100.0, 0.0, 0.0));
    assert_relative_eq!(rf.value, 2.0);
    assert_eq!(rf.mode, FailureMode::General);
}

#[test]
fn zero_stress_gives_infinite_reserve_for_every_criterion() {
    let ply = Ply::new(MaterialId(0), 0.125, 0.0);
    let zero = state(0.0, 0.0, 0.0);
    for material in [cfrp(), Material::isotropic("aluminium", 70_000.0, 0.33, 250.0)] {
        for criterion in Criterion::ALL {
            assert!(criterion.evaluate(&material, &ply, &zero).value.is_infinite());
        }
    }
}

#[test]
fn fracture_plane_search_matches_a_fine_scan() {
    let material = cfrp();
    let ply = Ply::new(MaterialId(0), 1.0, 0.0);
    let parameters = FractureParameters::new(&material, &ply);
    let plane = parameters.critical_plane(-100.0, 40.0);
    assert_relative_eq!(plane.angle, 53.0);
    assert_relative_eq!(plane.failure_index, 0.263_298_983_833_516_74, max_relative = 1.0e-12);

    // A tenth-of-a-degree scan does not find a much more critical plane.
    let finest = (0..=530)
        .map(|tenth| parameters.failure_index(f64::from(tenth) / 10.0, -100.0, 40.0))
        .fold(0.0, f64::max);
    assert!(finest >= plane.failure_index);
    assert!(finest - plane.failure_index < 1.0e-3);
}

#[test]
fn isotropy_check_is_cached_and_invalidated() {
    let mut library = MaterialLibrary::new();
    let id = library.add(Material::isotropic("aluminium", 70_000.0, 0.33, 250.0));
    assert!(!library.isotropy_cached(id));
    assert_eq!(library.is_isotropic(id), Some(true));
    assert!(library.isotropy_cached(id));

    library
        .update(id, |material| material.r_par_compression = 200.0)
        .expect("known material");
    assert!(!library.isotropy_cached(id));
    assert_eq!(library.is_isotropic(id), Some(false));
}

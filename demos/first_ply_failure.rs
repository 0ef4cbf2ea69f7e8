use laminax::criteria::larc03;
use laminax::{
    analyze, AnalysisConfig, Criterion, FailureCriterion, Laminate, LoadState, Material,
    MaterialLibrary, Ply,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut materials = MaterialLibrary::new();
    let cfrp = materials.add(
        Material::orthotropic(
            "CFRP",
            [141_000.0, 9_340.0, 0.35, 4_500.0],
            [2_000.0, 1_200.0, 50.0, 200.0, 80.0],
        )
        .with_parameter(larc03::G_IC, 0.2)
        .with_parameter(larc03::G_IIC, 1.0),
    );

    // [0/45/-45/90]s under combined in-plane load.
    let load = LoadState::forces(100.0, -60.0, 20.0);
    for criterion in [
        Criterion::TsaiWu,
        Criterion::Hoffman,
        Criterion::TsaiHill,
        Criterion::MaxStress,
        Criterion::Larc03,
    ] {
        let mut laminate = Laminate::new(materials.clone());
        for angle in [0.0, 45.0, -45.0, 90.0] {
            laminate.add_ply(Ply::new(cfrp, 0.125, angle).with_criterion(criterion));
        }
        laminate.symmetric = true;
        laminate.mark_outer_plies();

        let outcome = analyze(&laminate, &load, &AnalysisConfig::first_ply())?;
        let first = outcome.first_ply();
        println!(
            "{:<10} ply {} RF = {:.3} [{}]",
            criterion.name(),
            first.governing_ply,
            first.reserve_factor.value,
            first.reserve_factor.label
        );
    }

    Ok(())
}

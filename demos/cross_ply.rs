use laminax::{analyze, AnalysisConfig, Laminate, LoadState, Material, MaterialLibrary, Ply};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut materials = MaterialLibrary::new();
    let cfrp = materials.add(Material::orthotropic(
        "CFRP",
        [141_000.0, 9_340.0, 0.35, 4_500.0],
        [2_000.0, 1_200.0, 50.0, 200.0, 80.0],
    ));

    let mut laminate = Laminate::new(materials);
    laminate.add_ply(Ply::new(cfrp, 0.125, 0.0));
    laminate.add_ply(Ply::new(cfrp, 0.125, 90.0));
    laminate.symmetric = true;

    let stiffness = laminate.stiffness()?;
    let constants = stiffness.engineering_constants();
    println!(
        "Ex = {:.0} MPa, Ey = {:.0} MPa, Gxy = {:.0} MPa, nu_xy = {:.4}",
        constants.ex, constants.ey, constants.gxy, constants.nu_xy
    );

    let outcome = analyze(
        &laminate,
        &LoadState::forces(100.0, 0.0, 0.0),
        &AnalysisConfig::last_ply(),
    )?;
    for iteration in &outcome.iterations {
        println!(
            "iteration {}: ply {} RF = {:.4} ({})",
            iteration.iteration,
            iteration.governing_ply,
            iteration.reserve_factor.value,
            iteration.mode()
        );
    }
    println!(
        "last ply failure RF = {:.4} ({})",
        outcome.reserve_factor().value,
        outcome.termination
    );

    Ok(())
}

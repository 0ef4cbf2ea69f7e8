use laminax::{AnalysisError, AnalysisOutcome, IterationResult, LoadState};
use serde::Serialize;
use std::fmt::Write;

/// Result of one load case as presented to the user.
pub type CaseResult = Result<AnalysisOutcome, AnalysisError>;

/// Describe a load case on one line.
fn describe_load(load: &LoadState) -> String {
    match load {
        LoadState::Resultants { forces, moments } => format!(
            "Nx = {:.1}, Ny = {:.1}, Nxy = {:.1} N/mm; Mx = {:.1}, My = {:.1}, Mxy = {:.1} N",
            forces.nx, forces.ny, forces.nxy, moments.mx, moments.my, moments.mxy
        ),
        LoadState::Deformation {
            strains,
            curvatures,
        } => format!(
            "ex = {:.3e}, ey = {:.3e}, gxy = {:.3e}; kx = {:.3e}, ky = {:.3e}, kxy = {:.3e} 1/mm",
            strains.ex, strains.ey, strains.gxy, curvatures.kx, curvatures.ky, curvatures.kxy
        ),
    }
}

/// Append one iteration line.
fn write_iteration(output: &mut String, iteration: &IterationResult) {
    let rf = iteration.reserve_factor;
    let angle = iteration
        .plies
        .get(iteration.governing_ply)
        .map_or(0.0, |ply| ply.angle);
    write!(
        output,
        "  iteration {}: ply {} ({angle:.1} deg) RF = {:.4} [{} / {}]",
        iteration.iteration, iteration.governing_ply, rf.value, rf.mode, rf.label
    )
    .expect("writing to string cannot fail");
    if let Some(fracture) = rf.fracture_angle {
        write!(output, ", fracture plane {fracture:.0} deg")
            .expect("writing to string cannot fail");
    }
    output.push('\n');
}

/// Render a plain-text report of every load case.
///
/// Each case lists the governing ply of every iteration, then the controlling
/// result, the termination reason and any warnings.
#[must_use]
pub fn render_text(cases: &[(LoadState, CaseResult)]) -> String {
    let mut output = String::new();

    for (number, (load, result)) in cases.iter().enumerate() {
        writeln!(output, "Load case {}: {}", number + 1, describe_load(load))
            .expect("writing to string cannot fail");

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(error) => {
                writeln!(output, "  error: {error}").expect("writing to string cannot fail");
                continue;
            }
        };

        for iteration in &outcome.iterations {
            write_iteration(&mut output, iteration);
        }

        // The controlling step is the largest governing RF, not the last one.
        let governing = outcome.governing();
        writeln!(
            output,
            "  first ply failure:  RF = {:.4}",
            outcome.first_ply().reserve_factor.value
        )
        .expect("writing to string cannot fail");
        writeln!(
            output,
            "  governing result:   RF = {:.4} (iteration {}, {})",
            governing.reserve_factor.value, governing.iteration, governing.reserve_factor.mode
        )
        .expect("writing to string cannot fail");
        writeln!(output, "  termination: {}", outcome.termination)
            .expect("writing to string cannot fail");
        for warning in &outcome.warnings {
            writeln!(output, "  warning: {warning}").expect("writing to string cannot fail");
        }
    }

    output
}

/// One load case in the JSON report.
#[derive(Serialize)]
struct JsonCase<'a> {
    /// Applied load.
    load: &'a LoadState,
    /// Outcome of a successful analysis.
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'a AnalysisOutcome>,
    /// Message of a failed analysis.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Render the complete results as pretty-printed JSON.
///
/// Infinite reserve factors are written as `null`.
pub fn render_json(cases: &[(LoadState, CaseResult)]) -> Result<String, serde_json::Error> {
    let cases: Vec<JsonCase<'_>> = cases
        .iter()
        .map(|(load, result)| JsonCase {
            load,
            outcome: result.as_ref().ok(),
            error: result.as_ref().err().map(ToString::to_string),
        })
        .collect();
    serde_json::to_string_pretty(&cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use laminax::{analyze, AnalysisConfig, LaminateError, Laminate, Material, MaterialLibrary, Ply};

    fn cross_ply() -> Laminate {
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
        laminate
    }

    fn cases() -> Vec<(LoadState, CaseResult)> {
        let load = LoadState::forces(100.0, 0.0, 0.0);
        let outcome = analyze(&cross_ply(), &load, &AnalysisConfig::default());
        let failed = Err(AnalysisError::Configuration(LaminateError::EmptyStack));
        vec![(load, outcome), (LoadState::default(), failed)]
    }

    #[test]
    fn formats_human_readable_report() {
        let report = render_text(&cases());
        assert!(report.contains("Load case 1: Nx = 100.0"));
        assert!(report.contains("iteration 0"));
        assert!(report.contains("RF = 2.0226 [matrix / matrix failure]"));
        assert!(report.contains("governing result:   RF = 4.4226 (iteration 1, fiber)"));
        assert!(report.contains("termination: fiber failure"));
        assert!(report.contains("Load case 2"));
        assert!(report.contains("error: invalid configuration"));
    }

    #[test]
    fn json_report_carries_outcome_or_error() {
        let json = render_json(&cases()).expect("serialisable report");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        let cases = value.as_array().expect("array of cases");
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0]["outcome"]["termination"], "fiber_failure");
        assert_eq!(cases[0]["outcome"]["governing"], 1);
        assert!(cases[1]["error"].is_string());
        assert!(cases[1].get("outcome").is_none());
    }
}

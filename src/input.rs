use laminax::{AnalysisConfig, Laminate, LoadState};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error raised while loading the input document.
#[derive(Debug, Error)]
pub enum InputError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid analysis document.
    #[error("cannot parse {path}: {source}")]
    Parse {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
}

/// One load case or several.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LoadCases {
    /// A single load case.
    Single(LoadState),
    /// Independent load cases analysed in parallel.
    Many(Vec<LoadState>),
}

impl LoadCases {
    /// Flatten into a list of load cases.
    pub fn into_vec(self) -> Vec<LoadState> {
        match self {
            Self::Single(load) => vec![load],
            Self::Many(loads) => loads,
        }
    }
}

/// Complete analysis request read from disk.
#[derive(Debug, Deserialize)]
pub struct AnalysisInput {
    /// Laminate definition with its materials.
    pub laminate: Laminate,
    /// Load case or load cases.
    pub load: LoadCases,
    /// Analysis settings; defaults to a last-ply analysis.
    #[serde(default)]
    pub config: AnalysisConfig,
}

/// Parse an analysis request from JSON text.
pub fn parse_input(text: &str, path: &Path) -> Result<AnalysisInput, InputError> {
    serde_json::from_str(text).map_err(|source| InputError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse an analysis request.
pub fn read_input(path: &Path) -> Result<AnalysisInput, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_input(&text, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use laminax::{AnalysisMode, Criterion};

    const LAMINATE: &str = r#"{
        "materials": [{
            "name": "CFRP",
            "e_par": 141000.0, "e_nor": 9340.0, "nu12": 0.35, "g12": 4500.0,
            "r_par_tension": 2000.0, "r_par_compression": 1200.0,
            "r_nor_tension": 50.0, "r_nor_compression": 200.0, "r_shear": 80.0
        }],
        "plies": [
            {"material": 0, "thickness": 0.125, "angle": 0.0},
            {"material": 0, "thickness": 0.125, "angle": 90.0, "criterion": "hoffman"}
        ],
        "symmetric": true
    }"#;

    #[test]
    fn reads_laminate_loads_and_config() {
        let text = format!(
            r#"{{
                "laminate": {LAMINATE},
                "load": [
                    {{"kind": "resultants", "forces": {{"nx": 100.0, "ny": 0.0, "nxy": 0.0}}}},
                    {{"kind": "deformation", "strains": {{"ex": 0.001, "ey": 0.0, "gxy": 0.0}}}}
                ],
                "config": {{"mode": "first_ply"}}
            }}"#
        );
        let input = parse_input(&text, Path::new("input.json")).expect("valid document");
        assert_eq!(input.laminate.ply_count(), 4);
        assert_eq!(input.laminate.plies[1].criterion, Criterion::Hoffman);
        assert_eq!(input.config.mode, AnalysisMode::FirstPly);
        let loads = input.load.into_vec();
        assert_eq!(loads.len(), 2);
        assert_eq!(loads[0], LoadState::forces(100.0, 0.0, 0.0));
    }

    #[test]
    fn single_load_and_missing_config_are_accepted() {
        let text = format!(
            r#"{{
                "laminate": {LAMINATE},
                "load": {{"kind": "resultants", "moments": {{"mx": 5.0, "my": 0.0, "mxy": 0.0}}}}
            }}"#
        );
        let input = parse_input(&text, Path::new("input.json")).expect("valid document");
        assert_eq!(input.config, AnalysisConfig::default());
        assert_eq!(input.load.into_vec(), vec![LoadState::moments(5.0, 0.0, 0.0)]);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let error = parse_input("{}", Path::new("broken.json")).expect_err("missing fields");
        assert!(error.to_string().starts_with("cannot parse broken.json"));
    }
}

//! Seed-data loader.
//!
//! Loads a catalog from a directory of JSON files:
//!
//! - `learners.json`: array of [`Learner`]
//! - `examinations.json`: array of [`Examination`]
//! - `opportunities.json`: array of [`Opportunity`]
//!
//! After loading, every saved-offering reference on every learner is
//! checked against the loaded offerings so scorers never chase a dangling
//! id at request time.

use crate::error::{CatalogError, Result};
use crate::index::CatalogIndex;
use crate::types::{Examination, Learner, Opportunity};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const LEARNERS_FILE: &str = "learners.json";
const EXAMINATIONS_FILE: &str = "examinations.json";
const OPPORTUNITIES_FILE: &str = "opportunities.json";

/// Load a complete catalog from `dir`.
pub fn load_catalog(dir: &Path) -> Result<CatalogIndex> {
    let learners: Vec<Learner> = load_json_file(&dir.join(LEARNERS_FILE))?;
    let examinations: Vec<Examination> = load_json_file(&dir.join(EXAMINATIONS_FILE))?;
    let opportunities: Vec<Opportunity> = load_json_file(&dir.join(OPPORTUNITIES_FILE))?;

    let mut catalog = CatalogIndex::new();
    for examination in examinations {
        catalog.insert_examination(examination);
    }
    for opportunity in opportunities {
        catalog.insert_opportunity(opportunity);
    }

    // Validate saved references before accepting the learners
    for learner in &learners {
        for &id in &learner.saved_examinations {
            if catalog.examination(id).is_none() {
                return Err(CatalogError::DanglingReference {
                    entity: "examination".to_string(),
                    id,
                });
            }
        }
        for &id in &learner.saved_opportunities {
            if catalog.opportunity(id).is_none() {
                return Err(CatalogError::DanglingReference {
                    entity: "opportunity".to_string(),
                    id,
                });
            }
        }
    }
    for learner in learners {
        catalog.insert_learner(learner);
    }

    Ok(catalog)
}

/// Parse one JSON seed file into a vector of records
fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|_| CatalogError::FileNotFound {
        path: path.display().to_string(),
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CatalogError::Malformed {
        file: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    fn seed_dir(learners: &str, exams: &str, opps: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "edu-recs-loader-test-{}-{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        write_file(&dir, LEARNERS_FILE, learners);
        write_file(&dir, EXAMINATIONS_FILE, exams);
        write_file(&dir, OPPORTUNITIES_FILE, opps);
        dir
    }

    #[test]
    fn loads_a_minimal_catalog() {
        let dir = seed_dir(
            r#"[{"id": 1, "name": "Asha", "stage": "pre_tertiary",
                 "stream": "Science", "interests": ["Physics"],
                 "saved_examinations": [7]}]"#,
            r#"[{"id": 7, "name": "National Physics Olympiad",
                 "subjects": ["Physics"], "domain": "Science",
                 "conducted_by": "NPO Board", "deadline": 4102444800,
                 "popularity": 120}]"#,
            r#"[]"#,
        );

        let catalog = load_catalog(&dir).unwrap();
        let (learners, exams, opps) = catalog.counts();
        assert_eq!((learners, exams, opps), (1, 1, 0));

        let learner = catalog.learner(1).unwrap();
        assert_eq!(learner.name, "Asha");
        assert_eq!(learner.saved_examinations, vec![7]);

        let exam = catalog.examination(7).unwrap();
        assert!(exam.active, "active should default to true");
        assert!(exam.tags.is_empty(), "tags should default to empty");
    }

    #[test]
    fn rejects_dangling_saved_reference() {
        let dir = seed_dir(
            r#"[{"id": 1, "name": "Asha", "stage": "pre_tertiary",
                 "stream": null, "saved_opportunities": [99]}]"#,
            r#"[]"#,
            r#"[]"#,
        );

        let err = load_catalog(&dir).unwrap_err();
        match err {
            CatalogError::DanglingReference { entity, id } => {
                assert_eq!(entity, "opportunity");
                assert_eq!(id, 99);
            }
            other => panic!("expected DanglingReference, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let dir = std::env::temp_dir().join("edu-recs-loader-missing");
        let err = load_catalog(&dir).unwrap_err();
        assert!(matches!(err, CatalogError::FileNotFound { .. }));
    }
}

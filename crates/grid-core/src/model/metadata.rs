//! Metadata: el plan completo y persistido de una ronda de submission.
//!
//! Valor inmutable construido una sola vez por el planner y releído por todas
//! las fases posteriores. Invariantes:
//! - Los job ids son densos `0..N-1`: el id de un job es su posición en
//!   `jobs`, sin huecos ni reutilización dentro de una generación.
//! - Cada fichero de entrada pertenece a exactamente un job.
//! - `fingerprint` cubre la parte determinista del plan; `created_at` es
//!   bookkeeping y queda fuera del hash.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::config::RunOptions;
use crate::constants::{PART_SUFFIX, PLANNER_VERSION};
use crate::errors::FlowError;
use crate::hashing::hash_value;

/// Una unidad de trabajo planificada: una muestra más un chunk contiguo de
/// sus ficheros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Muestra a la que pertenece el chunk.
    pub sample: String,
    /// Índice 0-based del chunk dentro de su muestra.
    pub idx: usize,
    /// Sublista ordenada de ficheros de entrada.
    pub input_files: Vec<String>,
}

impl Job {
    /// Nombre del artifact que el worker produce para este job.
    pub fn piece_name(&self) -> String {
        format!("{}_{}{}", self.sample, self.idx, PART_SUFFIX)
    }
}

/// Plan completo de una ronda de submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Opciones globales de la ronda (entran al fingerprint).
    pub options: RunOptions,
    /// Muestras en orden natural estable.
    pub samples: Vec<String>,
    /// Muestra → lista resuelta y ordenada de ficheros de entrada.
    pub input_files: IndexMap<String, Vec<String>>,
    /// Jobs aplanados entre muestras; el id global de un job es su índice.
    pub jobs: Vec<Job>,
    /// Directorio donde los workers depositan sus pieces.
    pub job_output_dir: PathBuf,
    /// Hash del plan (JSON canónico de la parte determinista).
    pub fingerprint: String,
    /// Momento de planificación. No entra al fingerprint.
    pub created_at: DateTime<Utc>,
}

impl Metadata {
    pub fn n_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Todos los job ids del plan, en orden.
    pub fn job_ids(&self) -> Vec<usize> {
        (0..self.jobs.len()).collect()
    }

    pub fn job(&self, id: usize) -> Option<&Job> {
        self.jobs.get(id)
    }

    /// Jobs de una muestra, en orden de chunk.
    pub fn jobs_for_sample<'a>(&'a self, sample: &'a str) -> impl Iterator<Item = &'a Job> {
        self.jobs.iter().filter(move |j| j.sample == sample)
    }

    /// Fingerprint de la parte determinista del plan.
    pub fn compute_fingerprint(options: &RunOptions,
                               samples: &[String],
                               input_files: &IndexMap<String, Vec<String>>,
                               jobs: &[Job])
                               -> Result<String, FlowError> {
        let value = json!({
            "planner_version": PLANNER_VERSION,
            "options": serde_json::to_value(options)?,
            "samples": samples,
            "inputfiles": serde_json::to_value(input_files)?,
            "jobs": serde_json::to_value(jobs)?,
        });
        Ok(hash_value(&value))
    }

    /// Persiste la metadata como JSON legible. Se escribe una vez por ronda.
    pub fn save(&self, path: &Path) -> Result<(), FlowError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, FlowError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_name_embeds_sample_and_idx() {
        let job = Job { sample: "qcd-ht500".into(),
                        idx: 3,
                        input_files: vec!["a".into()] };
        assert_eq!(job.piece_name(), "qcd-ht500_3_tree.json");
    }

    #[test]
    fn fingerprint_ignores_nothing_deterministic() {
        let opts = RunOptions::new("jobs", "out");
        let samples = vec!["a".to_string()];
        let mut input_files = IndexMap::new();
        input_files.insert("a".to_string(), vec!["f1".to_string()]);
        let jobs = vec![Job { sample: "a".into(), idx: 0, input_files: vec!["f1".into()] }];
        let fp1 = Metadata::compute_fingerprint(&opts, &samples, &input_files, &jobs).unwrap();
        let fp2 = Metadata::compute_fingerprint(&opts, &samples, &input_files, &jobs).unwrap();
        assert_eq!(fp1, fp2);
    }
}

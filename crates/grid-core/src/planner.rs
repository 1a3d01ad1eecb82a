//! Planner: particiona las entradas resueltas en jobs y construye la
//! metadata de la ronda.
//!
//! Función pura sobre sus entradas: mismas entradas y opciones producen el
//! mismo conjunto de jobs y los mismos ids. La re-submission direcciona jobs
//! sólo por id, así que este determinismo es un invariante duro, verificado
//! además por el fingerprint del plan.

use chrono::Utc;
use indexmap::IndexMap;
use tracing::info;

use crate::config::RunOptions;
use crate::constants::PIECES_DIR;
use crate::errors::FlowError;
use crate::model::{Job, Metadata};
use crate::util::chunks;

/// Construye la metadata a partir de las entradas resueltas.
///
/// Los ficheros de cada muestra se trocean en chunks consecutivos de como
/// máximo `options.files_per_job`; cada chunk es un job con `idx` 0-based
/// dentro de su muestra. Los jobs se aplanan en orden de muestra: el id
/// global de un job es su posición en la lista aplanada.
pub fn build_metadata(options: RunOptions,
                      resolved: IndexMap<String, Vec<String>>)
                      -> Result<Metadata, FlowError> {
    if options.files_per_job == 0 {
        return Err(FlowError::Config("files_per_job must be positive".into()));
    }

    let samples: Vec<String> = resolved.keys().cloned().collect();
    let mut jobs = Vec::new();
    for sample in &samples {
        for (idx, chunk) in chunks(&resolved[sample], options.files_per_job).into_iter().enumerate() {
            jobs.push(Job { sample: sample.clone(),
                            idx,
                            input_files: chunk });
        }
    }

    let fingerprint = Metadata::compute_fingerprint(&options, &samples, &resolved, &jobs)?;
    let job_output_dir = options.output_dir.join(PIECES_DIR);
    info!(samples = samples.len(), jobs = jobs.len(), fingerprint = %fingerprint, "plan built");

    Ok(Metadata { options,
                  samples,
                  input_files: resolved,
                  jobs,
                  job_output_dir,
                  fingerprint,
                  created_at: Utc::now() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(counts: &[(&str, usize)]) -> IndexMap<String, Vec<String>> {
        counts.iter()
              .map(|(s, n)| {
                  let files = (0..*n).map(|i| format!("/store/{s}/f{i}.json")).collect();
                  (s.to_string(), files)
              })
              .collect()
    }

    fn options(k: usize) -> RunOptions {
        let mut opts = RunOptions::new("jobs", "out");
        opts.files_per_job = k;
        opts
    }

    #[test]
    fn job_count_is_ceil_of_files_over_chunk() {
        let md = build_metadata(options(3), resolved(&[("a", 7), ("b", 3)])).unwrap();
        // ceil(7/3) + ceil(3/3) = 3 + 1
        assert_eq!(md.n_jobs(), 4);
        assert_eq!(md.jobs[2].input_files.len(), 1);
    }

    #[test]
    fn chunks_partition_the_sorted_list_exactly() {
        let inputs = resolved(&[("a", 10)]);
        let md = build_metadata(options(4), inputs.clone()).unwrap();
        let flat: Vec<String> = md.jobs.iter().flat_map(|j| j.input_files.clone()).collect();
        assert_eq!(flat, inputs["a"]);
        assert!(md.jobs.iter().all(|j| !j.input_files.is_empty()));
    }

    #[test]
    fn per_sample_idx_and_global_ids_are_dense() {
        let md = build_metadata(options(2), resolved(&[("a", 3), ("b", 2)])).unwrap();
        let idx: Vec<(String, usize)> = md.jobs.iter().map(|j| (j.sample.clone(), j.idx)).collect();
        assert_eq!(idx,
                   vec![("a".to_string(), 0), ("a".to_string(), 1), ("b".to_string(), 0)]);
        assert_eq!(md.job_ids(), vec![0, 1, 2]);
    }

    #[test]
    fn replanning_reproduces_fingerprint_and_jobs() {
        let a = build_metadata(options(5), resolved(&[("a", 12), ("b", 4)])).unwrap();
        let b = build_metadata(options(5), resolved(&[("a", 12), ("b", 4)])).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.jobs, b.jobs);
    }

    #[test]
    fn zero_chunk_size_is_config_error() {
        let err = build_metadata(options(0), resolved(&[("a", 1)])).unwrap_err();
        assert!(matches!(err, FlowError::Config(_)));
    }
}

//! Anotación de pesos: combina las pieces de cada muestra y escribe el peso
//! de sección eficaz en el artifact por muestra.
//!
//! `weight = xsec * lumi / sum_of_weights`. Si el artifact trae sumas por
//! variación (escala/PDF), se añade un factor de renormalización por
//! variación: `sum_of_weights / variation_sum[i]`. Las ramas nuevas son de
//! valor constante, dimensionadas al número de filas por el artifact; las
//! ramas existentes no se tocan.
//!
//! Muestras de datos reales (flag explícito del dataset file, o entrada de
//! datos en la tabla) se saltan en silencio. Simulación sin entrada en la
//! tabla es fatal (`MissingXsec`).
//!
//! La fase completa es idempotente: deja un marcador `.success` en `parts/`
//! y se salta todo el trabajo si ya existe.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{PARTS_DIR, PART_SUFFIX, PDF_NORM_BRANCH, SCALE_NORM_BRANCH, SUCCESS_MARKER, XSEC_BRANCH};
use crate::errors::FlowError;
use crate::external::{ArtifactStore, Combiner, PartArtifact};
use crate::model::{DatasetFile, Metadata};
use crate::xsec::{XsecEntry, XsecTable};

/// Escribe las ramas de peso en un artifact abierto. No persiste: el caller
/// decide cuándo salvar.
pub fn annotate_weights(artifact: &mut dyn PartArtifact, xsec: f64, lumi: f64) -> Result<(), FlowError> {
    let sumw = artifact.sum_of_weights();
    if sumw == 0.0 {
        return Err(FlowError::Config("sum of weights is zero, cannot normalize".into()));
    }
    artifact.set_scalar_branch(XSEC_BRANCH, xsec * lumi / sumw)?;

    if let Some(sums) = artifact.scale_sums() {
        let norms: Vec<f64> = sums.iter().map(|s| sumw / s).collect();
        debug!(?norms, "scale weight normalization");
        artifact.set_vector_branch(SCALE_NORM_BRANCH, &norms)?;
    }
    if let Some(sums) = artifact.pdf_sums() {
        let norms: Vec<f64> = sums.iter().map(|s| sumw / s).collect();
        debug!(?norms, "pdf weight normalization");
        artifact.set_vector_branch(PDF_NORM_BRANCH, &norms)?;
    }
    Ok(())
}

/// Combina las pieces por muestra en `parts/` y anota pesos si hay tabla.
pub fn run_add_weight(md: &Metadata,
                      datasets: &DatasetFile,
                      table: Option<&XsecTable>,
                      combiner: &dyn Combiner,
                      store: &dyn ArtifactStore)
                      -> Result<(), FlowError> {
    let parts_dir = md.options.output_dir.join(PARTS_DIR);
    let marker = parts_dir.join(SUCCESS_MARKER);
    if marker.exists() {
        debug!("weights phase already completed, skipping");
        return Ok(());
    }
    std::fs::create_dir_all(&parts_dir)?;

    for sample in &md.samples {
        let out = parts_dir.join(format!("{sample}{PART_SUFFIX}"));
        combine_sample_pieces(md, sample, &out, combiner)?;

        let Some(table) = table else { continue };
        if datasets.is_data(sample) {
            info!(sample = %sample, "data sample, not adding weight");
            continue;
        }
        match table.get(sample) {
            None => return Err(FlowError::MissingXsec(sample.clone())),
            Some(XsecEntry::Data) => {
                info!(sample = %sample, "data sample per xsec table, not adding weight");
            }
            Some(&XsecEntry::Simulation(xsec)) => {
                info!(sample = %sample, xsec, file = %out.display(), "adding xsec weight");
                let mut artifact = store.open(&out)?;
                annotate_weights(artifact.as_mut(), xsec, md.options.target_lumi)?;
                artifact.save()?;
            }
        }
    }

    std::fs::write(&marker, "")?;
    Ok(())
}

/// Combina todas las pieces planificadas de una muestra. Cualquier piece
/// ausente es un error: combinar un subconjunto perdería datos en silencio.
fn combine_sample_pieces(md: &Metadata,
                         sample: &str,
                         out: &Path,
                         combiner: &dyn Combiner)
                         -> Result<(), FlowError> {
    let pieces: Vec<PathBuf> = md.jobs_for_sample(sample)
                                 .map(|j| md.job_output_dir.join(j.piece_name()))
                                 .collect();
    let missing: Vec<String> = pieces.iter()
                                     .filter(|p| !p.is_file())
                                     .map(|p| p.display().to_string())
                                     .collect();
    if !missing.is_empty() {
        return Err(FlowError::Precondition(format!(
            "missing job outputs for sample {sample}: {missing:?}; resubmit before adding weights"
        )));
    }
    let inputs: Vec<&Path> = pieces.iter().map(PathBuf::as_path).collect();
    debug!(sample = %sample, n = inputs.len(), "combining pieces");
    combiner.combine(out, &inputs)
}

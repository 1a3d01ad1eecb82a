//! Reconciliación y merge final: de part-files por muestra a los artifacts
//! nombrados por grupo de salida.
//!
//! Por cada grupo: `found = presentes ∩ requeridos`. Sin nada presente, el
//! grupo se salta con un warning (p.ej. un grupo opcional que nunca corrió).
//! Con un subconjunto estricto, la reconciliación falla nombrando a los
//! miembros ausentes: un merge parcial nunca prospera en silencio. Con un
//! único miembro, el merge degenera en un rename. El marcador `.success` en
//! el output dir hace idempotente la fase completa; es la única fuente de
//! verdad de "terminado" aunque un merge anterior muriera a medias.

use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::constants::{PARTS_DIR, PART_SUFFIX, SUCCESS_MARKER};
use crate::errors::FlowError;
use crate::external::Combiner;
use crate::model::DatasetFile;

pub fn run_merge(datasets: &DatasetFile, output_dir: &Path, combiner: &dyn Combiner) -> Result<(), FlowError> {
    let marker = output_dir.join(SUCCESS_MARKER);
    if marker.exists() {
        debug!("merge phase already completed, skipping");
        return Ok(());
    }

    let parts_dir = output_dir.join(PARTS_DIR);
    if !parts_dir.is_dir() {
        return Err(FlowError::Precondition(format!(
            "parts directory {} does not exist; run the weights phase first",
            parts_dir.display()
        )));
    }
    let present: HashSet<String> = std::fs::read_dir(&parts_dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| name.ends_with(PART_SUFFIX))
        .collect();

    for (group, members) in &datasets.groups {
        let out_name = format!("{group}{PART_SUFFIX}");
        let found: Vec<&String> = members.iter()
                                         .filter(|m| present.contains(&part_name(m)))
                                         .collect();
        if found.is_empty() {
            warn!(group = %group, "no input part-files found, ignoring");
            continue;
        }
        if found.len() != members.len() {
            let missing: Vec<String> = members.iter()
                                              .filter(|m| !present.contains(&part_name(m)))
                                              .cloned()
                                              .collect();
            return Err(FlowError::IncompleteMerge { target: out_name,
                                                    missing });
        }

        let out_path = output_dir.join(&out_name);
        if found.len() == 1 {
            // Miembro único: no hay nada que combinar.
            std::fs::rename(parts_dir.join(part_name(found[0])), &out_path)?;
            info!(group = %group, "single part-file, renamed");
        } else {
            let inputs: Vec<std::path::PathBuf> =
                found.iter().map(|m| parts_dir.join(part_name(m))).collect();
            let input_refs: Vec<&Path> = inputs.iter().map(|p| p.as_path()).collect();
            debug!(group = %group, n = input_refs.len(), "combining part-files");
            combiner.combine(&out_path, &input_refs)?;
            info!(group = %group, output = %out_path.display(), "merged");
        }
    }

    std::fs::write(&marker, "")?;
    Ok(())
}

fn part_name(sample: &str) -> String {
    format!("{sample}{PART_SUFFIX}")
}

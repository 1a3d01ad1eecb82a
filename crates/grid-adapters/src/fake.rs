//! Colaboradores para tests, sin procesos ni cluster.
//!
//! `RecordingScheduler` registra los descriptors que recibiría el scheduler
//! real. `ConcatCombiner` es un combinador puro-Rust sobre part-artifacts
//! JSON: concatena tablas de eventos y suma los acumuladores del run, que es
//! exactamente la semántica que el core espera de la herramienta externa.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use grid_core::errors::FlowError;
use grid_core::external::{Combiner, Scheduler};

use crate::artifact::{Branch, PartDoc};

/// Scheduler que sólo registra las submissions.
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    submitted: Mutex<Vec<PathBuf>>,
}

impl RecordingScheduler {
    pub fn submissions(&self) -> Vec<PathBuf> {
        self.submitted.lock().unwrap().clone()
    }
}

impl Scheduler for RecordingScheduler {
    fn submit(&self, descriptor: &Path) -> Result<(), FlowError> {
        if !descriptor.is_file() {
            return Err(FlowError::ExternalTool(format!("descriptor {} does not exist",
                                                       descriptor.display())));
        }
        self.submitted.lock().unwrap().push(descriptor.to_path_buf());
        Ok(())
    }
}

/// Combinador puro-Rust de part-artifacts JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConcatCombiner;

impl Combiner for ConcatCombiner {
    fn combine(&self, output: &Path, inputs: &[&Path]) -> Result<(), FlowError> {
        if inputs.is_empty() {
            return Err(FlowError::ExternalTool("combine called with no inputs".into()));
        }
        let docs: Vec<PartDoc> = inputs.iter().map(|p| PartDoc::read(p)).collect::<Result<_, _>>()?;
        let merged = concat_docs(&docs)?;
        merged.write(output)?;
        Ok(())
    }
}

fn concat_docs(docs: &[PartDoc]) -> Result<PartDoc, FlowError> {
    let mut merged = PartDoc::default();
    merged.events.n_rows = docs.iter().map(|d| d.events.n_rows).sum();

    // Las ramas se toman del primer doc; deben existir en todos.
    for name in docs[0].events.branches.keys() {
        let branches: Vec<&Branch> = docs.iter()
                                         .map(|d| {
                                             d.events.branches.get(name).ok_or_else(|| {
                                                 FlowError::ExternalTool(format!("branch {name} missing in one input"))
                                             })
                                         })
                                         .collect::<Result<_, _>>()?;
        merged.events.branches.insert(name.clone(), concat_branch(name, &branches, docs)?);
    }

    merged.runs.sum_of_weights = docs.iter().map(|d| d.runs.sum_of_weights).sum();
    merged.runs.scale_sums = sum_variations(docs.iter().map(|d| d.runs.scale_sums.as_deref()))?;
    merged.runs.pdf_sums = sum_variations(docs.iter().map(|d| d.runs.pdf_sums.as_deref()))?;
    merged.validate()?;
    Ok(merged)
}

fn concat_branch(name: &str, branches: &[&Branch], docs: &[PartDoc]) -> Result<Branch, FlowError> {
    // Constantes idénticas en todos los inputs quedan constantes.
    if branches.iter().all(|b| *b == branches[0]) && !matches!(branches[0], Branch::PerRow(_)) {
        return Ok(branches[0].clone());
    }
    let mut values = Vec::new();
    for (branch, doc) in branches.iter().zip(docs) {
        match branch {
            Branch::PerRow(v) => values.extend_from_slice(v),
            Branch::Const { value } => values.extend(std::iter::repeat(*value).take(doc.events.n_rows)),
            Branch::ConstVec { .. } => {
                return Err(FlowError::ExternalTool(format!(
                    "branch {name}: cannot concatenate differing constant vectors"
                )));
            }
        }
    }
    Ok(Branch::PerRow(values))
}

fn sum_variations<'a, I>(sums: I) -> Result<Option<Vec<f64>>, FlowError>
    where I: Iterator<Item = Option<&'a [f64]>>
{
    let mut acc: Option<Vec<f64>> = None;
    for s in sums {
        match (s, &mut acc) {
            (None, None) => {}
            (Some(v), None) => acc = Some(v.to_vec()),
            (Some(v), Some(a)) => {
                if v.len() != a.len() {
                    return Err(FlowError::ExternalTool("variation sums length mismatch".into()));
                }
                for (x, y) in a.iter_mut().zip(v) {
                    *x += y;
                }
            }
            (None, Some(_)) => {
                return Err(FlowError::ExternalTool("variation sums present only in some inputs".into()));
            }
        }
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{EventsTable, RunsRecord};
    use indexmap::indexmap;

    fn doc(rows: usize, sumw: f64, scale: Option<Vec<f64>>) -> PartDoc {
        PartDoc { events: EventsTable { n_rows: rows,
                                        branches: indexmap! {
                                            "pt".to_string() => Branch::PerRow(vec![1.0; rows]),
                                        } },
                  runs: RunsRecord { sum_of_weights: sumw,
                                     scale_sums: scale,
                                     pdf_sums: None } }
    }

    #[test]
    fn concat_sums_rows_and_weights() {
        let merged = concat_docs(&[doc(2, 10.0, Some(vec![1.0, 2.0])),
                                   doc(3, 5.0, Some(vec![0.5, 0.5]))]).unwrap();
        assert_eq!(merged.events.n_rows, 5);
        assert_eq!(merged.runs.sum_of_weights, 15.0);
        assert_eq!(merged.runs.scale_sums, Some(vec![1.5, 2.5]));
        assert_eq!(merged.events.branches["pt"], Branch::PerRow(vec![1.0; 5]));
    }

    #[test]
    fn missing_branch_in_one_input_fails() {
        let mut b = doc(1, 1.0, None);
        b.events.branches.clear();
        let err = concat_docs(&[doc(1, 1.0, None), b]).unwrap_err();
        assert!(matches!(err, FlowError::ExternalTool(_)));
    }

    #[test]
    fn recording_scheduler_requires_existing_descriptor() {
        let sched = RecordingScheduler::default();
        assert!(sched.submit(Path::new("/no/such/file.cmd")).is_err());

        let tmp = tempfile::tempdir().unwrap();
        let desc = tmp.path().join("submit.cmd");
        std::fs::write(&desc, "queue jobid from submit.txt").unwrap();
        sched.submit(&desc).unwrap();
        assert_eq!(sched.submissions(), vec![desc]);
    }
}

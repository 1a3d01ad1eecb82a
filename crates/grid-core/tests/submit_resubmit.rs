//! Ciclo submit → logs → resubmit sobre directorios temporales.

use indexmap::IndexMap;
use std::path::Path;

use grid_core::config::{RunOptions, SubmitParams};
use grid_core::errors::FlowError;
use grid_core::planner::build_metadata;
use grid_core::submit::{prepare_resubmission, prepare_submission};

fn options(root: &Path) -> RunOptions {
    let mut opts = RunOptions::new(root.join("jobs"), root.join("out"));
    opts.files_per_job = 1;
    opts
}

fn resolved() -> IndexMap<String, Vec<String>> {
    let mut m = IndexMap::new();
    m.insert("ttbar".to_string(),
             vec!["/store/ttbar/f1.json".to_string(), "/store/ttbar/f2.json".to_string()]);
    m.insert("wjets".to_string(), vec!["/store/wjets/f1.json".to_string()]);
    m
}

fn params(root: &Path) -> SubmitParams {
    let worker = root.join("run_worker.sh");
    std::fs::write(&worker, "#!/bin/sh\n").unwrap();
    SubmitParams::new(worker)
}

#[test]
fn fresh_submission_writes_plan_ids_and_descriptor() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = options(tmp.path());
    let md = build_metadata(opts.clone(), resolved()).unwrap();
    let outcome = prepare_submission(&md, &params(tmp.path())).unwrap();

    // un job por fichero: ids densos 0..2
    assert_eq!(outcome.job_ids, vec![0, 1, 2]);
    assert_eq!(std::fs::read_to_string(&outcome.ids_file).unwrap(), "0\n1\n2");

    let descriptor = std::fs::read_to_string(&outcome.descriptor).unwrap();
    assert!(descriptor.contains("request_memory        = 2000"));
    assert!(descriptor.contains(&format!("queue jobid from {}", outcome.ids_file.display())));
    // sin modo remoto el job arranca en el directorio de pieces
    assert!(descriptor.contains("initialdir"));
    assert!(descriptor.contains("pieces"));
    assert!(!descriptor.contains("transfer_output_files"));

    // metadata persistida en jobdir y copia durable en el output
    assert!(opts.metadata_path().is_file());
    assert!(opts.output_dir.join(&opts.metadata_name).is_file());
}

#[test]
fn remote_output_disables_transfer() {
    let tmp = tempfile::tempdir().unwrap();
    let md = build_metadata(options(tmp.path()), resolved()).unwrap();
    let mut p = params(tmp.path());
    p.output_is_remote = true;
    let outcome = prepare_submission(&md, &p).unwrap();

    let descriptor = std::fs::read_to_string(&outcome.descriptor).unwrap();
    assert!(descriptor.contains("transfer_output_files = \"\""));
    // con output remoto el initialdir vuelve al jobdir
    let initial_line = descriptor.lines().find(|l| l.starts_with("initialdir")).unwrap();
    assert!(initial_line.contains("jobs"));
    assert!(!initial_line.contains("pieces"));
}

#[test]
fn existing_jobdir_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let md = build_metadata(options(tmp.path()), resolved()).unwrap();
    let p = params(tmp.path());
    prepare_submission(&md, &p).unwrap();
    let err = prepare_submission(&md, &p).unwrap_err();
    assert!(matches!(err, FlowError::Precondition(_)));
}

#[test]
fn resubmit_before_submit_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let err = prepare_resubmission(&options(tmp.path()), &params(tmp.path())).unwrap_err();
    assert!(matches!(err, FlowError::Precondition(_)));
}

#[test]
fn resubmission_is_restricted_to_failed_and_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let opts = options(tmp.path());
    let md = build_metadata(opts.clone(), resolved()).unwrap();
    let p = params(tmp.path());
    prepare_submission(&md, &p).unwrap();

    // job 0 completado, job 1 con return value != 0, job 2 sin log
    std::fs::write(opts.job_dir.join("0.log"),
                   "000 Job submitted from host <a>\n005 terminated (return value 0)\n").unwrap();
    std::fs::write(opts.job_dir.join("1.log"),
                   "000 Job submitted from host <a>\n005 terminated (return value 1)\n").unwrap();

    let first = prepare_resubmission(&opts, &p).unwrap();
    assert_eq!(first.job_ids, vec![1, 2]);
    assert!(first.ids_file.ends_with("resubmit.txt"));
    assert_eq!(std::fs::read_to_string(&first.ids_file).unwrap(), "1\n2");

    // los logs existentes no se tocan
    assert!(opts.job_dir.join("0.log").is_file());

    // sin actividad nueva, una segunda llamada produce lo mismo
    let descriptor_first = std::fs::read_to_string(&first.descriptor).unwrap();
    let second = prepare_resubmission(&opts, &p).unwrap();
    assert_eq!(second, first);
    assert_eq!(std::fs::read_to_string(&second.descriptor).unwrap(), descriptor_first);
}

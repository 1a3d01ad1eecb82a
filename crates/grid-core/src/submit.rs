//! Generación del descriptor de submission y control de re-submission.
//!
//! Una submission nueva crea el jobdir, persiste metadata y configs, y
//! escribe el descriptor más `submit.txt` con el rango completo de ids. Una
//! re-submission reutiliza metadata, jobdir y logs tal cual: recalcula el
//! subconjunto fallido vía el status tracker y sólo reescribe el fichero de
//! ids (`resubmit.txt`) y el descriptor que apunta a él.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{absolutize, RunOptions, SubmitParams};
use crate::constants::{DESCRIPTOR_FILE, RESUBMIT_IDS_FILE, SUBMIT_IDS_FILE};
use crate::errors::FlowError;
use crate::model::Metadata;
use crate::status;

/// Resultado de preparar una (re-)submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Descriptor listo para el scheduler.
    pub descriptor: PathBuf,
    /// Fichero con el subconjunto de job ids a encolar.
    pub ids_file: PathBuf,
    /// Ids del subconjunto, en orden.
    pub job_ids: Vec<usize>,
}

/// Prepara una submission nueva. Rechaza un jobdir ya existente: una ronda
/// ya sembrada sólo admite re-submission.
pub fn prepare_submission(md: &Metadata, params: &SubmitParams) -> Result<SubmitOutcome, FlowError> {
    let job_dir = &md.options.job_dir;
    if job_dir.exists() {
        return Err(FlowError::Precondition(format!(
            "jobdir {} already exists; resubmit failed jobs instead",
            job_dir.display()
        )));
    }
    std::fs::create_dir_all(job_dir)?;
    std::fs::create_dir_all(&md.job_output_dir)?;
    std::fs::create_dir_all(&md.options.output_dir)?;

    // Configs laterales: al jobdir (viajan al sandbox) y junto a las pieces.
    for (name, value) in &params.side_configs {
        let text = serde_json::to_string_pretty(value)?;
        std::fs::write(job_dir.join(name), &text)?;
        std::fs::write(md.job_output_dir.join(name), &text)?;
    }

    // Ficheros del worker y selección de ramas: copia al jobdir.
    for src in transfer_sources(params) {
        stage_file(&src, job_dir)?;
    }

    // Metadata: una vez al jobdir, más una copia durable junto al output.
    let metadata_path = md.options.metadata_path();
    md.save(&metadata_path)?;
    md.save(&md.options.output_dir.join(&md.options.metadata_name))?;

    let job_ids = md.job_ids();
    let ids_file = job_dir.join(SUBMIT_IDS_FILE);
    write_ids(&ids_file, &job_ids)?;

    let descriptor = job_dir.join(DESCRIPTOR_FILE);
    std::fs::write(&descriptor, build_descriptor(md, params, &ids_file))?;
    info!(jobs = job_ids.len(), descriptor = %descriptor.display(), "submission prepared");

    Ok(SubmitOutcome { descriptor,
                       ids_file,
                       job_ids })
}

/// Prepara una re-submission restringida al subconjunto fallido.
///
/// Reutiliza la metadata original sin cambios: los ids conservan su
/// identidad. Llamadas repetidas sin actividad nueva producen el mismo
/// subconjunto y el mismo descriptor.
pub fn prepare_resubmission(options: &RunOptions, params: &SubmitParams) -> Result<SubmitOutcome, FlowError> {
    let metadata_path = options.metadata_path();
    if !metadata_path.is_file() {
        return Err(FlowError::Precondition(format!(
            "no metadata at {}; nothing was ever submitted",
            metadata_path.display()
        )));
    }
    let md = Metadata::load(&metadata_path)?;
    let report = status::check_jobs(&md)?;
    let job_ids = report.failed.clone();
    if job_ids.is_empty() {
        warn!("no failed jobs to resubmit");
    }

    let ids_file = md.options.job_dir.join(RESUBMIT_IDS_FILE);
    write_ids(&ids_file, &job_ids)?;

    let descriptor = md.options.job_dir.join(DESCRIPTOR_FILE);
    std::fs::write(&descriptor, build_descriptor(&md, params, &ids_file))?;
    info!(jobs = job_ids.len(), "resubmission prepared");

    Ok(SubmitOutcome { descriptor,
                       ids_file,
                       job_ids })
}

/// Texto del descriptor del scheduler. Función pura: mismo plan y mismos
/// parámetros producen el mismo descriptor.
pub fn build_descriptor(md: &Metadata, params: &SubmitParams, ids_file: &Path) -> String {
    let job_dir = absolutize(&md.options.job_dir);
    let pieces_dir = absolutize(&md.job_output_dir);

    let mut transfer: Vec<PathBuf> = vec![absolutize(&md.options.metadata_path())];
    for (name, _) in &params.side_configs {
        transfer.push(job_dir.join(name));
    }
    for src in transfer_sources(params) {
        // Ya copiados al jobdir en la submission inicial.
        transfer.push(job_dir.join(file_name(&src)));
    }
    let transfer_list = transfer.iter()
                                .map(|p| p.display().to_string())
                                .collect::<Vec<_>>()
                                .join(",");

    // Con output remoto el worker coloca su salida él mismo: se desactiva la
    // auto-transferencia y el job arranca en el jobdir.
    let (initial_dir, transfer_output) = if params.output_is_remote {
        (job_dir.clone(), "transfer_output_files = \"\"".to_string())
    } else {
        (pieces_dir, String::new())
    };

    let site = params.site
                     .as_deref()
                     .map(|s| format!("+DESIRED_Sites = \"{s}\""))
                     .unwrap_or_default();
    let max_runtime = params.max_runtime_s
                            .map(|s| format!("+MaxRuntime = {s}"))
                            .unwrap_or_default();
    let extras = params.scheduler_extras.join("\n");

    format!(
        "universe              = vanilla\n\
         requirements          = (Arch == \"X86_64\") && (OpSys == \"LINUX\")\n\
         request_memory        = {request_memory}\n\
         request_disk          = {request_disk}\n\
         executable            = {executable}\n\
         arguments             = $(jobid)\n\
         transfer_input_files  = {transfer_list}\n\
         output                = {job_dir}/$(jobid).out\n\
         error                 = {job_dir}/$(jobid).err\n\
         log                   = {job_dir}/$(jobid).log\n\
         use_x509userproxy     = true\n\
         Should_Transfer_Files = YES\n\
         initialdir            = {initial_dir}\n\
         WhenToTransferOutput  = ON_EXIT\n\
         want_graceful_removal = true\n\
         periodic_release      = (NumJobStarts < 3) && ((CurrentTime - EnteredCurrentStatus) > 10*60)\n\
         {transfer_output}\n\
         {site}\n\
         {max_runtime}\n\
         {extras}\n\
         \n\
         queue jobid from {ids_file}\n",
        request_memory = params.request_memory_mb,
        request_disk = params.request_disk_kb,
        executable = absolutize(&params.worker_executable).display(),
        transfer_list = transfer_list,
        job_dir = job_dir.display(),
        initial_dir = initial_dir.display(),
        transfer_output = transfer_output,
        site = site,
        max_runtime = max_runtime,
        extras = extras,
        ids_file = absolutize(ids_file).display(),
    )
}

/// Ficheros de params que se copian al jobdir y entran a la transfer list.
fn transfer_sources(params: &SubmitParams) -> Vec<PathBuf> {
    let mut sources = params.worker_payload.clone();
    if let Some(p) = &params.branchsel_in {
        sources.push(p.clone());
    }
    if let Some(p) = &params.branchsel_out {
        sources.push(p.clone());
    }
    sources.extend(params.extra_transfer.iter().cloned());
    sources
}

fn file_name(path: &Path) -> PathBuf {
    PathBuf::from(path.file_name().unwrap_or(path.as_os_str()))
}

fn stage_file(src: &Path, job_dir: &Path) -> Result<(), FlowError> {
    std::fs::copy(src, job_dir.join(file_name(src)))?;
    Ok(())
}

fn write_ids(path: &Path, ids: &[usize]) -> Result<(), FlowError> {
    let text = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join("\n");
    std::fs::write(path, text)?;
    Ok(())
}

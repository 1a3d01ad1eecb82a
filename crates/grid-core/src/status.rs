//! Clasificación del estado de cada job a partir de su log.
//!
//! El log se escanea en reverso (evento más reciente primero) con una
//! máquina de estados explícita y regla first-match-wins:
//! 1. Marcador de terminación del scheduler ("Job removed"/"aborted"):
//!    fallo tentativo, se sigue escaneando hacia arriba.
//! 2. "Job submitted from host": frontera del intento actual. Todo lo
//!    anterior pertenece a un intento previo y se ignora.
//! 3. "return value N": N == 0 y sin fallo tentativo → completado; en otro
//!    caso fallido. Decisión final.
//! Log ausente → fallido (el job nunca arrancó o su log no llegó). Escaneo
//! agotado sin decisión → en ejecución.

use std::path::Path;
use tracing::{debug, info};

use crate::errors::FlowError;
use crate::model::{JobStatus, Metadata, StatusReport};

const MARK_REMOVED: &str = "Job removed";
const MARK_ABORTED: &str = "aborted";
const MARK_SUBMITTED: &str = "Job submitted from host";
const MARK_RETURN: &str = "return value";
const MARK_RETURN_OK: &str = "return value 0";

/// Estado del escaneo en reverso.
#[derive(Clone, Copy)]
enum ScanState {
    /// Buscando un desenlace; `termination_seen` registra un marcador de
    /// terminación del intento actual.
    Scanning { termination_seen: bool },
    /// Regla decisiva aplicada.
    Decided(JobStatus),
}

/// Clasifica el texto completo de un log.
pub fn classify_log_text(text: &str) -> JobStatus {
    let mut state = ScanState::Scanning { termination_seen: false };
    for line in text.lines().rev() {
        let ScanState::Scanning { termination_seen } = state else {
            break;
        };
        if line.contains(MARK_REMOVED) || line.contains(MARK_ABORTED) {
            state = ScanState::Scanning { termination_seen: true };
        } else if line.contains(MARK_SUBMITTED) {
            // Frontera del intento actual: decidir con lo visto hasta aquí.
            let status = if termination_seen { JobStatus::Failed } else { JobStatus::Running };
            state = ScanState::Decided(status);
        } else if line.contains(MARK_RETURN) {
            let ok = line.contains(MARK_RETURN_OK) && !termination_seen;
            let status = if ok { JobStatus::Completed } else { JobStatus::Failed };
            state = ScanState::Decided(status);
        }
    }
    match state {
        ScanState::Scanning { termination_seen: true } => JobStatus::Failed,
        ScanState::Scanning { termination_seen: false } => JobStatus::Running,
        ScanState::Decided(status) => status,
    }
}

/// Clasifica un job por id leyendo su log en el jobdir. Sin efectos
/// secundarios; repetible en cualquier momento.
pub fn classify_job(job_dir: &Path, job_id: usize) -> Result<JobStatus, FlowError> {
    let log_path = job_dir.join(format!("{job_id}.log"));
    if !log_path.is_file() {
        debug!(job = job_id, path = %log_path.display(), "log file missing");
        return Ok(JobStatus::Failed);
    }
    let text = std::fs::read_to_string(&log_path)?;
    Ok(classify_log_text(&text))
}

/// Clasifica todos los jobs del plan y verifica que los buckets particionan
/// el conjunto completo.
pub fn check_jobs(md: &Metadata) -> Result<StatusReport, FlowError> {
    let job_dir = &md.options.job_dir;
    let mut report = StatusReport::default();
    for job_id in md.job_ids() {
        match classify_job(job_dir, job_id)? {
            JobStatus::Running => report.running.push(job_id),
            JobStatus::Failed => report.failed.push(job_id),
            JobStatus::Completed => report.completed.push(job_id),
        }
    }
    if report.total() != md.n_jobs() {
        return Err(FlowError::InternalConsistency(format!(
            "status buckets cover {} jobs, plan has {}",
            report.total(),
            md.n_jobs()
        )));
    }
    info!(jobdir = %job_dir.display(), status = %report.summary(), "job status");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_value_zero_is_completed() {
        let log = "000 Job submitted from host <a>\n\
                   001 Job executing on host <b>\n\
                   005 Job terminated. Normal termination (return value 0)\n";
        assert_eq!(classify_log_text(log), JobStatus::Completed);
    }

    #[test]
    fn nonzero_return_value_is_failed() {
        let log = "000 Job submitted from host <a>\n\
                   005 Job terminated. Normal termination (return value 137)\n";
        assert_eq!(classify_log_text(log), JobStatus::Failed);
    }

    #[test]
    fn removed_marker_overrides_later_return_zero() {
        // Terminación explícita tras el return value: gana el fallo.
        let log = "000 Job submitted from host <a>\n\
                   005 Job terminated. Normal termination (return value 0)\n\
                   009 Job removed by SYSTEM_PERIODIC_REMOVE\n";
        assert_eq!(classify_log_text(log), JobStatus::Failed);
    }

    #[test]
    fn resubmit_boundary_hides_previous_attempt() {
        // abort → resubmit → return 0: sólo cuenta el intento actual.
        let log = "000 Job submitted from host <a>\n\
                   009 Job was aborted by the user\n\
                   000 Job submitted from host <a>\n\
                   005 Job terminated. Normal termination (return value 0)\n";
        assert_eq!(classify_log_text(log), JobStatus::Completed);
    }

    #[test]
    fn resubmitted_without_outcome_is_running() {
        let log = "000 Job submitted from host <a>\n\
                   009 Job was aborted by the user\n\
                   000 Job submitted from host <a>\n\
                   001 Job executing on host <b>\n";
        assert_eq!(classify_log_text(log), JobStatus::Running);
    }

    #[test]
    fn empty_log_is_running() {
        assert_eq!(classify_log_text(""), JobStatus::Running);
    }

    #[test]
    fn aborted_with_no_boundary_is_failed() {
        let log = "009 Job was aborted by the user\n";
        assert_eq!(classify_log_text(log), JobStatus::Failed);
    }

    #[test]
    fn missing_log_file_is_failed() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(classify_job(tmp.path(), 42).unwrap(), JobStatus::Failed);
    }
}

//! Configuración de una ronda de procesado.
//!
//! `RunOptions` es la parte que se persiste dentro de la metadata (y por
//! tanto entra al fingerprint del plan). `SubmitParams` son parámetros de
//! recursos/transferencia del descriptor: pueden variar entre submit y
//! resubmit sin invalidar el plan, así que viven fuera de la metadata.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::constants::METADATA_FILE;

fn default_metadata_name() -> String {
    METADATA_FILE.to_string()
}

fn default_files_per_job() -> usize {
    10
}

fn default_target_lumi() -> f64 {
    1000.0
}

/// Opciones globales de la ronda. Inmutables una vez planificado.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    /// Directorio de jobs: metadata, descriptor, ficheros de ids y logs.
    pub job_dir: PathBuf,
    /// Directorio de salida: `pieces/`, `parts/` y artifacts finales.
    pub output_dir: PathBuf,
    /// Nombre del fichero de metadata dentro del jobdir.
    #[serde(default = "default_metadata_name")]
    pub metadata_name: String,
    /// Número máximo de ficheros de entrada por job.
    #[serde(default = "default_files_per_job")]
    pub files_per_job: usize,
    /// Luminosidad objetivo (pb^-1) para el peso de sección eficaz.
    #[serde(default = "default_target_lumi")]
    pub target_lumi: f64,
    /// Opciones opacas que consume el worker (cut, módulos, compresión...).
    /// El planner no las interpreta; sólo entran al fingerprint.
    #[serde(default)]
    pub worker_options: IndexMap<String, Value>,
}

impl RunOptions {
    pub fn new(job_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self { job_dir: job_dir.into(),
               output_dir: output_dir.into(),
               metadata_name: default_metadata_name(),
               files_per_job: default_files_per_job(),
               target_lumi: default_target_lumi(),
               worker_options: IndexMap::new() }
    }

    /// Ruta del fichero de metadata persistido.
    pub fn metadata_path(&self) -> PathBuf {
        self.job_dir.join(&self.metadata_name)
    }
}

/// Parámetros del descriptor de submission (recursos + transferencia).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitParams {
    /// Ejecutable lanzado por el scheduler, una vez por job.
    pub worker_executable: PathBuf,
    /// Ficheros auxiliares del worker que viajan en la transfer list y se
    /// copian al jobdir (p.ej. el script de procesado).
    #[serde(default)]
    pub worker_payload: Vec<PathBuf>,
    /// Memoria solicitada, en MB.
    #[serde(default = "default_request_memory")]
    pub request_memory_mb: u32,
    /// Disco solicitado, en KB.
    #[serde(default = "default_request_disk")]
    pub request_disk_kb: u64,
    /// Tiempo máximo de ejecución por job, en segundos.
    #[serde(default)]
    pub max_runtime_s: Option<u64>,
    /// Restricción de site del cluster, si aplica.
    #[serde(default)]
    pub site: Option<String>,
    /// Directivas extra, copiadas literalmente al descriptor.
    #[serde(default)]
    pub scheduler_extras: Vec<String>,
    /// Ficheros adicionales a transferir al sandbox.
    #[serde(default)]
    pub extra_transfer: Vec<PathBuf>,
    /// Selección de ramas de entrada/salida del worker (se transfieren).
    #[serde(default)]
    pub branchsel_in: Option<PathBuf>,
    #[serde(default)]
    pub branchsel_out: Option<PathBuf>,
    /// El output vive en storage remoto: el descriptor desactiva la
    /// auto-transferencia de salida y el worker coloca su propio output.
    /// Interruptor explícito, nunca inferido de la ruta.
    #[serde(default)]
    pub output_is_remote: bool,
    /// Configs laterales (nombre → JSON) escritas en el jobdir y copiadas
    /// junto a las pieces.
    #[serde(default)]
    pub side_configs: IndexMap<String, Value>,
}

fn default_request_memory() -> u32 {
    2000
}

fn default_request_disk() -> u64 {
    10_000_000
}

impl SubmitParams {
    pub fn new(worker_executable: impl Into<PathBuf>) -> Self {
        Self { worker_executable: worker_executable.into(),
               worker_payload: Vec::new(),
               request_memory_mb: default_request_memory(),
               request_disk_kb: default_request_disk(),
               max_runtime_s: None,
               site: None,
               scheduler_extras: Vec::new(),
               extra_transfer: Vec::new(),
               branchsel_in: None,
               branchsel_out: None,
               output_is_remote: false,
               side_configs: IndexMap::new() }
    }
}

/// Expande una ruta a absoluta respecto al cwd (las transfer lists del
/// scheduler requieren rutas absolutas).
pub(crate) fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map(|cwd| cwd.join(path))
                               .unwrap_or_else(|_| path.to_path_buf())
    }
}

//! grid-core: Coordinador determinista de lotes de post-procesado.
//!
//! Este crate cubre el ciclo completo de una ronda de procesado sobre un
//! cluster batch estilo HTCondor:
//! - Resolución de muestras a listas de ficheros de entrada (`resolver`).
//! - Particionado en jobs de tamaño fijo y metadata persistida (`planner`).
//! - Generación del descriptor de submission y re-submission (`submit`).
//! - Clasificación de estado por job a partir de su log (`status`).
//! - Reconciliación y merge de salidas parciales (`merge`).
//! - Anotación de pesos de sección eficaz (`weights`, `xsec`).
//!
//! El core no ejecuta herramientas externas directamente: el scheduler, el
//! combinador de artifacts y el formato concreto de artifact quedan detrás de
//! los traits de `external`, de modo que toda la lógica es testeable con
//! fakes (ver `grid-adapters`).
pub mod config;
pub mod constants;
pub mod errors;
pub mod external;
pub mod hashing;
pub mod merge;
pub mod model;
pub mod planner;
pub mod resolver;
pub mod status;
pub mod submit;
pub mod util;
pub mod weights;
pub mod xsec;

pub use config::{RunOptions, SubmitParams};
pub use errors::FlowError;
pub use external::{ArtifactStore, Combiner, PartArtifact, Scheduler};
pub use model::{DatasetFile, Job, JobStatus, Metadata, StatusReport};
pub use resolver::SampleFilter;
pub use xsec::{XsecEntry, XsecTable};

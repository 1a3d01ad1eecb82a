//! Constantes del coordinador.
//!
//! Nombres de fichero y sufijos que forman parte del contrato en disco entre
//! las fases (submit → status → weights → merge). Cambiarlos invalida
//! directorios de jobs ya creados, así que se mantienen estables.

/// Versión lógica del planner. Entra en el fingerprint de la metadata para
/// que un cambio incompatible de planificado invalide reproducibilidad de
/// forma explícita.
pub const PLANNER_VERSION: &str = "1.0";

/// Nombre por defecto del fichero de metadata dentro del jobdir.
pub const METADATA_FILE: &str = "metadata.json";

/// Fichero con el rango completo de job ids (submission inicial).
pub const SUBMIT_IDS_FILE: &str = "submit.txt";

/// Fichero con el subconjunto de job ids fallidos (re-submission).
pub const RESUBMIT_IDS_FILE: &str = "resubmit.txt";

/// Descriptor consumido por el scheduler.
pub const DESCRIPTOR_FILE: &str = "submit.cmd";

/// Subdirectorio del output con las salidas por job (una por chunk).
pub const PIECES_DIR: &str = "pieces";

/// Subdirectorio del output con las salidas por muestra, ya combinadas.
pub const PARTS_DIR: &str = "parts";

/// Marcador durable de fase completada (weights o merge).
pub const SUCCESS_MARKER: &str = ".success";

/// Sufijo de los artifacts producidos por el worker y por el merge.
pub const PART_SUFFIX: &str = "_tree.json";

/// Rama de peso por sección eficaz añadida por el anotador.
pub const XSEC_BRANCH: &str = "xsecWeight";

/// Rama de renormalización de variaciones de escala.
pub const SCALE_NORM_BRANCH: &str = "scaleWeightNorm";

/// Rama de renormalización de variaciones de PDF.
pub const PDF_NORM_BRANCH: &str = "pdfWeightNorm";

//! Errores del coordinador (taxonomía completa, ver diseño de fases).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    /// Configuración inválida: chunk size cero, regex malformada, tabla de
    /// xsec inconsistente.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Operación invocada fuera de orden (p.ej. resubmit antes de submit).
    #[error("precondition failed: {0}")]
    Precondition(String),
    /// Un grupo de merge tiene miembros requeridos sin part-file presente.
    /// Nunca se hace merge parcial.
    #[error("incomplete inputs for merging {target}, missing: {missing:?}")]
    IncompleteMerge { target: String, missing: Vec<String> },
    /// Muestra simulada sin entrada en la tabla de secciones eficaces.
    #[error("no cross section found for sample {0}")]
    MissingXsec(String),
    /// El scheduler o el combinador terminaron con error (exit code o token
    /// de fallo en su salida).
    #[error("external tool failed: {0}")]
    ExternalTool(String),
    /// Violación de un invariante interno (p.ej. los buckets de estado no
    /// particionan el conjunto de jobs). No es recuperable.
    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

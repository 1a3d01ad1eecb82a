//! Clasificación de estado por job.
//!
//! `JobStatus` es derivado, nunca almacenado: se recalcula del log del job en
//! cada consulta. Los tres buckets de `StatusReport` deben particionar el
//! conjunto completo de jobs; una violación es fallo de lógica interna, no
//! una condición recuperable.

use serde::{Deserialize, Serialize};

/// Estado terminal (o no) de un job, derivado de su log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Sin desenlace registrado todavía.
    Running,
    /// Terminado con error, abortado, o log ausente.
    Failed,
    /// Worker terminó con return code 0.
    Completed,
}

/// Particionado del conjunto de jobs en buckets por estado.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub running: Vec<usize>,
    pub failed: Vec<usize>,
    pub completed: Vec<usize>,
}

impl StatusReport {
    pub fn total(&self) -> usize {
        self.running.len() + self.failed.len() + self.completed.len()
    }

    pub fn all_completed(&self) -> bool {
        self.running.is_empty() && self.failed.is_empty()
    }

    /// Resumen compacto para logging: sólo los buckets no vacíos.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.running.is_empty() {
            parts.push(format!("running: {}", self.running.len()));
        }
        if !self.failed.is_empty() {
            parts.push(format!("failed: {}", self.failed.len()));
        }
        if !self.completed.is_empty() {
            parts.push(format!("completed: {}", self.completed.len()));
        }
        parts.join(", ")
    }
}

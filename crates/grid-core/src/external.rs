//! Traits de capacidad hacia los colaboradores externos.
//!
//! El core nunca lanza procesos ni interpreta formatos de artifact: el
//! scheduler, el combinador y el formato concreto de part-artifact quedan
//! detrás de estos traits. `grid-adapters` aporta las implementaciones
//! reales (subprocesos, JSON) y fakes para tests.

use std::path::Path;

use crate::errors::FlowError;

/// Scheduler batch: consume un descriptor ya escrito en disco.
pub trait Scheduler {
    /// Encola los jobs descritos por `descriptor`. Exit code distinto de
    /// cero se reporta como `ExternalTool`.
    fn submit(&self, descriptor: &Path) -> Result<(), FlowError>;
}

/// Herramienta de merge de artifacts (operación opaca).
pub trait Combiner {
    /// Combina `inputs` en `output`. Exit code distinto de cero o un token
    /// de fallo en su salida se reportan como `ExternalTool`. Re-intentos
    /// sobreescriben `output`, nunca duplican.
    fn combine(&self, output: &Path, inputs: &[&Path]) -> Result<(), FlowError>;
}

/// Un artifact parcial abierto para anotación de pesos.
///
/// Modela lo mínimo que el anotador necesita: los acumuladores de pesos del
/// run, el número de filas de la tabla de eventos, y la escritura de ramas
/// de valor constante. Nunca altera ramas existentes.
pub trait PartArtifact {
    /// Suma de pesos de generador del run.
    fn sum_of_weights(&self) -> f64;
    /// Sumas por variación de escala, si el artifact las trae.
    fn scale_sums(&self) -> Option<Vec<f64>>;
    /// Sumas por variación de PDF, si el artifact las trae.
    fn pdf_sums(&self) -> Option<Vec<f64>>;
    /// Número de filas de la tabla de eventos.
    fn n_rows(&self) -> usize;
    /// Añade una rama escalar constante (mismo valor en cada fila).
    fn set_scalar_branch(&mut self, name: &str, value: f64) -> Result<(), FlowError>;
    /// Añade una rama vectorial constante (mismo vector en cada fila).
    fn set_vector_branch(&mut self, name: &str, values: &[f64]) -> Result<(), FlowError>;
    /// Escribe el artifact de vuelta a disco.
    fn save(&mut self) -> Result<(), FlowError>;
}

/// Apertura de part-artifacts por ruta.
pub trait ArtifactStore {
    fn open(&self, path: &Path) -> Result<Box<dyn PartArtifact>, FlowError>;
}

//! Part-artifacts JSON.
//!
//! El formato conserva la estructura Runs/Events del worker: una tabla de
//! eventos (`n_rows` + ramas nombradas) y un registro del run con los
//! acumuladores de pesos. Las ramas pueden ser por-fila, escalares
//! constantes o vectores constantes; el anotador de pesos sólo añade de las
//! dos últimas clases.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use grid_core::errors::FlowError;
use grid_core::external::{ArtifactStore, PartArtifact};

/// Una rama de la tabla de eventos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Branch {
    /// Un valor por fila.
    PerRow(Vec<f64>),
    /// Escalar constante, replicado lógicamente en cada fila.
    Const { value: f64 },
    /// Vector constante, replicado lógicamente en cada fila.
    ConstVec { values: Vec<f64> },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventsTable {
    pub n_rows: usize,
    #[serde(default)]
    pub branches: IndexMap<String, Branch>,
}

/// Acumuladores de pesos del run (suma nominal y por variación).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunsRecord {
    pub sum_of_weights: f64,
    #[serde(default)]
    pub scale_sums: Option<Vec<f64>>,
    #[serde(default)]
    pub pdf_sums: Option<Vec<f64>>,
}

/// Documento completo de un part-artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartDoc {
    pub events: EventsTable,
    pub runs: RunsRecord,
}

impl PartDoc {
    /// Verifica que las ramas por-fila cuadran con `n_rows`.
    pub fn validate(&self) -> Result<(), FlowError> {
        for (name, branch) in &self.events.branches {
            if let Branch::PerRow(values) = branch {
                if values.len() != self.events.n_rows {
                    return Err(FlowError::Config(format!(
                        "branch {name} has {} values for {} rows",
                        values.len(),
                        self.events.n_rows
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn write(&self, path: &Path) -> Result<(), FlowError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, FlowError> {
        let text = std::fs::read_to_string(path)?;
        let doc: PartDoc = serde_json::from_str(&text)?;
        doc.validate()?;
        Ok(doc)
    }
}

/// Un part-artifact JSON abierto para anotación.
#[derive(Debug)]
pub struct JsonPartFile {
    path: PathBuf,
    doc: PartDoc,
}

impl JsonPartFile {
    pub fn open(path: &Path) -> Result<Self, FlowError> {
        Ok(Self { path: path.to_path_buf(),
                  doc: PartDoc::read(path)? })
    }

    pub fn doc(&self) -> &PartDoc {
        &self.doc
    }
}

impl PartArtifact for JsonPartFile {
    fn sum_of_weights(&self) -> f64 {
        self.doc.runs.sum_of_weights
    }

    fn scale_sums(&self) -> Option<Vec<f64>> {
        self.doc.runs.scale_sums.clone()
    }

    fn pdf_sums(&self) -> Option<Vec<f64>> {
        self.doc.runs.pdf_sums.clone()
    }

    fn n_rows(&self) -> usize {
        self.doc.events.n_rows
    }

    fn set_scalar_branch(&mut self, name: &str, value: f64) -> Result<(), FlowError> {
        // Reemplaza si ya existe: un re-intento tras crash sobreescribe.
        self.doc.events.branches.insert(name.to_string(), Branch::Const { value });
        Ok(())
    }

    fn set_vector_branch(&mut self, name: &str, values: &[f64]) -> Result<(), FlowError> {
        self.doc.events.branches.insert(name.to_string(), Branch::ConstVec { values: values.to_vec() });
        Ok(())
    }

    fn save(&mut self) -> Result<(), FlowError> {
        self.doc.write(&self.path)
    }
}

/// Apertura de part-artifacts JSON por ruta.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonArtifactStore;

impl ArtifactStore for JsonArtifactStore {
    fn open(&self, path: &Path) -> Result<Box<dyn PartArtifact>, FlowError> {
        Ok(Box::new(JsonPartFile::open(path)?))
    }
}

//! Definición de datasets: grupos de salida y sus muestras miembro.
//!
//! El fichero de datasets (JSON) declara:
//! - `list`: nombre de la colección de list-files (un subdirectorio del
//!   listdir, con un `<muestra>.list` por muestra).
//! - `groups`: grupo de salida → muestras requeridas para su merge.
//! - `data`: muestras que son datos reales (flag explícito; sustituye a la
//!   heurística por separadores en el nombre de la muestra).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::FlowError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    /// Nombre de la colección de list-files.
    pub list: String,
    /// Grupo de salida → muestras miembro, en orden de declaración.
    pub groups: IndexMap<String, Vec<String>>,
    /// Muestras de datos reales (sin peso de sección eficaz).
    #[serde(default)]
    pub data: Vec<String>,
}

impl DatasetFile {
    pub fn load(path: &Path) -> Result<Self, FlowError> {
        let text = std::fs::read_to_string(path)?;
        let ds: DatasetFile = serde_json::from_str(&text)?;
        if ds.list.is_empty() {
            return Err(FlowError::Config(format!("dataset file {} has an empty list name",
                                                 path.display())));
        }
        Ok(ds)
    }

    /// Todas las muestras declaradas, sin duplicados, en orden de grupo.
    pub fn samples(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for members in self.groups.values() {
            for samp in members {
                if !seen.contains(samp) {
                    seen.push(samp.clone());
                }
            }
        }
        seen
    }

    /// Ruta del list-file de una muestra, relativa al listdir.
    pub fn list_file(&self, sample: &str) -> PathBuf {
        PathBuf::from(&self.list).join(format!("{sample}.list"))
    }

    /// Flag explícito de datos reales.
    pub fn is_data(&self, sample: &str) -> bool {
        self.data.iter().any(|s| s == sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;

    fn dataset() -> DatasetFile {
        DatasetFile { list: "v9".into(),
                      groups: indexmap! {
                          "qcd".to_string() => vec!["qcd-ht500".to_string(), "qcd-ht700".to_string()],
                          "jetht".to_string() => vec!["jetht2018a".to_string()],
                      },
                      data: vec!["jetht2018a".into()] }
    }

    #[test]
    fn samples_follow_group_order() {
        assert_eq!(dataset().samples(), vec!["qcd-ht500", "qcd-ht700", "jetht2018a"]);
    }

    #[test]
    fn list_file_layout() {
        assert_eq!(dataset().list_file("qcd-ht500"), PathBuf::from("v9/qcd-ht500.list"));
    }

    #[test]
    fn data_flag_is_explicit() {
        let ds = dataset();
        assert!(ds.is_data("jetht2018a"));
        assert!(!ds.is_data("qcd-ht500"));
    }
}

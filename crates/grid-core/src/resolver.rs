//! Resolución de muestras a listas de ficheros de entrada.
//!
//! Cada muestra declarada en el dataset file se resuelve leyendo su
//! list-file (`<listdir>/<list>/<muestra>.list`, una ruta por línea).
//! Muestras sin list-file o con lista vacía se descartan en silencio: no es
//! un error, simplemente no participan en la ronda. La salida queda en orden
//! natural estable (muestras y ficheros), condición necesaria para que el
//! planner sea reproducible.

use indexmap::IndexMap;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use crate::errors::FlowError;
use crate::model::DatasetFile;
use crate::util::{natural_cmp, natural_sort};

/// Filtro include/exclude sobre nombres de muestra.
///
/// Precedencia: si hay patrones de selección, son exclusivos (sólo
/// sobreviven muestras que matchean alguno); si no, se aplican los vetos.
#[derive(Debug, Default)]
pub struct SampleFilter {
    select: Vec<Regex>,
    ignore: Vec<Regex>,
}

impl SampleFilter {
    pub fn new(select: &[String], ignore: &[String]) -> Result<Self, FlowError> {
        Ok(Self { select: compile(select)?,
                  ignore: compile(ignore)? })
    }

    /// Filtro vacío: deja pasar todo.
    pub fn pass_all() -> Self {
        Self::default()
    }

    pub fn keeps(&self, sample: &str) -> bool {
        if !self.select.is_empty() {
            return self.select.iter().any(|re| re.is_match(sample));
        }
        !self.ignore.iter().any(|re| re.is_match(sample))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, FlowError> {
    patterns.iter()
            .map(|p| {
                Regex::new(p).map_err(|e| FlowError::Config(format!("bad sample pattern '{p}': {e}")))
            })
            .collect()
}

/// Resuelve `muestra -> [ficheros]` para las muestras que pasan el filtro y
/// tienen lista no vacía.
pub fn resolve_inputs(datasets: &DatasetFile,
                      list_dir: &Path,
                      filter: &SampleFilter)
                      -> Result<IndexMap<String, Vec<String>>, FlowError> {
    let mut samples: Vec<String> = datasets.samples()
                                           .into_iter()
                                           .filter(|s| {
                                               let keep = filter.keeps(s);
                                               if !keep {
                                                   debug!(sample = %s, "filtered out");
                                               }
                                               keep
                                           })
                                           .collect();
    samples.sort_by(|a, b| natural_cmp(a, b));

    let mut resolved = IndexMap::new();
    for sample in samples {
        let list_path = list_dir.join(datasets.list_file(&sample));
        if !list_path.is_file() {
            debug!(sample = %sample, path = %list_path.display(), "list file missing, skipping");
            continue;
        }
        let mut files: Vec<String> = std::fs::read_to_string(&list_path)?
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if files.is_empty() {
            debug!(sample = %sample, "empty list file, skipping");
            continue;
        }
        natural_sort(&mut files);
        resolved.insert(sample, files);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;

    fn dataset() -> DatasetFile {
        DatasetFile { list: "v9".into(),
                      groups: indexmap! {
                          "sig".to_string() => vec!["ttbar".to_string(), "wjets-ht100".to_string()],
                          "obs".to_string() => vec!["jetht2018a".to_string()],
                      },
                      data: vec!["jetht2018a".into()] }
    }

    fn write_list(dir: &Path, ds: &DatasetFile, sample: &str, files: &[&str]) {
        let path = dir.join(ds.list_file(sample));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, files.join("\n")).unwrap();
    }

    #[test]
    fn select_wins_over_ignore() {
        let f = SampleFilter::new(&["ttbar".into()], &["ttbar".into()]).unwrap();
        assert!(f.keeps("ttbar"));
        assert!(!f.keeps("wjets-ht100"));
    }

    #[test]
    fn ignore_applies_without_select() {
        let f = SampleFilter::new(&[], &["^wjets".into()]).unwrap();
        assert!(f.keeps("ttbar"));
        assert!(!f.keeps("wjets-ht100"));
    }

    #[test]
    fn bad_pattern_is_config_error() {
        let err = SampleFilter::new(&["(".into()], &[]).unwrap_err();
        assert!(matches!(err, FlowError::Config(_)));
    }

    #[test]
    fn missing_and_empty_lists_are_dropped_silently() {
        let tmp = tempfile::tempdir().unwrap();
        let ds = dataset();
        write_list(tmp.path(), &ds, "ttbar", &["/store/f10.json", "/store/f2.json"]);
        write_list(tmp.path(), &ds, "wjets-ht100", &["", "  "]);
        // jetht2018a no tiene list-file

        let resolved = resolve_inputs(&ds, tmp.path(), &SampleFilter::pass_all()).unwrap();
        assert_eq!(resolved.keys().collect::<Vec<_>>(), vec!["ttbar"]);
        // orden natural: f2 antes que f10
        assert_eq!(resolved["ttbar"], vec!["/store/f2.json", "/store/f10.json"]);
    }
}

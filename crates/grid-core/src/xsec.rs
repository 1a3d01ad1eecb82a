//! Tabla de secciones eficaces por muestra.
//!
//! Formato de línea (orientado a líneas, `#` comenta): tokens separados por
//! whitespace, entre ellos una ruta de dataset (`/<sample>/.../MINIAOD[SIM]`
//! o `NANOAOD[SIM]`) y un valor numérico o expresión aritmética. Un dataset
//! sin sufijo `SIM` es de datos reales y no lleva sección eficaz.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{error, warn};

use crate::errors::FlowError;

static AOD_TIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(MINI|NANO)AOD(SIM)?").unwrap());

/// Entrada de la tabla: sección eficaz de simulación, o marcador de datos.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XsecEntry {
    Simulation(f64),
    Data,
}

/// Muestra → sección eficaz. Construida una vez desde config; inmutable.
#[derive(Debug, Clone, Default)]
pub struct XsecTable {
    entries: IndexMap<String, XsecEntry>,
}

impl XsecTable {
    pub fn load(path: &Path) -> Result<Self, FlowError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, FlowError> {
        let mut table = XsecTable::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut sample = None;
            let mut xsec = None;
            let mut is_data = false;
            for tok in line.split_whitespace() {
                if let Some(caps) = AOD_TIER.captures(tok) {
                    sample = tok.split('/').nth(1).map(str::to_string);
                    if caps.get(2).is_none() {
                        is_data = true;
                        break;
                    }
                } else if let Ok(v) = tok.parse::<f64>() {
                    xsec = Some(v);
                } else if let Ok(v) = eval_expr(tok) {
                    xsec = Some(v);
                }
            }
            let Some(sample) = sample else {
                warn!(line, "ignoring xsec line without dataset path");
                continue;
            };
            let entry = if is_data {
                XsecEntry::Data
            } else if let Some(v) = xsec {
                XsecEntry::Simulation(v)
            } else {
                error!(line, sample = %sample, "cannot find cross section");
                continue;
            };
            table.insert(sample.clone(), entry)?;
            // Las variantes PSweights comparten sección eficaz con la nominal.
            if sample.contains("PSweights_") {
                table.insert(sample.replace("PSweights_", ""), entry)?;
            }
        }
        Ok(table)
    }

    fn insert(&mut self, sample: String, entry: XsecEntry) -> Result<(), FlowError> {
        if let Some(existing) = self.entries.get(&sample) {
            if *existing != entry {
                return Err(FlowError::Config(format!("inconsistent xsec entries for sample {sample}")));
            }
        }
        self.entries.insert(sample, entry);
        Ok(())
    }

    pub fn get(&self, sample: &str) -> Option<&XsecEntry> {
        self.entries.get(sample)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Evalúa una expresión aritmética en coma flotante: `+ - * /`, paréntesis,
/// menos unario, notación científica. Descenso recursivo, sin variables.
pub fn eval_expr(input: &str) -> Result<f64, FlowError> {
    let mut parser = ExprParser { input, pos: 0 };
    let value = parser.parse_expr()?;
    parser.expect_end()?;
    Ok(value)
}

struct ExprParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ExprParser<'a> {
    fn skip_whitespace(&mut self) {
        while self.input[self.pos..].starts_with(' ') {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        self.skip_whitespace();
        let c = self.input[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect_end(&mut self) -> Result<(), FlowError> {
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(FlowError::Config(format!("trailing input in expression: {:?}",
                                                 &self.input[self.pos..])));
        }
        Ok(())
    }

    /// Suma y resta (menor precedencia).
    fn parse_expr(&mut self) -> Result<f64, FlowError> {
        let mut left = self.parse_term()?;
        loop {
            match self.peek() {
                Some('+') => {
                    self.advance();
                    left += self.parse_term()?;
                }
                Some('-') => {
                    self.advance();
                    left -= self.parse_term()?;
                }
                _ => return Ok(left),
            }
        }
    }

    /// Producto y división.
    fn parse_term(&mut self) -> Result<f64, FlowError> {
        let mut left = self.parse_factor()?;
        loop {
            match self.peek() {
                Some('*') => {
                    self.advance();
                    left *= self.parse_factor()?;
                }
                Some('/') => {
                    self.advance();
                    left /= self.parse_factor()?;
                }
                _ => return Ok(left),
            }
        }
    }

    /// Número, paréntesis o menos unario.
    fn parse_factor(&mut self) -> Result<f64, FlowError> {
        match self.peek() {
            Some('-') => {
                self.advance();
                Ok(-self.parse_factor()?)
            }
            Some('(') => {
                self.advance();
                let value = self.parse_expr()?;
                match self.advance() {
                    Some(')') => Ok(value),
                    _ => Err(FlowError::Config("unbalanced parenthesis in expression".into())),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(),
            other => Err(FlowError::Config(format!("unexpected token in expression: {other:?}"))),
        }
    }

    fn parse_number(&mut self) -> Result<f64, FlowError> {
        self.skip_whitespace();
        let start = self.pos;
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() && (bytes[self.pos].is_ascii_digit() || bytes[self.pos] == b'.') {
            self.pos += 1;
        }
        // Exponente opcional: e / E con signo.
        if self.pos < bytes.len() && (bytes[self.pos] == b'e' || bytes[self.pos] == b'E') {
            let mut end = self.pos + 1;
            if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
                end += 1;
            }
            if end < bytes.len() && bytes[end].is_ascii_digit() {
                self.pos = end;
                while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
                    self.pos += 1;
                }
            }
        }
        self.input[start..self.pos].parse::<f64>()
                                   .map_err(|e| FlowError::Config(format!("bad number in expression: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_plain_and_scientific() {
        assert_eq!(eval_expr("2.5").unwrap(), 2.5);
        assert_eq!(eval_expr("1e-3").unwrap(), 0.001);
    }

    #[test]
    fn eval_precedence_and_parens() {
        assert_eq!(eval_expr("1+2*3").unwrap(), 7.0);
        assert_eq!(eval_expr("(1+2)*3").unwrap(), 9.0);
        assert_eq!(eval_expr("0.5*831.76*0.1").unwrap(), 0.5 * 831.76 * 0.1);
    }

    #[test]
    fn eval_rejects_garbage() {
        assert!(eval_expr("QCD_HT500").is_err());
        assert!(eval_expr("(1+2").is_err());
    }

    #[test]
    fn parse_simulation_and_data_lines() {
        let cfg = "# comentario\n\
                   /qcd-ht500/campaign-v9/NANOAODSIM 2.5\n\
                   /jetht2018a/run2018/NANOAOD\n";
        let table = XsecTable::parse(cfg).unwrap();
        assert_eq!(table.get("qcd-ht500"), Some(&XsecEntry::Simulation(2.5)));
        assert_eq!(table.get("jetht2018a"), Some(&XsecEntry::Data));
        assert_eq!(table.get("unknown"), None);
    }

    #[test]
    fn parse_expression_value() {
        let cfg = "/ttbar/campaign-v9/MINIAODSIM 0.5*831.76\n";
        let table = XsecTable::parse(cfg).unwrap();
        assert_eq!(table.get("ttbar"), Some(&XsecEntry::Simulation(0.5 * 831.76)));
    }

    #[test]
    fn psweights_alias_shares_xsec() {
        let cfg = "/PSweights_ttbar/campaign-v9/MINIAODSIM 831.76\n";
        let table = XsecTable::parse(cfg).unwrap();
        assert_eq!(table.get("ttbar"), Some(&XsecEntry::Simulation(831.76)));
    }

    #[test]
    fn inconsistent_duplicate_is_config_error() {
        let cfg = "/ttbar/a/MINIAODSIM 1.0\n/ttbar/b/MINIAODSIM 2.0\n";
        assert!(matches!(XsecTable::parse(cfg), Err(FlowError::Config(_))));
    }
}

//! Scheduler y combinador reales, como subprocesos.
//!
//! Criterio de fallo uniforme para ambas herramientas: exit code distinto de
//! cero, o un token "error"/"fail" (case-insensitive) en cualquier punto de
//! su salida combinada stdout+stderr.

use std::path::Path;
use std::process::Command;
use tracing::{debug, error};

use grid_core::errors::FlowError;
use grid_core::external::{Combiner, Scheduler};

/// Scheduler batch vía `condor_submit` (o compatible).
#[derive(Debug, Clone)]
pub struct CondorScheduler {
    pub command: String,
}

impl Default for CondorScheduler {
    fn default() -> Self {
        Self { command: "condor_submit".to_string() }
    }
}

impl Scheduler for CondorScheduler {
    fn submit(&self, descriptor: &Path) -> Result<(), FlowError> {
        debug!(descriptor = %descriptor.display(), "submitting");
        let output = Command::new(&self.command).arg(descriptor).output()?;
        check_tool_output(&self.command, &output)
    }
}

/// Combinador de artifacts vía herramienta externa estilo hadd:
/// `<cmd> <output> <input>...`.
#[derive(Debug, Clone)]
pub struct HaddCombiner {
    pub command: String,
}

impl Default for HaddCombiner {
    fn default() -> Self {
        Self { command: "haddnano.py".to_string() }
    }
}

impl Combiner for HaddCombiner {
    fn combine(&self, output: &Path, inputs: &[&Path]) -> Result<(), FlowError> {
        debug!(output = %output.display(), n = inputs.len(), "combining");
        let out = Command::new(&self.command).arg(output).args(inputs).output()?;
        check_tool_output(&self.command, &out)
    }
}

fn check_tool_output(tool: &str, output: &std::process::Output) -> Result<(), FlowError> {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    let text = text.trim();
    if !output.status.success() {
        error!(tool, status = %output.status, "external tool failed");
        return Err(FlowError::ExternalTool(format!("{tool} exited with {}: {text}", output.status)));
    }
    let lower = text.to_lowercase();
    if lower.contains("error") || lower.contains("fail") {
        error!(tool, "failure token in tool output");
        return Err(FlowError::ExternalTool(format!("{tool} reported a failure: {text}")));
    }
    Ok(())
}

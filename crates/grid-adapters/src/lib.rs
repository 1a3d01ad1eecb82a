//! grid-adapters: colaboradores concretos del coordinador.
//!
//! Este crate provee:
//! - `process`: scheduler y combinador reales como subprocesos
//!   (condor_submit / herramienta hadd), con detección de tokens de fallo
//!   en su salida.
//! - `artifact`: part-artifacts JSON (tabla de eventos + acumuladores del
//!   run) implementando el trait `PartArtifact` del core.
//! - `fake`: colaboradores en memoria / puro-Rust para tests, al estilo de
//!   los stores in-memory del core.
//!
//! El core sólo conoce los traits de `grid_core::external`; aquí viven las
//! implementaciones con efectos.

pub mod artifact;
pub mod fake;
pub mod process;

pub use artifact::{Branch, EventsTable, JsonArtifactStore, JsonPartFile, PartDoc, RunsRecord};
pub use fake::{ConcatCombiner, RecordingScheduler};
pub use process::{CondorScheduler, HaddCombiner};

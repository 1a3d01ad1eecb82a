//! Tipos de datos del coordinador.

pub mod dataset;
pub mod metadata;
pub mod status;

pub use dataset::DatasetFile;
pub use metadata::{Job, Metadata};
pub use status::{JobStatus, StatusReport};

mod service;

pub use service::{ArchiveExporter, ExportArchive};

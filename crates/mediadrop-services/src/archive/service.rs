use mediadrop_core::AppError;
use mediadrop_storage::{walk_files, WalkedFile};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use zip::result::ZipError;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

const COPY_BUFFER_SIZE: usize = 8 * 1024;
const ARCHIVE_PREFIX: &str = "uploads_export_";

/// A finished archive on disk.
///
/// The file is deleted when `path` is dropped, so callers keep this value
/// alive until the archive has been fully sent.
#[derive(Debug)]
pub struct ExportArchive {
    pub path: TempPath,
    pub entries: usize,
    pub size: u64,
}

impl ExportArchive {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Builds a zip of everything below the upload root
#[derive(Debug, Clone)]
pub struct ArchiveExporter {
    root: PathBuf,
    export_dir: Option<PathBuf>,
}

impl ArchiveExporter {
    /// `export_dir` holds the transient archive; `None` uses the system temp dir.
    pub fn new(root: impl Into<PathBuf>, export_dir: Option<PathBuf>) -> Self {
        Self {
            root: root.into(),
            export_dir,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a Deflate-compressed zip whose entry names are the paths of
    /// stored files relative to the upload root.
    ///
    /// Returns [`AppError::NothingToExport`] when the root holds no files.
    pub async fn export(&self) -> Result<ExportArchive, AppError> {
        let exporter = self.clone();
        tokio::task::spawn_blocking(move || exporter.export_blocking())
            .await
            .map_err(|e| AppError::Internal(format!("Export task failed: {}", e)))?
    }

    fn export_blocking(&self) -> Result<ExportArchive, AppError> {
        let start = std::time::Instant::now();
        let files = walk_files(&self.root)
            .map_err(|e| AppError::io("Failed to scan upload directory", e))?;
        if files.is_empty() {
            return Err(AppError::NothingToExport);
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix(ARCHIVE_PREFIX).suffix(".zip");
        let mut tmp = match &self.export_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .map_err(|e| AppError::io("Failed to create export directory", e))?;
                builder.tempfile_in(dir)
            }
            None => builder.tempfile(),
        }
        .map_err(|e| AppError::io("Failed to create export archive", e))?;

        let entries = write_zip(tmp.as_file_mut(), &files)?;
        let path = tmp.into_temp_path();
        let size = std::fs::metadata(&path)
            .map_err(|e| AppError::io("Failed to read export archive metadata", e))?
            .len();

        tracing::info!(
            root = %self.root.display(),
            entries = entries,
            archive_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Export archive created"
        );

        Ok(ExportArchive {
            path,
            entries,
            size,
        })
    }
}

fn write_zip(out: &mut File, files: &[WalkedFile]) -> Result<usize, AppError> {
    let mut zip = ZipWriter::new(BufWriter::new(out));
    let mut entries = 0;

    for file in files {
        let source = match File::open(&file.path) {
            Ok(source) => source,
            // Removed between the scan and now.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %file.path.display(), "Skipping file that disappeared");
                continue;
            }
            Err(e) => return Err(AppError::io(format!("Failed to open {}", file.relative_name), e)),
        };

        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644)
            .large_file(file.size >= u32::MAX as u64);

        zip.start_file(file.relative_name.as_str(), options)
            .map_err(|e| zip_error("Failed to add entry to archive", e))?;
        let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, source);
        io::copy(&mut reader, &mut zip).map_err(|e| {
            AppError::io(format!("Failed to write {} to archive", file.relative_name), e)
        })?;
        entries += 1;
    }

    if entries == 0 {
        return Err(AppError::NothingToExport);
    }

    let mut writer = zip
        .finish()
        .map_err(|e| zip_error("Failed to finalize archive", e))?;
    writer
        .flush()
        .map_err(|e| AppError::io("Failed to flush archive", e))?;

    Ok(entries)
}

fn zip_error(context: &str, err: ZipError) -> AppError {
    match err {
        ZipError::Io(e) => AppError::io(context, e),
        other => AppError::io(context, io::Error::other(other.to_string())),
    }
}

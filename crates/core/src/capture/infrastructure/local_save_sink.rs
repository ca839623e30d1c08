use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::capture::domain::capture_sink::{CaptureError, CaptureSink, Snapshot};
use crate::shared::constants::CAPTURE_FILE_NAME;

use super::png_encoder::encode_png;

/// Saves snapshots as PNG files in a directory.
///
/// The first capture is `captured_image.png`; later ones are numbered
/// `captured_image (1).png`, `captured_image (2).png`, and so on.
/// Existing files are never replaced.
pub struct LocalSaveSink {
    dir: PathBuf,
    file_name: String,
}

impl LocalSaveSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_name: CAPTURE_FILE_NAME.to_string(),
        }
    }

    fn candidate(&self, attempt: usize) -> PathBuf {
        if attempt == 0 {
            return self.dir.join(&self.file_name);
        }
        let path = Path::new(&self.file_name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match path.extension() {
            Some(ext) => format!("{stem} ({attempt}).{}", ext.to_string_lossy()),
            None => format!("{stem} ({attempt})"),
        };
        self.dir.join(name)
    }

    /// Writes `bytes` to the first free candidate name.
    fn write_new(&self, bytes: &[u8]) -> Result<PathBuf, CaptureError> {
        self.write_new_with(bytes, write_file)
    }

    /// A failed write removes the partial file it created.
    fn write_new_with(
        &self,
        bytes: &[u8],
        write: impl Fn(File, &[u8]) -> std::io::Result<()>,
    ) -> Result<PathBuf, CaptureError> {
        let mut attempt = 0;
        loop {
            let path = self.candidate(attempt);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    if let Err(source) = write(file, bytes) {
                        // Free the name so the next capture can take it
                        let _ = std::fs::remove_file(&path);
                        return Err(CaptureError::Write { path, source });
                    }
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(source) => return Err(CaptureError::Write { path, source }),
            }
        }
    }
}

fn write_file(mut file: File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes)?;
    file.flush()
}

impl CaptureSink for LocalSaveSink {
    fn deliver(&self, snapshot: &Snapshot) -> Result<(), CaptureError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| CaptureError::Write {
            path: self.dir.clone(),
            source,
        })?;
        let bytes = encode_png(&snapshot.frame)?;
        let path = self.write_new(&bytes)?;
        log::info!("Saved capture #{} to {}", snapshot.number, path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}

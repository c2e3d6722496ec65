use crate::constants;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The single output handle of a session.
///
/// A part is written to a temporary file next to its destination and only
/// renamed onto the final name once the part is complete, so a failed part
/// never replaces or removes a file saved earlier under the same name.
#[derive(Debug)]
pub(crate) struct FileSink {
    dir: PathBuf,
    open: Option<(PathBuf, NamedTempFile)>,
}

impl FileSink {
    pub fn new(dir: &Path) -> Self {
        FileSink {
            dir: dir.to_owned(),
            open: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open(&mut self, file_name: &str) -> crate::Result<()> {
        debug_assert!(self.open.is_none(), "a part file is already open");

        let path = self.dir.join(file_name);

        let file = tempfile::Builder::new()
            .prefix(constants::PART_FILE_PREFIX)
            .tempfile_in(&self.dir);

        match file {
            Ok(file) => {
                debug!("opened part file {} as {}", path.display(), file.path().display());
                self.open = Some((path, file));
                Ok(())
            }
            Err(cause) => Err(crate::Error::FileOpenFailure { path, cause }),
        }
    }

    pub fn write(&mut self, bytes: &[u8]) -> crate::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }

        let (path, file) = match self.open.as_mut() {
            Some(open) => open,
            None => {
                return Err(crate::Error::FileOpenFailure {
                    path: self.dir.clone(),
                    cause: std::io::Error::new(std::io::ErrorKind::NotFound, "no part file is open"),
                })
            }
        };

        file.write_all(bytes).map_err(|cause| crate::Error::FileOpenFailure {
            path: path.clone(),
            cause,
        })
    }

    /// Moves the finished part onto its final name, replacing any file
    /// already there.
    pub fn close(&mut self) -> crate::Result<()> {
        let (path, file) = match self.open.take() {
            Some(open) => open,
            None => return Ok(()),
        };

        match file.persist(&path) {
            Ok(_) => {
                trace!("closed part file {}", path.display());
                Ok(())
            }
            Err(err) => Err(crate::Error::FileOpenFailure { path, cause: err.error }),
        }
    }

    /// Drops the part being written. Files saved earlier are left alone.
    pub fn discard(&mut self) {
        if let Some((path, file)) = self.open.take() {
            let temp_path = file.path().to_owned();

            match file.close() {
                Ok(()) => debug!("removed partial file for {}", path.display()),
                Err(err) => warn!("failed to remove partial file {}: {}", temp_path.display(), err),
            }
        }
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        self.discard();
    }
}

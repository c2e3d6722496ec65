use crate::size_limit::SizeLimit;
use encoding_rs::{Encoding, UTF_8};
use std::path::{Path, PathBuf};

/// Per-request settings of an upload [`Session`](crate::Session).
///
/// # Examples
///
/// ```
/// use multipart_saver::{Config, SizeLimit};
///
/// let config = Config::new("/var/uploads")
///     .size_limit(SizeLimit::new().whole_stream(64 * 1024 * 1024).per_part(16 * 1024 * 1024))
///     .report_partial_manifest(true);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) upload_dir: PathBuf,
    pub(crate) size_limit: SizeLimit,
    pub(crate) report_partial_manifest: bool,
    pub(crate) skip_extra_part_headers: bool,
    pub(crate) filename_encoding: &'static Encoding,
}

impl Config {
    /// Creates a config that saves parts into `upload_dir`, which must already
    /// exist.
    pub fn new<P: Into<PathBuf>>(upload_dir: P) -> Config {
        Config {
            upload_dir: upload_dir.into(),
            size_limit: SizeLimit::default(),
            report_partial_manifest: false,
            skip_extra_part_headers: false,
            filename_encoding: UTF_8,
        }
    }

    /// Sets the size limits.
    pub fn size_limit(mut self, limit: SizeLimit) -> Config {
        self.size_limit = limit;
        self
    }

    /// Whether an error outcome also lists the parts saved before the failure.
    ///
    /// Off by default, in which case a failed upload reports only its error.
    pub fn report_partial_manifest(mut self, enabled: bool) -> Config {
        self.report_partial_manifest = enabled;
        self
    }

    /// Whether unrecognized lines between a boundary and the blank line ending
    /// the part headers (e.g. a per-part `Content-Type`) are ignored.
    ///
    /// Off by default, in which case such a line fails the upload.
    pub fn skip_extra_part_headers(mut self, enabled: bool) -> Config {
        self.skip_extra_part_headers = enabled;
        self
    }

    /// Sets the charset used to decode `filename="..."` values.
    ///
    /// Takes a WHATWG encoding label; unknown labels fall back to `utf-8`.
    pub fn filename_charset(mut self, label: &str) -> Config {
        self.filename_encoding = Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8);
        self
    }

    /// The directory parts are saved into.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }
}

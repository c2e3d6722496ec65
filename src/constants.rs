pub(crate) const DEFAULT_WHOLE_STREAM_SIZE_LIMIT: u64 = std::u64::MAX;
pub(crate) const DEFAULT_PER_PART_SIZE_LIMIT: u64 = std::u64::MAX;

pub(crate) const READ_CHUNK_SIZE: usize = 8 * 1024;

pub(crate) const BOUNDARY_EXT: &str = "--";
pub(crate) const CR: u8 = b'\r';
pub(crate) const LF: u8 = b'\n';
pub(crate) const CRLF: &[u8] = b"\r\n";
pub(crate) const LF_ONLY: &[u8] = b"\n";
pub(crate) const NO_TERMINATOR: &[u8] = b"";

pub(crate) const CONTENT_DISPOSITION_PREFIX: &[u8] = b"Content-Disposition:";
pub(crate) const FILE_NAME_ATTR: &[u8] = b"filename=\"";
pub(crate) const QUOTE: u8 = b'"';

pub(crate) const GENERATED_FILE_NAME_PREFIX: &str = "upload_";
pub(crate) const GENERATED_FILE_NAME_EXT: &str = ".dat";

pub(crate) const PART_FILE_PREFIX: &str = ".part-";

use crate::constants;

/// Represents size limits of an upload to keep a client from filling the disk.
///
/// Please refer [`Config`](crate::Config) for more info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimit {
    pub(crate) whole_stream: u64,
    pub(crate) per_part: u64,
}

impl SizeLimit {
    /// Creates a default size limit which is [`u64::MAX`] for the whole stream
    /// and for each part.
    pub fn new() -> SizeLimit {
        SizeLimit::default()
    }

    /// Sets size limit for the whole request body, delimiters and headers
    /// included.
    ///
    /// Body lines are buffered whole until their `\n` arrives, so this limit
    /// also caps the memory held for a part that contains no line break. With
    /// the default unbounded limit, such a part is kept in memory entirely.
    pub fn whole_stream(mut self, limit: u64) -> SizeLimit {
        self.whole_stream = limit;
        self
    }

    /// Sets size limit for the saved content of each part.
    pub fn per_part(mut self, limit: u64) -> SizeLimit {
        self.per_part = limit;
        self
    }
}

impl Default for SizeLimit {
    fn default() -> Self {
        SizeLimit {
            whole_stream: constants::DEFAULT_WHOLE_STREAM_SIZE_LIMIT,
            per_part: constants::DEFAULT_PER_PART_SIZE_LIMIT,
        }
    }
}

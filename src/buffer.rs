use crate::constants;
use bytes::{Bytes, BytesMut};
use std::io::{self, Read};

/// A pull-based source of body lines.
///
/// Each line is returned with its original terminator attached; only the last
/// line of the stream may lack one. `Ok(None)` signals the end of the stream.
pub trait LineSource {
    fn next_line(&mut self) -> crate::Result<Option<Bytes>>;
}

/// Splits a blocking reader into lines.
///
/// A line is held in memory until its terminator arrives; only the
/// whole-stream size limit bounds that buffer.
pub(crate) struct StreamBuffer<R> {
    pub(crate) eof: bool,
    pub(crate) buf: BytesMut,
    pub(crate) reader: R,
    pub(crate) whole_stream_size_limit: u64,
    pub(crate) stream_size_counter: u64,
    scanned: usize,
}

impl<R: Read> StreamBuffer<R> {
    pub fn new(reader: R, whole_stream_size_limit: u64) -> Self {
        StreamBuffer {
            eof: false,
            buf: BytesMut::new(),
            reader,
            whole_stream_size_limit,
            stream_size_counter: 0,
            scanned: 0,
        }
    }

    pub fn fill(&mut self) -> crate::Result<()> {
        if self.eof {
            return Ok(());
        }

        let mut chunk = [0u8; constants::READ_CHUNK_SIZE];

        loop {
            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.stream_size_counter += n as u64;

                    if self.stream_size_counter > self.whole_stream_size_limit {
                        return Err(crate::Error::StreamSizeExceeded {
                            limit: self.whole_stream_size_limit,
                        });
                    }

                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(crate::Error::StreamReadFailed(err)),
            }
        }
    }

    pub fn read_line(&mut self) -> crate::Result<Option<Bytes>> {
        loop {
            if let Some(idx) = memchr::memchr(constants::LF, &self.buf[self.scanned..]) {
                let end = self.scanned + idx + 1;
                self.scanned = 0;
                return Ok(Some(self.buf.split_to(end).freeze()));
            }

            self.scanned = self.buf.len();

            if self.eof {
                self.scanned = 0;
                return if self.buf.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(self.buf.split().freeze()))
                };
            }

            self.fill()?;
        }
    }
}

impl<R: Read> LineSource for StreamBuffer<R> {
    fn next_line(&mut self) -> crate::Result<Option<Bytes>> {
        self.read_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OneByte<'a>(&'a [u8]);

    impl Read for OneByte<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.split_first() {
                Some((b, rest)) if !buf.is_empty() => {
                    buf[0] = *b;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    fn collect<R: Read>(mut buffer: StreamBuffer<R>) -> Vec<Bytes> {
        let mut lines = Vec::new();
        while let Some(line) = buffer.read_line().unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_read_line_keeps_terminators() {
        let data = &b"a\r\nb\nc\rd\r\n\r\ntail"[..];
        let lines = collect(StreamBuffer::new(data, u64::MAX));

        assert_eq!(
            lines,
            vec![
                Bytes::from_static(b"a\r\n"),
                Bytes::from_static(b"b\n"),
                Bytes::from_static(b"c\rd\r\n"),
                Bytes::from_static(b"\r\n"),
                Bytes::from_static(b"tail"),
            ]
        );
    }

    #[test]
    fn test_read_line_byte_by_byte() {
        let data = b"--X\r\nhello\r\n--X--\r\n";
        let lines = collect(StreamBuffer::new(OneByte(data), u64::MAX));

        assert_eq!(
            lines,
            vec![
                Bytes::from_static(b"--X\r\n"),
                Bytes::from_static(b"hello\r\n"),
                Bytes::from_static(b"--X--\r\n"),
            ]
        );
    }

    #[test]
    fn test_read_line_long_line_across_chunks() {
        let mut data = vec![b'x'; constants::READ_CHUNK_SIZE * 3 + 7];
        data.extend_from_slice(b"\r\nend");

        let lines = collect(StreamBuffer::new(&data[..], u64::MAX));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), constants::READ_CHUNK_SIZE * 3 + 9);
        assert_eq!(lines[1], Bytes::from_static(b"end"));
    }

    #[test]
    fn test_read_line_empty_stream() {
        let mut buffer = StreamBuffer::new(&b""[..], u64::MAX);
        assert!(buffer.read_line().unwrap().is_none());
        assert!(buffer.read_line().unwrap().is_none());
    }

    #[test]
    fn test_whole_stream_size_limit() {
        let mut buffer = StreamBuffer::new(&b"0123456789\r\n"[..], 4);
        assert_eq!(
            buffer.read_line().unwrap_err(),
            crate::Error::StreamSizeExceeded { limit: 4 }
        );
    }

    #[test]
    fn test_whole_stream_size_limit_bounds_unterminated_line() {
        let data = vec![0xabu8; constants::READ_CHUNK_SIZE * 8];
        let limit = (constants::READ_CHUNK_SIZE * 2) as u64;
        let mut buffer = StreamBuffer::new(&data[..], limit);

        assert_eq!(
            buffer.read_line().unwrap_err(),
            crate::Error::StreamSizeExceeded { limit }
        );
        assert!(buffer.buf.len() as u64 <= limit);
    }

    #[test]
    fn test_read_failure() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            }
        }

        let mut buffer = StreamBuffer::new(Broken, u64::MAX);
        assert!(matches!(
            buffer.read_line(),
            Err(crate::Error::StreamReadFailed(_))
        ));
    }
}

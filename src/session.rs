use crate::buffer::{LineSource, StreamBuffer};
use crate::config::Config;
use crate::constants;
use crate::content_disposition;
use crate::line::{split_terminator, Delimiters, LineKind};
use crate::manifest::{Manifest, Outcome};
use crate::sink::FileSink;
use crate::state::State;
use http::header::{self, HeaderMap};
use std::io::Read;
use std::mem;

/// Decodes one `multipart/form-data` request body and saves every part as a
/// file.
///
/// A session is owned by exactly one request: it is fed lines in arrival
/// order, holds at most one open output file, and produces a single
/// [`Outcome`] at the end.
///
/// # Examples
///
/// ```
/// use multipart_saver::{Config, Outcome, Session};
///
/// # fn run() -> multipart_saver::Result<()> {
/// let dir = std::env::temp_dir();
/// let data = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\r\nhello\r\n--X-BOUNDARY--\r\n";
///
/// let session = Session::from_content_type("multipart/form-data; boundary=X-BOUNDARY", Config::new(&dir))?;
///
/// match session.process(data.as_bytes()) {
///     Outcome::Success { uploaded_files } => println!("Saved: {:?}", uploaded_files),
///     Outcome::Error { description, .. } => println!("Failed: {}", description),
/// }
/// # Ok(())
/// # }
/// # run().unwrap();
/// ```
#[derive(Debug)]
pub struct Session {
    state: State,
    delimiters: Delimiters,
    config: Config,
    current_filename: Option<String>,
    current_size: u64,
    pending_terminator: &'static [u8],
    sink: FileSink,
    manifest: Manifest,
    last_error: Option<String>,
}

impl Session {
    /// Construct a new `Session` for an already resolved, non-empty boundary.
    pub fn new<B: AsRef<str>>(boundary: B, config: Config) -> Session {
        let boundary = boundary.as_ref();
        debug_assert!(!boundary.is_empty(), "boundary must not be empty");

        debug!("new upload session, boundary: {:?}", boundary);

        Session {
            state: State::AwaitingBoundary,
            delimiters: Delimiters::new(boundary),
            sink: FileSink::new(&config.upload_dir),
            config,
            current_filename: None,
            current_size: 0,
            pending_terminator: constants::NO_TERMINATOR,
            manifest: Manifest::new(),
            last_error: None,
        }
    }

    /// Construct a new `Session` from a `Content-Type` header value.
    pub fn from_content_type(content_type: &str, config: Config) -> crate::Result<Session> {
        let boundary = crate::parse_boundary(content_type)?;
        Ok(Session::new(boundary, config))
    }

    /// Construct a new `Session` from the request headers.
    pub fn from_headers(headers: &HeaderMap, config: Config) -> crate::Result<Session> {
        let value = headers
            .get(header::CONTENT_TYPE)
            .ok_or(crate::Error::MissingBoundary { content_type: None })?;

        let content_type = value.to_str().map_err(|_| crate::Error::MissingBoundary {
            content_type: Some(String::from_utf8_lossy(value.as_bytes()).into_owned()),
        })?;

        Session::from_content_type(content_type, config)
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// The filename of the part being read, once its `Content-Disposition`
    /// line has been seen.
    pub fn current_filename(&self) -> Option<&str> {
        self.current_filename.as_deref()
    }

    /// Bytes written so far to the current part's file.
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// The terminator of the last data line, held back until the next line
    /// shows whether it belongs to the content or to the next delimiter.
    pub fn pending_terminator(&self) -> &[u8] {
        self.pending_terminator
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Feeds one line, terminator included, through the state machine.
    ///
    /// The first error moves the session to [`State::Failed`] for good and
    /// removes any partially written file.
    pub fn feed(&mut self, line: &[u8]) -> crate::Result<()> {
        let from = self.state;
        let kind = self.delimiters.classify(line);

        if self.config.skip_extra_part_headers
            && kind == LineKind::Data
            && matches!(from, State::AfterBoundary | State::AwaitingHeaderEnd)
        {
            trace!("skipping part header line in state {}", from);
            return Ok(());
        }

        let to = from.next(kind);
        trace!("{} + {} -> {}", from, kind, to);

        if to == State::Failed {
            return Err(self.fail(crate::Error::UnexpectedTransition { state: from, line: kind }));
        }

        match self.apply(from, kind, line) {
            Ok(()) => {
                self.state = to;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Pulls lines from `source` until a terminal state or the end of the
    /// stream, then returns the outcome.
    pub fn process_lines<S: LineSource>(mut self, mut source: S) -> Outcome {
        while !self.state.is_terminal() {
            match source.next_line() {
                Ok(Some(line)) => {
                    if self.feed(&line).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    self.fail(err);
                    break;
                }
            }
        }

        self.finish()
    }

    /// Splits `reader` into lines and processes them.
    pub fn process<R: Read>(self, reader: R) -> Outcome {
        let limit = self.config.size_limit.whole_stream;
        self.process_lines(StreamBuffer::new(reader, limit))
    }

    /// Ends the session.
    ///
    /// A session that hasn't reached the terminal delimiter yet fails with
    /// [`Error::StreamTruncated`](crate::Error::StreamTruncated).
    pub fn finish(mut self) -> Outcome {
        if !self.state.is_terminal() {
            let state = self.state;
            self.fail(crate::Error::StreamTruncated { state });
        }

        let uploaded_files = mem::take(&mut self.manifest).into_entries();

        if self.state == State::Terminated {
            debug!("upload finished, {} file(s) saved", uploaded_files.len());
            return Outcome::Success { uploaded_files };
        }

        Outcome::Error {
            description: self.last_error.take().unwrap_or_default(),
            uploaded_files: if self.config.report_partial_manifest {
                Some(uploaded_files)
            } else {
                None
            },
        }
    }

    fn apply(&mut self, from: State, kind: LineKind, line: &[u8]) -> crate::Result<()> {
        match (from, kind) {
            (State::AfterBoundary, LineKind::ContentDisposition) => {
                self.current_filename =
                    content_disposition::extract_file_name(line, self.config.filename_encoding);
            }
            (State::AwaitingHeaderEnd, LineKind::NewLine) => {
                let name = self
                    .current_filename
                    .get_or_insert_with(content_disposition::generated_file_name);
                debug!("part header ended, filename: {}", name);

                self.current_size = 0;
                self.pending_terminator = constants::NO_TERMINATOR;
            }
            (State::AfterHeaderEnd, LineKind::Data) => {
                self.open_part()?;
                self.write_data(line)?;
            }
            (_, LineKind::Boundary) | (_, LineKind::BoundaryEnd) if from.is_part_open() => {
                self.close_part()?;
            }
            (State::InBody, _) => self.write_data(line)?,
            _ => {}
        }

        Ok(())
    }

    fn open_part(&mut self) -> crate::Result<()> {
        let name = self
            .current_filename
            .get_or_insert_with(content_disposition::generated_file_name);

        self.sink.open(name)
    }

    fn close_part(&mut self) -> crate::Result<()> {
        // A part without a body still gets its (empty) file.
        if !self.sink.is_open() {
            self.open_part()?;
        }

        self.sink.close()?;

        // It precedes the delimiter, so it was never part of the content.
        self.pending_terminator = constants::NO_TERMINATOR;

        let filename = self.current_filename.take().unwrap_or_default();
        let size = mem::take(&mut self.current_size);

        debug!("saved file {}, size: {}", filename, size);
        self.manifest.push(filename, size);

        Ok(())
    }

    fn write_data(&mut self, line: &[u8]) -> crate::Result<()> {
        let (content, terminator) = split_terminator(line);

        // Another data line arrived, so the held back terminator was content.
        let pending = mem::take(&mut self.pending_terminator);
        self.write_counted(pending)?;

        self.write_counted(content)?;
        self.pending_terminator = terminator;

        Ok(())
    }

    fn write_counted(&mut self, bytes: &[u8]) -> crate::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }

        let limit = self.config.size_limit.per_part;
        let size = self.current_size + bytes.len() as u64;

        if size > limit {
            return Err(crate::Error::PartSizeExceeded {
                limit,
                filename: self.current_filename.clone().unwrap_or_default(),
            });
        }

        self.sink.write(bytes)?;
        self.current_size = size;

        Ok(())
    }

    fn fail(&mut self, err: crate::Error) -> crate::Error {
        self.sink.discard();
        self.state = State::Failed;
        self.current_filename = None;
        self.current_size = 0;
        self.pending_terminator = constants::NO_TERMINATOR;

        if self.last_error.is_none() {
            warn!("upload failed: {}", err);
            self.last_error = Some(err.to_string());
        }

        err
    }
}

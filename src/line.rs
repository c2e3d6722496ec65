use crate::constants;
use bytes::Bytes;
use std::fmt::{self, Display, Formatter};

/// The category of a single body line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Boundary,
    BoundaryEnd,
    ContentDisposition,
    NewLine,
    Data,
}

impl LineKind {
    #[cfg(test)]
    pub(crate) const ALL: [LineKind; 5] = [
        LineKind::Boundary,
        LineKind::BoundaryEnd,
        LineKind::ContentDisposition,
        LineKind::NewLine,
        LineKind::Data,
    ];
}

impl Display for LineKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(
            match self {
                LineKind::Boundary => "Boundary",
                LineKind::BoundaryEnd => "BoundaryEnd",
                LineKind::ContentDisposition => "ContentDisposition",
                LineKind::NewLine => "NewLine",
                LineKind::Data => "Data",
            },
            f,
        )
    }
}

/// The two delimiter literals derived from a boundary token.
///
/// Both are compared against whole lines, never as prefixes or patterns, so a
/// boundary that happens to be a prefix of another one, or that contains
/// characters like `.` or `*`, only ever matches itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    part: Bytes,
    terminal: Bytes,
}

impl Delimiters {
    /// Derives `--boundary` and `--boundary--` from the raw boundary token.
    pub fn new(boundary: &str) -> Delimiters {
        let part = format!("{}{}", constants::BOUNDARY_EXT, boundary);
        let terminal = format!("{}{}", part, constants::BOUNDARY_EXT);

        Delimiters {
            part: Bytes::from(part),
            terminal: Bytes::from(terminal),
        }
    }

    /// The part delimiter, `--` followed by the boundary.
    pub fn part(&self) -> &[u8] {
        &self.part
    }

    /// The terminal delimiter, the part delimiter followed by `--`.
    pub fn terminal(&self) -> &[u8] {
        &self.terminal
    }

    /// Classifies one line, terminator included.
    ///
    /// The terminal delimiter is checked before the part delimiter because it
    /// is a superstring of it.
    pub fn classify(&self, line: &[u8]) -> LineKind {
        let (content, _) = split_terminator(line);

        if content == &self.terminal[..] {
            LineKind::BoundaryEnd
        } else if content == &self.part[..] {
            LineKind::Boundary
        } else if content.is_empty() {
            LineKind::NewLine
        } else if is_content_disposition(content) {
            LineKind::ContentDisposition
        } else {
            LineKind::Data
        }
    }
}

/// Splits a line into its content and its trailing terminator.
///
/// The terminator is `\r\n`, `\n`, or empty for an unterminated final line. A
/// lone `\r` is content.
pub fn split_terminator(line: &[u8]) -> (&[u8], &'static [u8]) {
    match line {
        [content @ .., constants::CR, constants::LF] => (content, constants::CRLF),
        [content @ .., constants::LF] => (content, constants::LF_ONLY),
        _ => (line, constants::NO_TERMINATOR),
    }
}

fn is_content_disposition(content: &[u8]) -> bool {
    let prefix = constants::CONTENT_DISPOSITION_PREFIX;
    content.len() >= prefix.len() && content[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiters() {
        let d = Delimiters::new("X-BOUNDARY");
        assert_eq!(d.part(), b"--X-BOUNDARY");
        assert_eq!(d.terminal(), b"--X-BOUNDARY--");
    }

    #[test]
    fn test_split_terminator() {
        assert_eq!(split_terminator(b"abc\r\n"), (&b"abc"[..], &b"\r\n"[..]));
        assert_eq!(split_terminator(b"abc\n"), (&b"abc"[..], &b"\n"[..]));
        assert_eq!(split_terminator(b"abc"), (&b"abc"[..], &b""[..]));
        assert_eq!(split_terminator(b"abc\r"), (&b"abc\r"[..], &b""[..]));
        assert_eq!(split_terminator(b"\r\n"), (&b""[..], &b"\r\n"[..]));
        assert_eq!(split_terminator(b""), (&b""[..], &b""[..]));
    }

    #[test]
    fn test_classify_boundaries() {
        let d = Delimiters::new("X");

        assert_eq!(d.classify(b"--X--\r\n"), LineKind::BoundaryEnd);
        assert_eq!(d.classify(b"--X--"), LineKind::BoundaryEnd);
        assert_eq!(d.classify(b"--X\r\n"), LineKind::Boundary);
        assert_eq!(d.classify(b"--X\n"), LineKind::Boundary);
        assert_eq!(d.classify(b"--X"), LineKind::Boundary);

        assert_eq!(d.classify(b"--XY\r\n"), LineKind::Data);
        assert_eq!(d.classify(b" --X\r\n"), LineKind::Data);
        assert_eq!(d.classify(b"--X \r\n"), LineKind::Data);
        assert_eq!(d.classify(b"--X---\r\n"), LineKind::Data);
    }

    #[test]
    fn test_classify_prefix_boundaries_are_distinct() {
        let short = Delimiters::new("AB");
        let long = Delimiters::new("ABC");

        assert_eq!(short.classify(b"--ABC\r\n"), LineKind::Data);
        assert_eq!(short.classify(b"--ABC--\r\n"), LineKind::Data);
        assert_eq!(long.classify(b"--AB\r\n"), LineKind::Data);
        assert_eq!(long.classify(b"--AB--\r\n"), LineKind::Data);
    }

    #[test]
    fn test_classify_pattern_characters_are_literal() {
        let d = Delimiters::new("a.b*c");

        assert_eq!(d.classify(b"--a.b*c\r\n"), LineKind::Boundary);
        assert_eq!(d.classify(b"--a.b*c--\r\n"), LineKind::BoundaryEnd);
        assert_eq!(d.classify(b"--axbbbc\r\n"), LineKind::Data);
        assert_eq!(d.classify(b"--a.bc\r\n"), LineKind::Data);
    }

    #[test]
    fn test_classify_new_line() {
        let d = Delimiters::new("X");

        assert_eq!(d.classify(b"\r\n"), LineKind::NewLine);
        assert_eq!(d.classify(b"\n"), LineKind::NewLine);
        assert_eq!(d.classify(b""), LineKind::NewLine);
        assert_eq!(d.classify(b"\r"), LineKind::Data);
        assert_eq!(d.classify(b" \r\n"), LineKind::Data);
    }

    #[test]
    fn test_classify_content_disposition() {
        let d = Delimiters::new("X");

        assert_eq!(
            d.classify(b"Content-Disposition: form-data; name=\"file\"\r\n"),
            LineKind::ContentDisposition
        );
        assert_eq!(
            d.classify(b"content-disposition: form-data\r\n"),
            LineKind::ContentDisposition
        );
        assert_eq!(d.classify(b"CONTENT-DISPOSITION:form-data"), LineKind::ContentDisposition);

        assert_eq!(d.classify(b"Content-Type: text/plain\r\n"), LineKind::Data);
        assert_eq!(d.classify(b"Content-Disposition\r\n"), LineKind::Data);
        assert_eq!(d.classify(b"X-Content-Disposition: a\r\n"), LineKind::Data);
    }

    #[test]
    fn test_classify_binary_data() {
        let d = Delimiters::new("X");
        assert_eq!(d.classify(&[0xff, 0x00, 0x2d, 0x2d, b'\r', b'\n']), LineKind::Data);
    }
}

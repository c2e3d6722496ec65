//! A blocking, line-oriented `multipart/form-data` decoder that saves every
//! uploaded part to disk, byte for byte.
//!
//! The HTTP layer hands over the request's `Content-Type` and a readable body;
//! the decoder returns an [`Outcome`] listing the saved files, or the first
//! error it ran into.
//!
//! Line terminators inside a part's content are preserved exactly. Only the
//! terminator right before a delimiter line is dropped, since it belongs to
//! the delimiter.
//!
//! # Examples
//!
//! ```
//! use http::header::{HeaderMap, CONTENT_TYPE};
//! use multipart_saver::{Config, Outcome};
//!
//! # fn run() {
//! let dir = std::env::temp_dir();
//!
//! let mut headers = HeaderMap::new();
//! headers.insert(CONTENT_TYPE, "multipart/form-data; boundary=X-BOUNDARY".parse().unwrap());
//!
//! let body = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\r\nhello\r\n--X-BOUNDARY--\r\n";
//!
//! let outcome = multipart_saver::process_upload(&headers, body.as_bytes(), &Config::new(&dir));
//! assert!(outcome.is_success());
//! # }
//! # run();
//! ```
//!
//! ## Optional features
//!
//! - `json` (default): `serde` support for [`Outcome`] and [`Outcome::to_json`].
//! - `log` (default): emits decoding events through the `log` facade.

#![cfg_attr(nightly, feature(doc_cfg))]

pub use buffer::LineSource;
pub use config::Config;
pub use error::Error;
pub use line::{split_terminator, Delimiters, LineKind};
pub use manifest::{Manifest, Outcome, UploadedFile};
pub use session::Session;
pub use size_limit::SizeLimit;
pub use state::State;

use http::header::HeaderMap;
use std::io::Read;

#[macro_use]
mod macros;

mod buffer;
mod config;
mod constants;
mod content_disposition;
mod error;
mod line;
mod manifest;
mod session;
mod sink;
mod size_limit;
mod state;

/// A Result type often returned from methods that can have `multipart-saver` errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Parses the `Content-Type` header to extract the boundary value.
///
/// Only the media type goes through [`mime`]; the `boundary` parameter is
/// scanned by hand so any RFC 2046 boundary character (`=`, `:`, `/`, ...) and
/// `'...'` quoting are accepted. A single pair of surrounding `"` or `'` quotes
/// is removed.
pub fn parse_boundary<T: AsRef<str>>(content_type: T) -> crate::Result<String> {
    let content_type = content_type.as_ref();
    let missing = || crate::Error::MissingBoundary {
        content_type: Some(content_type.to_owned()),
    };

    let (essence, params) = match content_type.find(';') {
        Some(idx) => (&content_type[..idx], &content_type[idx + 1..]),
        None => (content_type, ""),
    };

    let m = essence.trim().parse::<mime::Mime>().map_err(|_| missing())?;

    if !(m.type_() == mime::MULTIPART_FORM_DATA.type_() && m.subtype() == mime::MULTIPART_FORM_DATA.subtype()) {
        return Err(missing());
    }

    let boundary = find_param(params, mime::BOUNDARY.as_str()).ok_or_else(missing)?;
    let boundary = strip_quotes(boundary.trim());

    if boundary.is_empty() {
        return Err(missing());
    }

    debug!("resolved multipart boundary: {:?}", boundary);

    Ok(boundary.to_owned())
}

/// Finds the raw value of the `name` parameter in a `;`-separated parameter
/// list. Names match case-insensitively; a quoted value may contain `;`.
fn find_param<'a>(params: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = params;

    loop {
        let param = rest.trim_start();
        let eq = param.find('=');
        let semi = param.find(';');

        match (eq, semi) {
            (Some(eq), semi) if semi.map_or(true, |semi| eq < semi) => {
                let (value, next) = split_param_value(param[eq + 1..].trim_start());

                if param[..eq].trim().eq_ignore_ascii_case(name) {
                    return Some(value);
                }

                rest = next?;
            }
            (_, Some(semi)) => rest = &param[semi + 1..],
            _ => return None,
        }
    }
}

/// Splits a parameter value from the parameters following it.
fn split_param_value(value: &str) -> (&str, Option<&str>) {
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'');

    if let Some(quote) = quote {
        if let Some(idx) = value[1..].find(quote) {
            let end = idx + 2;
            let next = value[end..].find(';').map(|semi| &value[end + semi + 1..]);
            return (&value[..end], next);
        }
    }

    match value.find(';') {
        Some(idx) => (&value[..idx], Some(&value[idx + 1..])),
        None => (value, None),
    }
}

fn strip_quotes(value: &str) -> &str {
    for quote in &['"', '\''] {
        if value.len() >= 2 && value.starts_with(*quote) && value.ends_with(*quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Decodes a whole request: resolves the boundary from `headers`, then saves
/// every part read from `body`.
///
/// When the boundary can't be resolved, `body` is never read.
pub fn process_upload<R: Read>(headers: &HeaderMap, body: R, config: &Config) -> Outcome {
    match Session::from_headers(headers, config.clone()) {
        Ok(session) => session.process(body),
        Err(err) => {
            warn!("upload rejected: {}", err);

            Outcome::Error {
                description: err.to_string(),
                uploaded_files: if config.report_partial_manifest {
                    Some(Vec::new())
                } else {
                    None
                },
            }
        }
    }
}

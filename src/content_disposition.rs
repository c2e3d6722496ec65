use crate::constants;
use crate::line::split_terminator;
use encoding_rs::Encoding;
use memchr::{memchr, memmem};
use std::time::{SystemTime, UNIX_EPOCH};

/// Extracts the sanitized `filename="..."` value from a `Content-Disposition`
/// line.
///
/// Returns `None` when the attribute is absent, unterminated, empty, or
/// reduces to nothing usable once path components are stripped.
pub(crate) fn extract_file_name(line: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (content, _) = split_terminator(line);

    let start = memmem::find(content, constants::FILE_NAME_ATTR)? + constants::FILE_NAME_ATTR.len();
    let len = memchr(constants::QUOTE, &content[start..])?;

    let (raw, _, _) = encoding.decode(&content[start..start + len]);

    sanitize_file_name(&raw)
}

/// Keeps only the final path component, so a client can't place the file
/// outside the upload directory.
pub(crate) fn sanitize_file_name(name: &str) -> Option<String> {
    let base = match name.rfind(|c: char| c == '/' || c == '\\') {
        Some(idx) => &name[idx + 1..],
        None => name,
    };

    match base {
        "" | "." | ".." => None,
        base => Some(base.to_owned()),
    }
}

/// Builds the `upload_<unix-timestamp>.dat` name used for parts without a
/// usable filename.
pub(crate) fn generated_file_name() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    format!(
        "{}{}{}",
        constants::GENERATED_FILE_NAME_PREFIX,
        secs,
        constants::GENERATED_FILE_NAME_EXT
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_8, WINDOWS_1251};

    #[test]
    fn test_extract_file_name() {
        let line = b"Content-Disposition: form-data; name=\"my_field\"; filename=\"file_name.txt\"\r\n";
        assert_eq!(extract_file_name(line, UTF_8), Some("file_name.txt".to_owned()));

        let line = b"Content-Disposition: form-data; filename=\"file name.txt\"";
        assert_eq!(extract_file_name(line, UTF_8), Some("file name.txt".to_owned()));

        let line = "Content-Disposition: form-data; filename=\"কখগ-你好.txt\"\r\n".as_bytes();
        assert_eq!(extract_file_name(line, UTF_8), Some("কখগ-你好.txt".to_owned()));
    }

    #[test]
    fn test_extract_file_name_missing() {
        let line = b"Content-Disposition: form-data; name=\"my_field\"\r\n";
        assert_eq!(extract_file_name(line, UTF_8), None);

        let line = b"Content-Disposition: form-data; filename=\"\"\r\n";
        assert_eq!(extract_file_name(line, UTF_8), None);

        let line = b"Content-Disposition: form-data; filename=\"unterminated\r\n";
        assert_eq!(extract_file_name(line, UTF_8), None);

        let line = b"Content-Disposition: form-data; filename=plain.txt\r\n";
        assert_eq!(extract_file_name(line, UTF_8), None);
    }

    #[test]
    fn test_extract_file_name_strips_paths() {
        let line = b"Content-Disposition: form-data; filename=\"../../etc/passwd\"\r\n";
        assert_eq!(extract_file_name(line, UTF_8), Some("passwd".to_owned()));

        let line = b"Content-Disposition: form-data; filename=\"C:\\Users\\me\\photo.png\"\r\n";
        assert_eq!(extract_file_name(line, UTF_8), Some("photo.png".to_owned()));

        let line = b"Content-Disposition: form-data; filename=\"dir/\"\r\n";
        assert_eq!(extract_file_name(line, UTF_8), None);

        let line = b"Content-Disposition: form-data; filename=\"..\"\r\n";
        assert_eq!(extract_file_name(line, UTF_8), None);
    }

    #[test]
    fn test_extract_file_name_with_charset() {
        // "файл.txt" in windows-1251
        let line = b"Content-Disposition: form-data; filename=\"\xf4\xe0\xe9\xeb.txt\"\r\n";
        assert_eq!(extract_file_name(line, WINDOWS_1251), Some("файл.txt".to_owned()));
    }

    #[test]
    fn test_generated_file_name() {
        let name = generated_file_name();
        let digits = name
            .strip_prefix("upload_")
            .and_then(|rest| rest.strip_suffix(".dat"))
            .unwrap();

        assert!(!digits.is_empty());
        assert!(digits.bytes().all(|b| b.is_ascii_digit()));
    }
}

#[cfg(feature = "json")]
use serde::Serialize;

/// A saved part, as reported to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Serialize))]
pub struct UploadedFile {
    pub filename: String,
    pub size: u64,
}

/// The ordered, append-only list of parts saved by a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<UploadedFile>,
}

impl Manifest {
    pub fn new() -> Manifest {
        Manifest::default()
    }

    pub(crate) fn push(&mut self, filename: String, size: u64) {
        self.entries.push(UploadedFile { filename, size });
    }

    pub fn entries(&self) -> &[UploadedFile] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<UploadedFile> {
        self.entries
    }
}

/// The final result of an upload, ready to be handed back to the HTTP layer.
///
/// With the `json` feature it serializes to
/// `{"status":"success","uploadedFiles":[...]}` or
/// `{"status":"error","description":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Serialize))]
#[cfg_attr(feature = "json", serde(tag = "status", rename_all = "lowercase"))]
pub enum Outcome {
    Success {
        #[cfg_attr(feature = "json", serde(rename = "uploadedFiles"))]
        uploaded_files: Vec<UploadedFile>,
    },
    Error {
        description: String,
        /// Parts saved before the failure; only present when
        /// [`Config::report_partial_manifest`](crate::Config::report_partial_manifest)
        /// is enabled.
        #[cfg_attr(
            feature = "json",
            serde(rename = "uploadedFiles", skip_serializing_if = "Option::is_none")
        )]
        uploaded_files: Option<Vec<UploadedFile>>,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Renders the outcome as a `JSON` document.
    #[cfg(feature = "json")]
    #[cfg_attr(nightly, doc(cfg(feature = "json")))]
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self).map_err(crate::Error::EncodeJson)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_keeps_arrival_order() {
        let mut manifest = Manifest::new();
        assert!(manifest.is_empty());

        manifest.push("b.txt".to_owned(), 2);
        manifest.push("a.txt".to_owned(), 1);

        assert_eq!(manifest.len(), 2);
        assert_eq!(
            manifest.into_entries(),
            vec![
                UploadedFile {
                    filename: "b.txt".to_owned(),
                    size: 2
                },
                UploadedFile {
                    filename: "a.txt".to_owned(),
                    size: 1
                },
            ]
        );
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_success_json() {
        let outcome = Outcome::Success {
            uploaded_files: vec![UploadedFile {
                filename: "a.txt".to_owned(),
                size: 5,
            }],
        };

        assert_eq!(
            outcome.to_json().unwrap(),
            r#"{"status":"success","uploadedFiles":[{"filename":"a.txt","size":5}]}"#
        );

        let empty = Outcome::Success { uploaded_files: vec![] };
        assert_eq!(empty.to_json().unwrap(), r#"{"status":"success","uploadedFiles":[]}"#);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_error_json() {
        let outcome = Outcome::Error {
            description: "boom".to_owned(),
            uploaded_files: None,
        };
        assert_eq!(outcome.to_json().unwrap(), r#"{"status":"error","description":"boom"}"#);

        let outcome = Outcome::Error {
            description: "boom".to_owned(),
            uploaded_files: Some(vec![UploadedFile {
                filename: "a.txt".to_owned(),
                size: 1,
            }]),
        };
        assert_eq!(
            outcome.to_json().unwrap(),
            r#"{"status":"error","description":"boom","uploadedFiles":[{"filename":"a.txt","size":1}]}"#
        );
    }
}

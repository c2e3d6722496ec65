#![no_main]

use libfuzzer_sys::fuzz_target;
use multipart_saver::{Config, Outcome, Session, SizeLimit};
use std::collections::HashMap;

fuzz_target!(|data: &[u8]| {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::new(dir.path()).size_limit(SizeLimit::new().per_part(64 * 1024));

    let session = Session::new("X-BOUNDARY", config);

    match session.process(data) {
        Outcome::Success { uploaded_files } => {
            // Parts sharing a filename overwrite each other, the last one wins.
            let mut last = HashMap::new();
            for file in uploaded_files {
                last.insert(file.filename, file.size);
            }

            for (filename, size) in last {
                let meta = std::fs::metadata(dir.path().join(&filename)).expect("saved file");
                assert_eq!(meta.len(), size);
            }
        }
        Outcome::Error { description, uploaded_files } => {
            assert!(!description.is_empty());
            assert!(uploaded_files.is_none());
        }
    }
});

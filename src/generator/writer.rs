//! Artifact persistence

use super::WriteError;
use std::fs;
use std::io;
use std::path::Path;

/// What happened to one rendered artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// File created or rewritten
    Written,
    /// File already held the rendered text
    Unchanged,
}

/// Writes rendered artifacts, or only checks them in verify mode
#[derive(Debug, Clone, Default)]
pub struct ArtifactWriter {
    header: Option<String>,
    verify: bool,
}

impl ArtifactWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boilerplate prepended to every artifact
    pub fn with_header(mut self, header: Option<String>) -> Self {
        self.header = header.filter(|h| !h.trim().is_empty()).map(|mut h| {
            if !h.ends_with('\n') {
                h.push('\n');
            }
            h
        });
        self
    }

    /// Compare with the files on disk instead of writing
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn is_verify(&self) -> bool {
        self.verify
    }

    fn contents(&self, rendered: &str) -> String {
        match &self.header {
            Some(header) => format!("{}\n{}", header, rendered),
            None => rendered.to_string(),
        }
    }

    /// Persist `rendered` at `path`, creating parent directories
    ///
    /// Files already holding the same text are left untouched so their
    /// modification times stay stable across regenerations.
    pub fn write(&self, path: &Path, rendered: &str) -> Result<WriteOutcome, WriteError> {
        let contents = self.contents(rendered);
        let existing = match fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(WriteError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if existing.as_deref() == Some(contents.as_bytes()) {
            return Ok(WriteOutcome::Unchanged);
        }
        if self.verify {
            return Err(WriteError::Stale {
                path: path.to_path_buf(),
            });
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| WriteError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, contents).map_err(|source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(WriteOutcome::Written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents_and_skips_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("informers/externalversions/factory.rs");
        let writer = ArtifactWriter::new();

        assert_eq!(writer.write(&path, "fn a() {}\n").unwrap(), WriteOutcome::Written);
        assert_eq!(writer.write(&path, "fn a() {}\n").unwrap(), WriteOutcome::Unchanged);
        assert_eq!(fs::read_to_string(&path).unwrap(), "fn a() {}\n");
    }

    #[test]
    fn test_header_is_prepended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factory.rs");
        let writer = ArtifactWriter::new().with_header(Some("// Copyright Example".to_string()));

        writer.write(&path, "fn a() {}\n").unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "// Copyright Example\n\nfn a() {}\n"
        );
    }

    #[test]
    fn test_verify_reports_drift_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factory.rs");
        fs::write(&path, "fn old() {}\n").unwrap();

        let writer = ArtifactWriter::new().with_verify(true);
        let err = writer.write(&path, "fn new() {}\n").unwrap_err();
        assert!(matches!(err, WriteError::Stale { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "fn old() {}\n");

        assert!(matches!(
            writer.write(&dir.path().join("missing.rs"), "x\n"),
            Err(WriteError::Stale { .. })
        ));
    }

    #[test]
    fn test_unreadable_target_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factory.rs");
        fs::create_dir(&path).unwrap();

        for writer in [ArtifactWriter::new(), ArtifactWriter::new().with_verify(true)] {
            let err = writer.write(&path, "fn a() {}\n").unwrap_err();
            assert!(matches!(err, WriteError::Io { .. }), "{:?}", err);
        }
    }

    #[test]
    fn test_non_utf8_target_is_compared_as_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factory.rs");
        fs::write(&path, [0xff, 0xfe, b'\n']).unwrap();

        let err = ArtifactWriter::new()
            .with_verify(true)
            .write(&path, "fn a() {}\n")
            .unwrap_err();
        assert!(matches!(err, WriteError::Stale { .. }));

        assert_eq!(
            ArtifactWriter::new().write(&path, "fn a() {}\n").unwrap(),
            WriteOutcome::Written
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "fn a() {}\n");
    }
}

//! Generation failures
//!
//! Failures are recorded per unit and collected into one [`GenerateError`]
//! so callers see every problem of a run, not just the first one.

use crate::discovery::DiscoveryError;
use crate::generator::WriteError;
use crate::render::RenderError;
use std::fmt;
use std::path::PathBuf;

/// Underlying cause of a recorded failure
#[derive(Debug, thiserror::Error)]
pub enum GenerationCause {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// A failure of one independent unit of generation work
#[derive(Debug, thiserror::Error)]
#[error("{unit}: {cause}")]
pub struct GenerationError {
    /// Group/version, type, or artifact that failed
    pub unit: String,
    #[source]
    pub cause: GenerationCause,
}

impl GenerationError {
    pub fn new(unit: impl Into<String>, cause: impl Into<GenerationCause>) -> Self {
        Self {
            unit: unit.into(),
            cause: cause.into(),
        }
    }

    /// Discovery failures only lose their own unit; render and write failures
    /// abort the artifact being produced
    pub fn is_unit_level(&self) -> bool {
        matches!(self.cause, GenerationCause::Discovery(_))
    }
}

/// Combined failure of a generation run
#[derive(Debug)]
pub struct GenerateError {
    pub failures: Vec<GenerationError>,
    /// Artifacts persisted before and despite the failures
    pub written: Vec<PathBuf>,
}

impl GenerateError {
    pub fn new(failures: Vec<GenerationError>) -> Self {
        Self {
            failures,
            written: Vec::new(),
        }
    }

    pub fn unit_failures(&self) -> impl Iterator<Item = &GenerationError> {
        self.failures.iter().filter(|f| f.is_unit_level())
    }

    pub fn run_failures(&self) -> impl Iterator<Item = &GenerationError> {
        self.failures.iter().filter(|f| !f.is_unit_level())
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "generation failed with {} error(s):", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  - {}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for GenerateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_enumerates_every_failure() {
        let err = GenerateError::new(vec![
            GenerationError::new(
                "example/v1",
                DiscoveryError::NotADirectory {
                    path: PathBuf::from("/apis/example/v1"),
                },
            ),
            GenerationError::new("factory", RenderError::UnknownKind("factory".to_string())),
        ]);

        let message = err.to_string();
        assert!(message.starts_with("generation failed with 2 error(s):"));
        assert!(message.contains("example/v1: source path"));
        assert!(message.contains("factory: unknown artifact kind: factory"));

        assert_eq!(err.unit_failures().count(), 1);
        assert_eq!(err.run_failures().count(), 1);
    }
}

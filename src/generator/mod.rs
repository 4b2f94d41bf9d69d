//! Generation pipeline
//!
//! Aggregates the declared group/versions, plans the artifacts, then renders
//! and writes each one independently. A failed artifact never stops the ones
//! after it; every failure ends up in the returned [`GenerateError`].

mod writer;

pub use writer::{ArtifactWriter, WriteOutcome};

use crate::discovery::{Aggregator, SourceLoader, VersionPolicy};
use crate::error::{GenerateError, GenerationError};
use crate::models::GroupVersions;
use crate::planner::{self, PlanOptions};
use crate::render::{Renderer, TemplateRegistry};
use std::path::PathBuf;

/// Artifact persistence errors
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?} is out of date")]
    Stale { path: PathBuf },
}

/// Everything a generation run needs besides its collaborators
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub input_dir: PathBuf,
    pub group_versions: Vec<GroupVersions>,
    pub version_policy: VersionPolicy,
    pub plan: PlanOptions,
    pub header: Option<String>,
    pub verify: bool,
}

/// Outcome of a successful run
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Artifacts created or rewritten
    pub written: Vec<PathBuf>,
    /// Artifacts already up to date
    pub unchanged: Vec<PathBuf>,
    /// APIs that received accessors
    pub apis: usize,
}

/// Runs discovery, planning, rendering and writing
pub struct Generator<'a> {
    loader: &'a dyn SourceLoader,
    registry: &'a TemplateRegistry,
    options: GenerateOptions,
}

impl<'a> Generator<'a> {
    pub fn new(
        loader: &'a dyn SourceLoader,
        registry: &'a TemplateRegistry,
        options: GenerateOptions,
    ) -> Self {
        Self {
            loader,
            registry,
            options,
        }
    }

    /// Generate every artifact
    ///
    /// Returns an error enumerating every unit and artifact failure if any
    /// occurred; artifacts unaffected by a failure are still produced.
    pub fn run(&self) -> Result<GenerationReport, GenerateError> {
        let (model, discovery_err) = Aggregator::new(self.loader, &self.options.input_dir)
            .with_policy(self.options.version_policy)
            .aggregate(&self.options.group_versions);

        let mut failures: Vec<GenerationError> =
            discovery_err.map(|e| e.failures).unwrap_or_default();

        let artifacts = planner::plan(&model, &self.options.plan);
        let renderer = Renderer::new(self.registry);
        let writer = ArtifactWriter::new()
            .with_header(self.options.header.clone())
            .with_verify(self.options.verify);

        let mut report = GenerationReport {
            apis: model.apis().count(),
            ..Default::default()
        };

        for artifact in &artifacts {
            let unit = artifact.path.display().to_string();

            let rendered = match renderer.render_artifact(artifact) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to render {} artifact {}: {}", artifact.kind, unit, e);
                    failures.push(GenerationError::new(unit, e));
                    continue;
                }
            };

            match writer.write(&artifact.path, &rendered) {
                Ok(WriteOutcome::Written) => {
                    tracing::debug!("Wrote {}", unit);
                    report.written.push(artifact.path.clone());
                }
                Ok(WriteOutcome::Unchanged) => {
                    tracing::debug!("Unchanged {}", unit);
                    report.unchanged.push(artifact.path.clone());
                }
                Err(e) => {
                    tracing::warn!("Failed to write {}: {}", unit, e);
                    failures.push(GenerationError::new(unit, e));
                }
            }
        }

        tracing::info!(
            "Generated {} artifact(s) ({} written, {} unchanged) for {} API(s)",
            artifacts.len(),
            report.written.len(),
            report.unchanged.len(),
            report.apis
        );

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(GenerateError {
                failures,
                written: report.written,
            })
        }
    }
}

//! Template rendering
//!
//! [`TemplateRegistry`] maps artifact kind names to compiled templates. It is
//! built once at startup, never mutated afterwards, and lent to a
//! [`Renderer`] by reference.

pub mod helpers;

use crate::planner::ArtifactSpec;
use handlebars::Handlebars;
use serde::Serialize;

/// Built-in templates, keyed by artifact kind name
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("factory", include_str!("templates/factory.rs.hbs")),
    ("genericInformer", include_str!("templates/generic.rs.hbs")),
    ("groupInterface", include_str!("templates/group_interface.rs.hbs")),
    (
        "versionInterface",
        include_str!("templates/version_interface.rs.hbs"),
    ),
    ("informer", include_str!("templates/informer.rs.hbs")),
];

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("unknown artifact kind: {0}")]
    UnknownKind(String),

    #[error("invalid template '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: handlebars::TemplateError,
    },

    #[error("failed to render '{kind}': {source}")]
    Execution {
        kind: String,
        #[source]
        source: handlebars::RenderError,
    },
}

/// Immutable kind -> template mapping
pub struct TemplateRegistry {
    handlebars: Handlebars<'static>,
}

impl TemplateRegistry {
    /// Registry holding the built-in artifact templates
    pub fn builtin() -> Result<Self, RenderError> {
        Self::from_sources(BUILTIN_TEMPLATES.iter().copied())
    }

    /// Compile a registry from `(kind, template)` pairs
    pub fn from_sources<'a>(
        sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        // Generated code is not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        helpers::register(&mut handlebars);

        for (name, source) in sources {
            handlebars
                .register_template_string(name, source)
                .map_err(|source| RenderError::Template {
                    name: name.to_string(),
                    source,
                })?;
        }

        Ok(Self { handlebars })
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.handlebars.has_template(kind)
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self
            .handlebars
            .get_templates()
            .keys()
            .map(String::as_str)
            .collect();
        kinds.sort_unstable();
        kinds
    }
}

/// Executes registered templates against a data context
pub struct Renderer<'a> {
    registry: &'a TemplateRegistry,
}

impl<'a> Renderer<'a> {
    pub fn new(registry: &'a TemplateRegistry) -> Self {
        Self { registry }
    }

    /// Render the template registered for `kind`
    pub fn render<T: Serialize>(&self, kind: &str, context: &T) -> Result<String, RenderError> {
        if !self.registry.contains(kind) {
            return Err(RenderError::UnknownKind(kind.to_string()));
        }

        let mut text = self
            .registry
            .handlebars
            .render(kind, context)
            .map_err(|source| RenderError::Execution {
                kind: kind.to_string(),
                source,
            })?;

        if !text.ends_with('\n') {
            text.push('\n');
        }
        Ok(text)
    }

    /// Render a planned artifact with its own context
    pub fn render_artifact(&self, artifact: &ArtifactSpec) -> Result<String, RenderError> {
        self.render(artifact.template_name(), &artifact.context)
    }
}

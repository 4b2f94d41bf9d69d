//! Artifact planning
//!
//! Turns an [`AggregatedModel`] into the ordered list of artifacts to render:
//! the factory, the generic dispatcher, then for each group its interface,
//! each version's interface and one accessor per resource.
//!
//! Planning is pure. Identical models always produce identical plans, which
//! keeps regenerated output byte-for-byte stable.

mod context;

pub use context::{
    AccessorContext, ApiContext, ArtifactContext, FactoryContext, GenericContext, GroupContext,
    VersionContext,
};

use crate::discovery::module_path;
use crate::models::AggregatedModel;
use std::fmt;
use std::path::{Path, PathBuf};

/// Kinds of generated artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Factory,
    GenericDispatcher,
    GroupInterface,
    VersionInterface,
    ResourceAccessor,
}

impl ArtifactKind {
    /// Name of the template rendering this kind
    pub fn template_name(&self) -> &'static str {
        match self {
            ArtifactKind::Factory => "factory",
            ArtifactKind::GenericDispatcher => "genericInformer",
            ArtifactKind::GroupInterface => "groupInterface",
            ArtifactKind::VersionInterface => "versionInterface",
            ArtifactKind::ResourceAccessor => "informer",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            ArtifactKind::Factory,
            ArtifactKind::GenericDispatcher,
            ArtifactKind::GroupInterface,
            ArtifactKind::VersionInterface,
            ArtifactKind::ResourceAccessor,
        ]
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template_name())
    }
}

/// One artifact to render and write
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSpec {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub context: ArtifactContext,
}

impl ArtifactSpec {
    pub fn template_name(&self) -> &'static str {
        self.kind.template_name()
    }
}

/// Output layout and import settings for a plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOptions {
    pub output_dir: PathBuf,
    /// Name of the distributed informers package
    pub package_name: String,
    /// Extension of generated files
    pub extension: String,
    /// Import path of the generated informers; derived from the model's
    /// module and the output directory when unset
    pub informers_package: Option<String>,
    /// Import path of the listers the accessors build on
    pub listers_package: String,
}

impl PlanOptions {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            package_name: "externalversions".to_string(),
            extension: "rs".to_string(),
            informers_package: None,
            listers_package: "informergen::cache".to_string(),
        }
    }

    /// `<outputDir>/informers/<packageName>`
    pub fn base_dir(&self) -> PathBuf {
        self.output_dir.join("informers").join(&self.package_name)
    }

    fn file(&self, dir: PathBuf, stem: &str) -> PathBuf {
        dir.join(format!("{}.{}", stem, self.extension))
    }

    fn informers_package_for(&self, module: Option<&str>) -> String {
        if let Some(package) = &self.informers_package {
            return package.clone();
        }
        if self.output_dir.is_absolute() {
            tracing::warn!(
                "Deriving the informers import path from absolute output dir {}; set informersPackage",
                self.output_dir.display()
            );
        }
        module_path(module.unwrap_or("crate"), &self.base_dir())
    }
}

/// Plan every artifact for `model`, in dependency order
pub fn plan(model: &AggregatedModel, options: &PlanOptions) -> Vec<ArtifactSpec> {
    let base = options.base_dir();
    let informer_package = options.informers_package_for(model.module.as_deref());
    let apis: Vec<ApiContext> = model.apis().map(ApiContext::from).collect();

    let mut artifacts = vec![
        ArtifactSpec {
            kind: ArtifactKind::Factory,
            path: options.file(base.clone(), "factory"),
            context: ArtifactContext::Factory(FactoryContext {
                package_name: options.package_name.clone(),
            }),
        },
        ArtifactSpec {
            kind: ArtifactKind::GenericDispatcher,
            path: options.file(base.clone(), "generic"),
            context: ArtifactContext::Generic(GenericContext {
                package_name: options.package_name.clone(),
                lister_package: options.listers_package.clone(),
                apis,
            }),
        },
    ];

    for (group, versions) in model.groups() {
        let group_dir = base.join(group);
        artifacts.push(ArtifactSpec {
            kind: ArtifactKind::GroupInterface,
            path: options.file(group_dir.clone(), "interface"),
            context: ArtifactContext::Group(GroupContext {
                informer_package: informer_package.clone(),
                group: group.to_string(),
                versions: versions.keys().cloned().collect(),
            }),
        });

        for (version, discovered) in versions {
            let version_dir = group_dir.join(version);
            let version_apis: Vec<ApiContext> = discovered.iter().map(ApiContext::from).collect();

            artifacts.push(ArtifactSpec {
                kind: ArtifactKind::VersionInterface,
                path: options.file(version_dir.clone(), "interface"),
                context: ArtifactContext::Version(VersionContext {
                    informer_package: informer_package.clone(),
                    group: group.to_string(),
                    version: version.clone(),
                    apis: version_apis.clone(),
                }),
            });

            for api in version_apis {
                artifacts.push(ArtifactSpec {
                    kind: ArtifactKind::ResourceAccessor,
                    path: options.file(version_dir.clone(), &api.resource),
                    context: ArtifactContext::Accessor(AccessorContext {
                        informer_package: informer_package.clone(),
                        lister_package: options.listers_package.clone(),
                        api,
                    }),
                });
            }
        }
    }

    tracing::debug!("Planned {} artifact(s)", artifacts.len());
    artifacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscoveredApi, GroupVersionKind};

    fn api(kind: &str, namespaced: bool) -> DiscoveredApi {
        DiscoveredApi {
            gvk: GroupVersionKind::new("example", "v1", kind),
            namespaced,
            package: "example_apis::apis::example::v1".to_string(),
        }
    }

    fn count(plan: &[ArtifactSpec], kind: ArtifactKind) -> usize {
        plan.iter().filter(|a| a.kind == kind).count()
    }

    #[test]
    fn test_empty_model_still_plans_factory_and_generic() {
        let plan = plan(&AggregatedModel::new(), &PlanOptions::new("out"));
        let kinds: Vec<_> = plan.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![ArtifactKind::Factory, ArtifactKind::GenericDispatcher]
        );
    }

    #[test]
    fn test_many_resources_single_factory_and_generic() {
        let mut model = AggregatedModel::new();
        model.insert(
            "example",
            "v1",
            (0..5).map(|i| api(&format!("Kind{}", i), true)).collect(),
        );
        let plan = plan(&model, &PlanOptions::new("out"));

        assert_eq!(count(&plan, ArtifactKind::Factory), 1);
        assert_eq!(count(&plan, ArtifactKind::GenericDispatcher), 1);
        assert_eq!(count(&plan, ArtifactKind::ResourceAccessor), 5);

        match &plan[1].context {
            ArtifactContext::Generic(generic) => assert_eq!(generic.apis.len(), 5),
            other => panic!("unexpected context: {:?}", other),
        }
    }

    #[test]
    fn test_informer_package_derived_from_module() {
        let mut model = AggregatedModel::new();
        model.module = Some("example_apis".to_string());
        model.insert("example", "v1", vec![api("TestType", true)]);

        let plan = plan(&model, &PlanOptions::new("src/generated"));
        let accessor = plan
            .iter()
            .find(|a| a.kind == ArtifactKind::ResourceAccessor)
            .unwrap();
        match &accessor.context {
            ArtifactContext::Accessor(ctx) => {
                assert_eq!(
                    ctx.informer_package,
                    "example_apis::generated::informers::externalversions"
                );
                assert_eq!(ctx.lister_package, "informergen::cache");
                assert_eq!(ctx.api.resource, "testtypes");
            }
            other => panic!("unexpected context: {:?}", other),
        }
        assert_eq!(
            accessor.path,
            PathBuf::from("src/generated/informers/externalversions/example/v1/testtypes.rs")
        );
    }
}

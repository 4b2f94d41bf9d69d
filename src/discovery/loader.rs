//! Source loading
//!
//! A [`SourceLoader`] turns one group/version directory into the packages it
//! declares. The filesystem loader reads `*.rs` files in sorted order and
//! resolves the owning module from the nearest `Cargo.toml`.

use super::markers::MarkerScanner;
use super::DiscoveryError;
use crate::models::DeclaredType;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// One loaded source package
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPackage {
    pub dir: PathBuf,
    /// Owning module, if the package belongs to one
    pub module: Option<String>,
    /// Module-qualified import path of the package
    pub import_path: String,
    /// Declared types in source order
    pub types: Vec<DeclaredType>,
}

/// Loads declared types from a group/version source directory
#[cfg_attr(test, mockall::automock)]
pub trait SourceLoader {
    fn load(&self, path: &Path) -> Result<Vec<LoadedPackage>, DiscoveryError>;
}

/// Loads Rust sources from disk
pub struct FsSourceLoader {
    scanner: MarkerScanner,
}

#[derive(Deserialize)]
struct Manifest {
    package: Option<ManifestPackage>,
}

#[derive(Deserialize)]
struct ManifestPackage {
    name: String,
}

impl FsSourceLoader {
    pub fn new() -> Result<Self, DiscoveryError> {
        Ok(Self {
            scanner: MarkerScanner::new()?,
        })
    }

    /// Find the nearest manifest declaring a package, returning its
    /// directory and the package name as a Rust identifier
    fn resolve_module(dir: &Path) -> Result<Option<(PathBuf, String)>, DiscoveryError> {
        for ancestor in dir.ancestors() {
            let manifest_path = ancestor.join("Cargo.toml");
            if !manifest_path.is_file() {
                continue;
            }

            let contents =
                std::fs::read_to_string(&manifest_path).map_err(|source| DiscoveryError::Load {
                    path: manifest_path.clone(),
                    source,
                })?;
            let manifest: Manifest =
                toml::from_str(&contents).map_err(|source| DiscoveryError::Manifest {
                    path: manifest_path.clone(),
                    source,
                })?;

            if let Some(package) = manifest.package {
                return Ok(Some((ancestor.to_path_buf(), package.name.replace('-', "_"))));
            }
        }
        Ok(None)
    }
}

impl SourceLoader for FsSourceLoader {
    fn load(&self, path: &Path) -> Result<Vec<LoadedPackage>, DiscoveryError> {
        if !path.is_dir() {
            return Err(DiscoveryError::NotADirectory {
                path: path.to_path_buf(),
            });
        }

        let dir = path.canonicalize().map_err(|source| DiscoveryError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();
        let entries = std::fs::read_dir(&dir).map_err(|source| DiscoveryError::Load {
            path: dir.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| DiscoveryError::Load {
                path: dir.clone(),
                source,
            })?;
            let file = entry.path();
            if file.is_file() && file.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(file);
            }
        }
        // read_dir order is platform dependent
        files.sort();

        let mut types = Vec::new();
        for file in &files {
            let source = std::fs::read_to_string(file).map_err(|source| DiscoveryError::Load {
                path: file.clone(),
                source,
            })?;
            let found = self.scanner.scan(&source);
            tracing::debug!("Scanned {:?}: {} declaration(s)", file, found.len());
            types.extend(found);
        }

        let (module, import_path) = match Self::resolve_module(&dir)? {
            Some((root, module)) => {
                let relative = dir.strip_prefix(&root).unwrap_or(&dir);
                let import_path = module_path(&module, relative);
                (Some(module), import_path)
            }
            None => (None, module_path("crate", &dir)),
        };

        Ok(vec![LoadedPackage {
            dir,
            module,
            import_path,
            types,
        }])
    }
}

/// Join a module name and a directory into a `::` separated import path
///
/// A leading `src` component is dropped since it is not part of the module
/// tree; `-` and `.` become `_`.
pub fn module_path(module: &str, relative: &Path) -> String {
    let mut segments = vec![module.to_string()];
    let mut components = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .peekable();

    if components.peek().map(String::as_str) == Some("src") {
        components.next();
    }
    segments.extend(components.map(|s| s.replace(['-', '.'], "_")));
    segments.join("::")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_module_path_drops_src() {
        assert_eq!(
            module_path("example_apis", Path::new("src/apis/example/v1")),
            "example_apis::apis::example::v1"
        );
        assert_eq!(
            module_path("m", Path::new("./pkg/my-group.io/v1")),
            "m::pkg::my_group_io::v1"
        );
    }

    #[test]
    fn test_load_reads_sorted_files_and_module() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("Cargo.toml"),
            "[package]\nname = \"example-apis\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();
        let dir = root.path().join("src/apis/example/v1");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("b.rs"), "// +genclient\npub struct Second {}\n").unwrap();
        fs::write(dir.join("a.rs"), "// +genclient\npub struct First {}\n").unwrap();
        fs::write(dir.join("notes.txt"), "// +genclient\npub struct Ignored {}\n").unwrap();

        let packages = FsSourceLoader::new().unwrap().load(&dir).unwrap();
        assert_eq!(packages.len(), 1);

        let package = &packages[0];
        assert_eq!(package.module.as_deref(), Some("example_apis"));
        assert_eq!(package.import_path, "example_apis::apis::example::v1");

        let names: Vec<_> = package.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_load_missing_directory_fails() {
        let root = tempfile::tempdir().unwrap();
        let err = FsSourceLoader::new()
            .unwrap()
            .load(&root.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::NotADirectory { .. }));
    }
}

//! CLI command handlers

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::{paths, Config, ConfigLayer, ConfigLoader};
use crate::discovery::{FsSourceLoader, VersionPolicy};
use crate::generator::{GenerateOptions, Generator};
use crate::models::GroupVersions;
use crate::planner::PlanOptions;
use crate::render::TemplateRegistry;

/// Flags of the generate command; each one set overrides the configuration
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Project configuration file (defaults to ./informergen.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the <group>/<version> source trees
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Directory generated informers are written below
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Group and versions to generate, as group:v1,v2 (repeatable)
    #[arg(long = "group-versions")]
    pub group_versions: Vec<String>,

    /// File whose text is prepended to every generated file
    #[arg(long)]
    pub header_file: Option<PathBuf>,

    /// Name of the generated informers package
    #[arg(long)]
    pub package_name: Option<String>,

    /// Generate every declared version, not only the first of each group
    #[arg(long)]
    pub all_versions: bool,

    /// Check that generated files are up to date instead of writing them
    #[arg(long)]
    pub verify: bool,
}

impl GenerateArgs {
    /// The flags as the highest-precedence configuration layer
    pub fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            group_versions: (!self.group_versions.is_empty()).then(|| self.group_versions.clone()),
            header_file: self.header_file.clone(),
            package_name: self.package_name.clone(),
            version_policy: self.all_versions.then_some(VersionPolicy::All),
            ..Default::default()
        }
    }
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value
    Get {
        /// Configuration key (e.g., "outputDir", "packageName")
        key: Option<String>,
        /// Project configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List all configuration
    List {
        /// Project configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show configuration file paths
    Path,
    /// Validate configuration
    Validate {
        /// Project configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key, config } => {
            let config =
                ConfigLoader::load(config.as_deref()).context("Failed to load configuration")?;

            if let Some(key) = key {
                let value = crate::config::get_config_value(&config, &key)?;
                println!("{}", value);
            } else {
                print_config(&config)?;
            }
        }
        ConfigSubcommand::List { config } => {
            let config =
                ConfigLoader::load(config.as_deref()).context("Failed to load configuration")?;
            print_config(&config)?;
        }
        ConfigSubcommand::Path => {
            println!("user:    {}", paths::user_config_path().display());
            println!("project: {}", paths::PROJECT_CONFIG_FILE);
        }
        ConfigSubcommand::Validate { config } => {
            let config =
                ConfigLoader::load(config.as_deref()).context("Failed to load configuration")?;
            config
                .validate()
                .context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}

fn print_config(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    print!("{}", yaml);
    Ok(())
}

/// Build the options of a generation run from a validated configuration
pub fn generate_options(config: &Config, verify: bool) -> Result<GenerateOptions> {
    let input_dir = config
        .input_dir
        .clone()
        .context("inputDir is required")?;

    let group_versions = config
        .group_versions
        .iter()
        .map(|gv| gv.parse::<GroupVersions>())
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid groupVersions")?;

    let header = config
        .header_file
        .as_deref()
        .map(read_header)
        .transpose()?;

    let plan = PlanOptions {
        package_name: config.package_name.clone(),
        extension: config.file_extension.clone(),
        informers_package: config.informers_package.clone(),
        listers_package: config.listers_package.clone(),
        ..PlanOptions::new(&config.output_dir)
    };

    Ok(GenerateOptions {
        input_dir,
        group_versions,
        version_policy: config.version_policy,
        plan,
        header,
        verify,
    })
}

fn read_header(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read header file: {}", path.display()))
}

/// Handle the generate command
pub fn handle_generate(args: GenerateArgs) -> Result<()> {
    let mut config =
        ConfigLoader::load(args.config.as_deref()).context("Failed to load configuration")?;
    config.apply(args.layer());
    config.validate().context("Invalid configuration")?;

    let options = generate_options(&config, args.verify)?;
    let registry = TemplateRegistry::builtin().context("Failed to load templates")?;
    let loader = FsSourceLoader::new().context("Failed to build source loader")?;

    tracing::debug!(
        "Generating {} group(s) from {} into {}",
        options.group_versions.len(),
        options.input_dir.display(),
        options.plan.base_dir().display()
    );

    let report = Generator::new(&loader, &registry, options).run()?;

    if args.verify {
        println!("{} generated file(s) are up to date", report.unchanged.len());
    } else {
        println!(
            "Generated informers for {} API(s): {} file(s) written, {} unchanged",
            report.apis,
            report.written.len(),
            report.unchanged.len()
        );
    }
    Ok(())
}

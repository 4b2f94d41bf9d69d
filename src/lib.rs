//! Cluster-aware informer generation
//!
//! Discovers annotated API types in Rust sources, plans and renders informer
//! and lister code for them, and provides the cluster-aware cache the
//! generated code runs on.

pub mod cache;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod generator;
pub mod models;
pub mod planner;
pub mod render;

// Re-export commonly used types for convenience
pub use cache::{CacheError, ClusterIndexer, ClusterInformer, ClusterLister, Lister, NamespaceLister};
pub use error::{GenerateError, GenerationError};
pub use generator::{GenerateOptions, GenerationReport, Generator};

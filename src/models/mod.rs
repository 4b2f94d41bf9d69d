//! Generation-time data model
//!
//! Built fresh for every generation run and dropped once artifacts are emitted.

mod aggregated;
mod api;
mod gvk;

pub use aggregated::{AggregatedModel, GroupVersionMap};
pub use api::{DeclaredType, DiscoveredApi};
pub use gvk::{GroupVersionKind, GroupVersions, ParseGroupVersionsError};

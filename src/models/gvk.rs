//! Group/version identities
//!
//! `GroupVersionKind` identifies one API type. `GroupVersions` is one entry of
//! the `--group-versions` input: a group and the versions declared for it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity triple for a resource type
///
/// Two discoveries with equal GVKs describe the same logical resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Lowercased plural resource name, as used in output file names
    pub fn resource(&self) -> String {
        format!("{}s", self.kind.to_lowercase())
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}, Kind={}", self.group, self.version, self.kind)
    }
}

/// A group and the versions declared for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVersions {
    pub group: String,
    pub versions: Vec<String>,
}

impl GroupVersions {
    pub fn new(group: impl Into<String>, versions: &[&str]) -> Self {
        Self {
            group: group.into(),
            versions: versions.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl fmt::Display for GroupVersions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.versions.join(","))
    }
}

/// Error returned when a group/versions declaration cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid group/versions '{input}': {reason}")]
pub struct ParseGroupVersionsError {
    pub input: String,
    pub reason: &'static str,
}

impl FromStr for GroupVersions {
    type Err = ParseGroupVersionsError;

    /// Parses `group:v1,v2` or `group/v1`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParseGroupVersionsError {
            input: s.to_string(),
            reason,
        };

        let (group, versions) = s
            .split_once(':')
            .or_else(|| s.split_once('/'))
            .ok_or_else(|| err("expected 'group:version[,version]'"))?;

        let group = group.trim();
        if group.is_empty() {
            return Err(err("group is empty"));
        }

        let versions: Vec<String> = versions
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if versions.is_empty() {
            return Err(err("no versions listed"));
        }

        Ok(Self {
            group: group.to_string(),
            versions,
        })
    }
}

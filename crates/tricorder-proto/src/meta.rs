// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Run metadata: which implementation produced the stream, on what
//! platform, under which CI system.

use serde::{Deserialize, Serialize};

/// Metadata about the producing implementation and its environment.
/// Emitted once, first in every stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Version of this message protocol.
    pub protocol_version: String,
    /// The implementation that produced the stream.
    pub implementation: Product,
    /// Language runtime the implementation ran on.
    pub runtime: Product,
    /// Operating system.
    pub os: Product,
    /// Processor architecture.
    pub cpu: Product,
    /// CI system detected from the environment, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci: Option<Ci>,
}

/// A named component with an optional version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Component name.
    pub name: String,
    /// Component version, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Product {
    /// Builds a product with a known version.
    #[must_use]
    pub fn versioned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// Builds a product whose version is unknown.
    #[must_use]
    pub fn unversioned(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }
}

/// Continuous-integration context the run executed under.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ci {
    /// CI system name (e.g. `GitHub Actions`).
    pub name: String,
    /// Link to the build, when the system exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Build number or identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,
    /// Git context of the build, when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<Git>,
}

/// Git coordinates of a CI build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Git {
    /// Remote URL the build checked out from.
    pub remote: String,
    /// Commit hash that was built.
    pub revision: String,
    /// Branch name, when the build was branch-based.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Tag name, when the build was tag-based.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

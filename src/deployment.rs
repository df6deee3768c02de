//! Identification of the deployment whose files are fetched.

use std::fmt;

use serde::Serialize;

/// The single resolver that selects a deployed snapshot.
///
/// Serializes as a one-entry map (`{"alias": "production"}`) so it can be
/// flattened into request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeploymentRef {
    /// A named alias such as `production`.
    Alias(String),
    /// An exact commit SHA.
    CommitSha(String),
    /// The latest deployment of a branch.
    Branch(String),
}

impl DeploymentRef {
    /// Query/body parameter name used by the API for this resolver.
    #[must_use]
    pub fn param_name(&self) -> &'static str {
        match self {
            Self::Alias(_) => "alias",
            Self::CommitSha(_) => "commitSha",
            Self::Branch(_) => "branch",
        }
    }

    /// The resolver value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Alias(value) | Self::CommitSha(value) | Self::Branch(value) => value,
        }
    }

    /// Returns the alias, if this reference is one.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Alias(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the branch, if this reference is one.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        match self {
            Self::Branch(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for DeploymentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.param_name(), self.value())
    }
}

/// What to fetch: a repository, a directory within its deployment, and the
/// snapshot resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    /// Repository in `owner/name` form.
    pub repository: String,
    /// Directory within the deployment.
    pub source_path: String,
    /// Which deployed snapshot to read.
    pub reference: DeploymentRef,
}

impl DeploymentTarget {
    /// Creates a new target.
    pub fn new(
        repository: impl Into<String>,
        source_path: impl Into<String>,
        reference: DeploymentRef,
    ) -> Self {
        Self {
            repository: repository.into(),
            source_path: source_path.into(),
            reference,
        }
    }
}

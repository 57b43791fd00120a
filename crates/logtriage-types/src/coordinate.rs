use serde::{Deserialize, Serialize};

/// A resolved source-file coordinate: which repository, which file, which
/// revision. Derived by the code-location resolver; never stored beyond the
/// session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeCoordinate {
    /// Namespace path of the repository, e.g. `eco/document`.
    pub project: String,
    /// Repo-root-relative file path.
    pub file_path: String,
    pub branch: String,
}

impl CodeCoordinate {
    pub fn new(
        project: impl Into<String>,
        file_path: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            file_path: file_path.into(),
            branch: branch.into(),
        }
    }
}

impl std::fmt::Display for CodeCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}@{}", self.project, self.file_path, self.branch)
    }
}

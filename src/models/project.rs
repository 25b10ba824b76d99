use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Branch used as the stack base when a project does not name one.
pub const DEFAULT_MASTER_BRANCH: &str = "main";

/// A repository whose stacked work is being tracked.
///
/// Projects are the top-level organizational unit. The `master_branch` is the
/// trunk every feature's stack is expected to descend from, and is the anchor
/// of the generated verification scripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Git ref of the trunk branch (e.g. `main`, `develop`).
    pub master_branch: String,
    pub repo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A project with aggregate counts, used for list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub feature_count: i64,
    pub branch_count: i64,
}

/// Input for creating a new project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to [`DEFAULT_MASTER_BRANCH`] if not specified.
    pub master_branch: Option<String>,
    pub repo_url: Option<String>,
}

/// Input for updating an existing project. All fields are optional for partial updates;
/// an explicit `null` clears a nullable field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProjectInput {
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "super::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    pub master_branch: Option<String>,
    #[serde(
        default,
        deserialize_with = "super::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub repo_url: Option<Option<String>>,
}

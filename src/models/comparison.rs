use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded ancestry check between two branches of a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchComparison {
    pub id: i64,
    pub project_id: i64,
    pub parent_branch: String,
    pub child_branch: String,
    /// `None` until the user reports the outcome of the check.
    pub is_ancestor: Option<bool>,
    /// Commit hash printed by `git merge-base`, if reported.
    pub merge_base: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// Input for recording a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComparisonInput {
    pub parent_branch: String,
    pub child_branch: String,
    pub is_ancestor: Option<bool>,
    pub merge_base: Option<String>,
}

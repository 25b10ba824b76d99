use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::branch::Branch;

/// Accent colour given to features created without one.
pub const DEFAULT_FEATURE_COLOR: &str = "#6366f1";

/// A unit of work implemented as a stack of branches.
///
/// Features usually map onto a ticket (`identifier`, e.g. `11627`) and own an
/// ordered collection of [`Branch`]es. The stack's base branch is inherited
/// from the parent project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub id: i64,
    pub project_id: i64,
    /// Short external reference, typically a ticket number.
    pub identifier: String,
    pub name: String,
    pub description: Option<String>,
    /// Hex colour used by clients to tell features apart.
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A feature with branch counts, used for list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSummary {
    #[serde(flatten)]
    pub feature: Feature,
    pub branch_count: i64,
    /// Branches flagged as part of the stack.
    pub active_branch_count: i64,
}

/// A feature together with its branches in stack order.
///
/// The `feature` fields are flattened into the JSON response. `base_branch`
/// is the owning project's master branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureWithBranches {
    #[serde(flatten)]
    pub feature: Feature,
    pub base_branch: String,
    pub branches: Vec<Branch>,
}

/// Input for creating a new feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeatureInput {
    pub identifier: String,
    pub name: String,
    pub description: Option<String>,
    /// Defaults to [`DEFAULT_FEATURE_COLOR`] if not specified.
    pub color: Option<String>,
}

/// Input for updating an existing feature. All fields are optional for partial updates;
/// an explicit `null` clears a nullable field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFeatureInput {
    pub identifier: Option<String>,
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "super::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    pub color: Option<String>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A git branch tracked as one entry of a feature's stack.
///
/// `position` is the branch's 1-based rank within the feature. Branches that
/// are part of the stack and not deprecated form the *sequencing domain*:
/// their positions are kept dense (`1..N`) by every mutation. Excluded
/// branches keep whatever position they last had.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: i64,
    pub feature_id: i64,
    /// Full git ref name, e.g. `alice-11627-db-infrastructure`.
    pub name: String,
    /// Display name, e.g. `db-infrastructure`.
    pub short_name: Option<String>,
    pub position: i64,
    pub parent_branch_id: Option<i64>,
    pub status: BranchStatus,
    pub pr_url: Option<String>,
    pub pr_number: Option<i64>,
    pub pr_status: Option<PrStatus>,
    pub notes: Option<String>,
    pub is_part_of_stack: bool,
    /// Branch exists only in the tracker, not in git yet.
    pub is_planned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Branch {
    /// Whether the branch takes part in position sequencing and ancestry verification.
    pub fn is_stacked(&self) -> bool {
        Self::in_stack(self.is_part_of_stack, self.status)
    }

    /// Membership rule of the sequencing domain.
    pub fn in_stack(is_part_of_stack: bool, status: BranchStatus) -> bool {
        is_part_of_stack && status != BranchStatus::Deprecated
    }
}

/// The lifecycle status of a branch.
///
/// - `Planned`: Exists only in the tracker
/// - `Active`: Work in progress
/// - `PrRaised`: A pull request is open for review
/// - `Merged`: Landed on the base branch
/// - `Blocked`: Waiting on something outside the stack
/// - `Deprecated`: Abandoned, excluded from sequencing and verification
///
/// Older records used a different vocabulary; those spellings are accepted
/// as aliases and map onto the closest canonical status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BranchStatus {
    #[serde(alias = "created")]
    Planned,
    #[default]
    #[serde(alias = "wip")]
    Active,
    #[serde(
        alias = "pr_created",
        alias = "in_review",
        alias = "changes_requested",
        alias = "approved"
    )]
    PrRaised,
    Merged,
    Blocked,
    Deprecated,
}

impl BranchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::PrRaised => "pr_raised",
            Self::Merged => "merged",
            Self::Blocked => "blocked",
            Self::Deprecated => "deprecated",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "planned" | "created" => Some(Self::Planned),
            "active" | "wip" => Some(Self::Active),
            "pr_raised" | "pr_created" | "in_review" | "changes_requested" | "approved" => {
                Some(Self::PrRaised)
            }
            "merged" => Some(Self::Merged),
            "blocked" => Some(Self::Blocked),
            "deprecated" => Some(Self::Deprecated),
            _ => None,
        }
    }
}

/// State of the pull request attached to a branch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PrStatus {
    Open,
    Merged,
    Closed,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Merged => "merged",
            Self::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "merged" => Some(Self::Merged),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Input for creating a branch. The position is always appended to the end
/// of the feature's stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBranchInput {
    pub name: String,
    pub short_name: Option<String>,
    pub parent_branch_id: Option<i64>,
    /// Defaults to `Active` if not specified.
    pub status: Option<BranchStatus>,
    pub pr_url: Option<String>,
    pub pr_number: Option<i64>,
    pub pr_status: Option<PrStatus>,
    pub notes: Option<String>,
    /// Defaults to `true` if not specified.
    pub is_part_of_stack: Option<bool>,
    #[serde(default)]
    pub is_planned: bool,
}

impl CreateBranchInput {
    /// Minimal input for a branch with the given git ref name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_name: None,
            parent_branch_id: None,
            status: None,
            pr_url: None,
            pr_number: None,
            pr_status: None,
            notes: None,
            is_part_of_stack: None,
            is_planned: false,
        }
    }
}

/// Input for updating a branch. All fields are optional for partial updates;
/// an explicit `null` clears a nullable field.
///
/// Positions are not writable here; use a reorder instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBranchInput {
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "super::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub short_name: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "super::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_branch_id: Option<Option<i64>>,
    pub status: Option<BranchStatus>,
    #[serde(
        default,
        deserialize_with = "super::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub pr_url: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "super::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub pr_number: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "super::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub pr_status: Option<Option<PrStatus>>,
    #[serde(
        default,
        deserialize_with = "super::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
    pub is_part_of_stack: Option<bool>,
    pub is_planned: Option<bool>,
}

/// Input for reordering a feature's stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderBranchesInput {
    /// Every stacked branch id of the feature, in the desired order.
    pub ordered_ids: Vec<i64>,
}

/// A branch listed across a whole project, with its feature context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectBranch {
    pub id: i64,
    pub name: String,
    pub short_name: Option<String>,
    pub feature_id: i64,
    pub feature_identifier: String,
    pub feature_name: String,
    pub status: BranchStatus,
    pub position: i64,
}

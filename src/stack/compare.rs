//! Git commands for inspecting the relationship between two branches.

use serde::{Deserialize, Serialize};

/// A ready-to-paste git command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonCommand {
    pub key: String,
    pub label: String,
    pub command: String,
    /// Whether running the command changes the repository.
    pub mutates: bool,
}

impl ComparisonCommand {
    fn new(key: &str, label: &str, command: String, mutates: bool) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            command,
            mutates,
        }
    }
}

/// Commands comparing `child` against `parent`, inspection first.
pub fn comparison_commands(parent: &str, child: &str) -> Vec<ComparisonCommand> {
    vec![
        ComparisonCommand::new(
            "merge_base",
            "Find merge base",
            format!("echo \"merge-base: $(git merge-base {parent} {child})\""),
            false,
        ),
        ComparisonCommand::new(
            "is_ancestor",
            "Check ancestry",
            format!(
                "git merge-base --is-ancestor {parent} {child} && echo \"✅ {child} is based on {parent}\" || echo \"❌ NOT based on {parent}\""
            ),
            false,
        ),
        ComparisonCommand::new(
            "diff",
            "Changes in child",
            format!("git diff {parent}...{child}"),
            false,
        ),
        ComparisonCommand::new(
            "log",
            "Commits in child",
            format!("git log {parent}..{child} --oneline"),
            false,
        ),
        ComparisonCommand::new(
            "cherry",
            "Commits not upstream",
            format!("git cherry -v {parent} {child}"),
            false,
        ),
        ComparisonCommand::new(
            "rebase",
            "Rebase child onto parent",
            format!("git checkout {child} && git rebase {parent}"),
            true,
        ),
    ]
}

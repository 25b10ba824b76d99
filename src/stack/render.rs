//! ASCII rendering of a feature's branch stack.

use crate::models::{Branch, BranchStatus};

const PLANNED: char = '◇';
const ACTIVE: char = '○';
const PR_RAISED: char = '◐';
const MERGED: char = '●';
const BLOCKED: char = '■';
const DEPRECATED: char = '✗';

/// Get the status symbol for a branch status.
fn status_symbol(status: BranchStatus) -> char {
    match status {
        BranchStatus::Planned => PLANNED,
        BranchStatus::Active => ACTIVE,
        BranchStatus::PrRaised => PR_RAISED,
        BranchStatus::Merged => MERGED,
        BranchStatus::Blocked => BLOCKED,
        BranchStatus::Deprecated => DEPRECATED,
    }
}

/// Render a stack as a chain hanging off its base branch.
///
/// Each stacked branch is nested under the branch it should be based on.
/// Branches outside the stack are listed afterwards.
///
/// Example output:
/// ```text
/// main
/// └── ● 1. alice-db
///     └── ◐ 2. alice-api
///         └── ○ 3. alice-ui
/// (not in stack)
/// └── ✗ alice-spike
/// ```
pub fn render_stack(base_branch: &str, branches: &[Branch]) -> String {
    let mut stacked: Vec<&Branch> = branches.iter().filter(|b| b.is_stacked()).collect();
    stacked.sort_by_key(|b| (b.position, b.id));
    let excluded: Vec<&Branch> = branches.iter().filter(|b| !b.is_stacked()).collect();

    let mut output = String::new();
    output.push_str(base_branch);
    output.push('\n');

    let mut prefix = String::new();
    for branch in &stacked {
        output.push_str(&prefix);
        output.push_str("└── ");
        output.push(status_symbol(branch.status));
        output.push_str(&format!(" {}. {}", branch.position, label(branch)));
        output.push('\n');
        prefix.push_str("    ");
    }

    if !excluded.is_empty() {
        output.push_str("(not in stack)\n");
        for (i, branch) in excluded.iter().enumerate() {
            let connector = if i == excluded.len() - 1 {
                "└── "
            } else {
                "├── "
            };
            output.push_str(connector);
            output.push(status_symbol(branch.status));
            output.push(' ');
            output.push_str(&label(branch));
            output.push('\n');
        }
    }

    output
}

fn label(branch: &Branch) -> String {
    match branch.pr_number {
        Some(pr) => format!("{} (#{})", branch.name, pr),
        None => branch.name.clone(),
    }
}

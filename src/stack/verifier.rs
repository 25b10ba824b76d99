//! Read-only shell snippets that check a stack's git ancestry.
//!
//! Verification is split in two passes. [`plan_checks`] decides which pairs
//! are compared and in what order; [`render_one_liner`] and [`render_script`]
//! serialize those checks. Generated text only ever runs
//! `git merge-base --is-ancestor` against local refs.
//!
//! Branch names are interpolated verbatim. Names containing shell
//! metacharacters produce scripts that do something other than a check.

use serde::{Deserialize, Serialize};

use crate::models::{Branch, BranchStatus};

/// Output for a stack with nothing to check, used for both artifacts.
pub const NO_BRANCHES: &str = "# No branches to verify";

const SCRIPT_HEADER: &[&str] = &[
    "#!/bin/bash",
    "# Stack Verification Script (read-only)",
    "# Checks each branch is properly rebased on its parent",
    "# NOTE: Uses local refs only - no remote operations",
    "",
    "echo '🔍 Verifying branch stack (local refs)...'",
    "echo ''",
    "ERRORS=0",
    "",
];

/// One branch of the stack as seen by the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEntry {
    pub id: i64,
    pub name: String,
    pub position: i64,
    pub status: BranchStatus,
}

impl From<&Branch> for StackEntry {
    fn from(branch: &Branch) -> Self {
        Self {
            id: branch.id,
            name: branch.name.clone(),
            position: branch.position,
            status: branch.status,
        }
    }
}

/// Verification artifacts for one feature's stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackVerification {
    pub branch_count: usize,
    pub base_branch: String,
    pub branches: Vec<StackEntry>,
    /// `;`-joined checks; every check runs regardless of earlier failures.
    pub one_liner: String,
    /// Bash script counting failures in `ERRORS` and exiting non-zero on any.
    pub script: String,
}

/// A single ancestry check: `basis` must be an ancestor of `subject`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check<'a> {
    /// 1-based number shown in the output.
    pub index: usize,
    pub subject: &'a str,
    pub basis: &'a str,
}

/// Pair each stack entry with its predecessor, the first with `base_branch`.
pub fn plan_checks<'a, S: AsRef<str>>(base_branch: &'a str, stack: &'a [S]) -> Vec<Check<'a>> {
    let mut basis = base_branch;
    stack
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let subject = entry.as_ref();
            let check = Check {
                index: i + 1,
                subject,
                basis,
            };
            basis = subject;
            check
        })
        .collect()
}

pub fn render_one_liner(checks: &[Check<'_>]) -> String {
    if checks.is_empty() {
        return NO_BRANCHES.to_string();
    }

    checks
        .iter()
        .map(|c| {
            format!(
                "(git merge-base --is-ancestor {basis} {subject} && echo \"✅ {index}. {subject} ← {basis}\" || echo \"❌ {index}. NOT OK\")",
                basis = c.basis,
                subject = c.subject,
                index = c.index,
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn render_script(checks: &[Check<'_>]) -> String {
    if checks.is_empty() {
        return NO_BRANCHES.to_string();
    }

    let mut lines: Vec<String> = SCRIPT_HEADER.iter().map(|l| l.to_string()).collect();

    for c in checks {
        lines.push(format!(
            "# Check {}: {} is based on {}",
            c.index, c.subject, c.basis
        ));
        lines.push(format!(
            "if git merge-base --is-ancestor {} {} 2>/dev/null; then",
            c.basis, c.subject
        ));
        lines.push(format!("  echo \"✅ {}. {}\"", c.index, c.subject));
        lines.push(format!("  echo \"   └─ based on {}\"", c.basis));
        lines.push("else".to_string());
        lines.push(format!("  echo \"❌ {}. {}\"", c.index, c.subject));
        lines.push(format!("  echo \"   └─ NOT based on {}\"", c.basis));
        lines.push("  ERRORS=$((ERRORS + 1))".to_string());
        lines.push("fi".to_string());
        lines.push("echo ''".to_string());
    }

    lines.push("if [ $ERRORS -eq 0 ]; then".to_string());
    lines.push(format!(
        "  echo \"🎉 All {} branches are properly stacked!\"",
        checks.len()
    ));
    lines.push("else".to_string());
    lines.push("  echo \"⚠️  Found $ERRORS issue(s) in the stack\"".to_string());
    lines.push("  exit 1".to_string());
    lines.push("fi".to_string());

    lines.join("\n")
}

/// Build both artifacts for a stack.
///
/// `stack` must already be filtered to stacked branches (see
/// [`Branch::is_stacked`]) and sorted by ascending position.
pub fn generate_verification(base_branch: &str, stack: &[StackEntry]) -> StackVerification {
    let names: Vec<&str> = stack.iter().map(|e| e.name.as_str()).collect();
    let checks = plan_checks(base_branch, &names);

    StackVerification {
        branch_count: stack.len(),
        base_branch: base_branch.to_string(),
        branches: stack.to_vec(),
        one_liner: render_one_liner(&checks),
        script: render_script(&checks),
    }
}

mod schema;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::StackError;
use crate::models::*;
use crate::stack::{self, StackEntry, StackVerification};

const PROJECT_COLUMNS: &str =
    "p.id, p.name, p.description, p.master_branch, p.repo_url, p.created_at, p.updated_at";

const FEATURE_COLUMNS: &str =
    "f.id, f.project_id, f.identifier, f.name, f.description, f.color, f.created_at, f.updated_at";

const BRANCH_COLUMNS: &str = "b.id, b.feature_id, b.name, b.short_name, b.position, b.parent_branch_id, b.status,
     b.pr_url, b.pr_number, b.pr_status, b.notes, b.is_part_of_stack, b.is_planned,
     b.created_at, b.updated_at";

/// SQLite-backed store for projects, features, branches and comparisons.
///
/// A single connection is shared behind a mutex, so every operation is
/// serialized. Operations that rewrite several branch positions run inside
/// one transaction and either fully apply or leave the stack untouched.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        tracing::debug!("Opened database at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))
    }

    // ============================================================
    // Project operations
    // ============================================================

    pub fn get_all_projects(&self) -> Result<Vec<ProjectSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS},
                (SELECT COUNT(*) FROM features f WHERE f.project_id = p.id),
                (SELECT COUNT(*) FROM branches b JOIN features f ON b.feature_id = f.id
                 WHERE f.project_id = p.id)
             FROM projects p ORDER BY p.updated_at DESC, p.id DESC"
        ))?;

        let projects = stmt
            .query_map([], |row| {
                Ok(ProjectSummary {
                    project: row_to_project(row)?,
                    feature_count: row.get(7)?,
                    branch_count: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let conn = self.lock()?;
        query_project(&conn, id)
    }

    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project> {
        require_non_empty("Project name", &input.name)?;
        let master_branch = input
            .master_branch
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MASTER_BRANCH.to_string());

        let conn = self.lock()?;
        let now = Utc::now();

        conn.execute(
            "INSERT INTO projects (name, description, master_branch, repo_url, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                &input.name,
                &input.description,
                &master_branch,
                &input.repo_url,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(project_id = id, "Created project {}", input.name);

        Ok(Project {
            id,
            name: input.name,
            description: input.description,
            master_branch,
            repo_url: input.repo_url,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_project(&self, id: i64, input: UpdateProjectInput) -> Result<Option<Project>> {
        if let Some(name) = &input.name {
            require_non_empty("Project name", name)?;
        }
        if let Some(branch) = &input.master_branch {
            require_non_empty("Master branch", branch)?;
        }

        let conn = self.lock()?;
        let Some(existing) = query_project(&conn, id)? else {
            return Ok(None);
        };

        let now = Utc::now();
        let name = input.name.unwrap_or(existing.name);
        let description = input.description.unwrap_or(existing.description);
        let master_branch = input.master_branch.unwrap_or(existing.master_branch);
        let repo_url = input.repo_url.unwrap_or(existing.repo_url);

        conn.execute(
            "UPDATE projects SET name = ?, description = ?, master_branch = ?, repo_url = ?, updated_at = ?
             WHERE id = ?",
            (
                &name,
                &description,
                &master_branch,
                &repo_url,
                now.to_rfc3339(),
                id,
            ),
        )?;

        Ok(Some(Project {
            id,
            name,
            description,
            master_branch,
            repo_url,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn delete_project(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute("DELETE FROM projects WHERE id = ?", [id])?;
        if rows > 0 {
            tracing::info!(project_id = id, "Deleted project");
        }
        Ok(rows > 0)
    }

    // ============================================================
    // Feature operations
    // ============================================================

    pub fn get_features_by_project(&self, project_id: i64) -> Result<Vec<FeatureSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {FEATURE_COLUMNS},
                (SELECT COUNT(*) FROM branches b WHERE b.feature_id = f.id),
                (SELECT COUNT(*) FROM branches b WHERE b.feature_id = f.id AND b.is_part_of_stack = 1)
             FROM features f WHERE f.project_id = ? ORDER BY f.updated_at DESC, f.id DESC"
        ))?;

        let features = stmt
            .query_map([project_id], |row| {
                Ok(FeatureSummary {
                    feature: row_to_feature(row)?,
                    branch_count: row.get(8)?,
                    active_branch_count: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(features)
    }

    pub fn get_feature(&self, id: i64) -> Result<Option<Feature>> {
        let conn = self.lock()?;
        query_feature(&conn, id)
    }

    /// A feature with its branches in stack order and its project's base branch.
    pub fn get_feature_with_branches(&self, id: i64) -> Result<Option<FeatureWithBranches>> {
        let conn = self.lock()?;
        let Some(feature) = query_feature(&conn, id)? else {
            return Ok(None);
        };

        let base_branch = query_project(&conn, feature.project_id)?
            .map(|p| p.master_branch)
            .ok_or(StackError::NotFound("Project"))?;
        let branches = query_branches(&conn, id)?;

        Ok(Some(FeatureWithBranches {
            feature,
            base_branch,
            branches,
        }))
    }

    pub fn create_feature(&self, project_id: i64, input: CreateFeatureInput) -> Result<Feature> {
        require_non_empty("Feature identifier", &input.identifier)?;
        require_non_empty("Feature name", &input.name)?;

        let conn = self.lock()?;
        query_project(&conn, project_id)?.ok_or(StackError::NotFound("Project"))?;

        let now = Utc::now();
        let color = input
            .color
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FEATURE_COLOR.to_string());

        conn.execute(
            "INSERT INTO features (project_id, identifier, name, description, color, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                project_id,
                &input.identifier,
                &input.name,
                &input.description,
                &color,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(project_id, feature_id = id, "Created feature {}", input.identifier);

        Ok(Feature {
            id,
            project_id,
            identifier: input.identifier,
            name: input.name,
            description: input.description,
            color,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_feature(&self, id: i64, input: UpdateFeatureInput) -> Result<Option<Feature>> {
        if let Some(identifier) = &input.identifier {
            require_non_empty("Feature identifier", identifier)?;
        }
        if let Some(name) = &input.name {
            require_non_empty("Feature name", name)?;
        }

        let conn = self.lock()?;
        let Some(existing) = query_feature(&conn, id)? else {
            return Ok(None);
        };

        let now = Utc::now();
        let identifier = input.identifier.unwrap_or(existing.identifier);
        let name = input.name.unwrap_or(existing.name);
        let description = input.description.unwrap_or(existing.description);
        let color = input.color.unwrap_or(existing.color);

        conn.execute(
            "UPDATE features SET identifier = ?, name = ?, description = ?, color = ?, updated_at = ?
             WHERE id = ?",
            (&identifier, &name, &description, &color, now.to_rfc3339(), id),
        )?;

        Ok(Some(Feature {
            id,
            project_id: existing.project_id,
            identifier,
            name,
            description,
            color,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn delete_feature(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let rows = conn.execute("DELETE FROM features WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Branch operations
    // ============================================================

    /// Branches of a feature ordered by position.
    pub fn get_branches(&self, feature_id: i64) -> Result<Vec<Branch>> {
        let conn = self.lock()?;
        query_branches(&conn, feature_id)
    }

    pub fn get_branch(&self, id: i64) -> Result<Option<Branch>> {
        let conn = self.lock()?;
        query_branch(&conn, id)
    }

    /// Create a branch at the end of the feature's stack.
    pub fn create_branch(&self, feature_id: i64, input: CreateBranchInput) -> Result<Branch> {
        require_non_empty("Branch name", &input.name)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        query_feature(&tx, feature_id)?.ok_or(StackError::NotFound("Feature"))?;
        if let Some(parent_id) = input.parent_branch_id {
            require_sibling(&tx, feature_id, parent_id)?;
        }

        let now = Utc::now();
        let position = stack::append_position(&feature_positions(&tx, feature_id, None)?);
        let status = input.status.unwrap_or_default();
        let is_part_of_stack = input.is_part_of_stack.unwrap_or(true);

        tx.execute(
            "INSERT INTO branches (feature_id, name, short_name, position, parent_branch_id, status,
                pr_url, pr_number, pr_status, notes, is_part_of_stack, is_planned, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                feature_id,
                &input.name,
                &input.short_name,
                position,
                input.parent_branch_id,
                status.as_str(),
                &input.pr_url,
                input.pr_number,
                input.pr_status.map(|s| s.as_str()),
                &input.notes,
                is_part_of_stack,
                input.is_planned,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )?;
        let id = tx.last_insert_rowid();

        if Branch::in_stack(is_part_of_stack, status) {
            compact_stack(&tx, feature_id)?;
        }

        let branch = query_branch(&tx, id)?.ok_or(StackError::NotFound("Branch"))?;
        tx.commit()?;

        tracing::info!(
            feature_id,
            branch_id = id,
            position = branch.position,
            "Created branch {}",
            branch.name
        );
        Ok(branch)
    }

    /// Partially update a branch.
    ///
    /// A branch that leaves the stack (excluded or deprecated) has the
    /// remaining stack compacted around it; a branch that rejoins is appended
    /// to the end.
    pub fn update_branch(&self, id: i64, input: UpdateBranchInput) -> Result<Option<Branch>> {
        if let Some(name) = &input.name {
            require_non_empty("Branch name", name)?;
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let Some(existing) = query_branch(&tx, id)? else {
            return Ok(None);
        };
        if let Some(Some(parent_id)) = input.parent_branch_id {
            if parent_id == id {
                return Err(StackError::invalid("A branch cannot be its own parent").into());
            }
            require_sibling(&tx, existing.feature_id, parent_id)?;
        }

        let now = Utc::now();
        let name = input.name.unwrap_or(existing.name.clone());
        let short_name = input.short_name.unwrap_or(existing.short_name.clone());
        let parent_branch_id = input.parent_branch_id.unwrap_or(existing.parent_branch_id);
        let status = input.status.unwrap_or(existing.status);
        let pr_url = input.pr_url.unwrap_or(existing.pr_url.clone());
        let pr_number = input.pr_number.unwrap_or(existing.pr_number);
        let pr_status = input.pr_status.unwrap_or(existing.pr_status);
        let notes = input.notes.unwrap_or(existing.notes.clone());
        let is_part_of_stack = input.is_part_of_stack.unwrap_or(existing.is_part_of_stack);
        let is_planned = input.is_planned.unwrap_or(existing.is_planned);

        let was_stacked = existing.is_stacked();
        let now_stacked = Branch::in_stack(is_part_of_stack, status);
        let position = if now_stacked && !was_stacked {
            stack::append_position(&feature_positions(&tx, existing.feature_id, Some(id))?)
        } else {
            existing.position
        };

        tx.execute(
            "UPDATE branches SET name = ?, short_name = ?, position = ?, parent_branch_id = ?, status = ?,
                pr_url = ?, pr_number = ?, pr_status = ?, notes = ?, is_part_of_stack = ?, is_planned = ?,
                updated_at = ?
             WHERE id = ?",
            rusqlite::params![
                &name,
                &short_name,
                position,
                parent_branch_id,
                status.as_str(),
                &pr_url,
                pr_number,
                pr_status.map(|s| s.as_str()),
                &notes,
                is_part_of_stack,
                is_planned,
                now.to_rfc3339(),
                id,
            ],
        )?;

        if was_stacked != now_stacked {
            compact_stack(&tx, existing.feature_id)?;
        }

        let branch = query_branch(&tx, id)?;
        tx.commit()?;
        Ok(branch)
    }

    /// Delete a branch and close the gap it leaves in the stack.
    pub fn delete_branch(&self, id: i64) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let Some(existing) = query_branch(&tx, id)? else {
            return Ok(false);
        };

        tx.execute("DELETE FROM branches WHERE id = ?", [id])?;
        compact_stack(&tx, existing.feature_id)?;
        tx.commit()?;

        tracing::info!(
            feature_id = existing.feature_id,
            branch_id = id,
            "Deleted branch {}",
            existing.name
        );
        Ok(true)
    }

    /// Reorder a feature's stack as one indivisible operation.
    ///
    /// `ordered_ids` must contain every stacked branch of the feature exactly
    /// once. All positions are written in a single transaction; on any error
    /// nothing changes.
    pub fn reorder_branches(&self, feature_id: i64, ordered_ids: &[i64]) -> Result<Vec<Branch>> {
        let positions = stack::reorder(ordered_ids)?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        query_feature(&tx, feature_id)?.ok_or(StackError::NotFound("Feature"))?;

        let stacked: HashSet<i64> = query_branches(&tx, feature_id)?
            .into_iter()
            .filter(Branch::is_stacked)
            .map(|b| b.id)
            .collect();

        if let Some(foreign) = ordered_ids.iter().find(|id| !stacked.contains(*id)) {
            return Err(StackError::invalid(format!(
                "branch {} is not in the stack of feature {}",
                foreign, feature_id
            ))
            .into());
        }
        if let Some(missing) = stacked.iter().find(|id| !positions.contains_key(*id)) {
            return Err(StackError::invalid(format!(
                "reorder must list every stacked branch; missing {}",
                missing
            ))
            .into());
        }

        let now = Utc::now().to_rfc3339();
        for (id, position) in &positions {
            let rows = tx.execute(
                "UPDATE branches SET position = ?, updated_at = ? WHERE id = ? AND feature_id = ?",
                (position, &now, id, feature_id),
            )?;
            if rows != 1 {
                anyhow::bail!("Failed to update position of branch {}", id);
            }
        }

        let branches = query_branches(&tx, feature_id)?;
        debug_assert!(stack::is_dense(&stacked_positions(&branches)));
        tx.commit()?;

        tracing::info!(feature_id, count = positions.len(), "Reordered branches");
        Ok(branches)
    }

    /// Every branch of a project, grouped by feature identifier and ordered by position.
    pub fn get_project_branches(&self, project_id: i64) -> Result<Vec<ProjectBranch>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT b.id, b.name, b.short_name, b.feature_id, f.identifier, f.name, b.status, b.position
             FROM branches b JOIN features f ON b.feature_id = f.id
             WHERE f.project_id = ?
             ORDER BY f.identifier, b.position, b.id",
        )?;

        let branches = stmt
            .query_map([project_id], |row| {
                Ok(ProjectBranch {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    short_name: row.get(2)?,
                    feature_id: row.get(3)?,
                    feature_identifier: row.get(4)?,
                    feature_name: row.get(5)?,
                    status: BranchStatus::from_str(&row.get::<_, String>(6)?).unwrap_or_default(),
                    position: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(branches)
    }

    /// Verification artifacts for a feature's stack, anchored at the
    /// project's master branch.
    pub fn get_stack_verification(
        &self,
        project_id: i64,
        feature_id: i64,
    ) -> Result<StackVerification> {
        let conn = self.lock()?;
        let project = query_project(&conn, project_id)?.ok_or(StackError::NotFound("Project"))?;
        query_feature(&conn, feature_id)?
            .filter(|f| f.project_id == project_id)
            .ok_or(StackError::NotFound("Feature"))?;

        let entries: Vec<StackEntry> = query_branches(&conn, feature_id)?
            .iter()
            .filter(|b| b.is_stacked())
            .map(StackEntry::from)
            .collect();

        Ok(stack::generate_verification(&project.master_branch, &entries))
    }

    // ============================================================
    // Branch comparison operations
    // ============================================================

    pub fn create_comparison(
        &self,
        project_id: i64,
        input: CreateComparisonInput,
    ) -> Result<BranchComparison> {
        require_non_empty("Parent branch", &input.parent_branch)?;
        require_non_empty("Child branch", &input.child_branch)?;

        let conn = self.lock()?;
        query_project(&conn, project_id)?.ok_or(StackError::NotFound("Project"))?;

        let now = Utc::now();
        conn.execute(
            "INSERT INTO branch_comparisons (project_id, parent_branch, child_branch, is_ancestor, merge_base, checked_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                project_id,
                &input.parent_branch,
                &input.child_branch,
                input.is_ancestor,
                &input.merge_base,
                now.to_rfc3339(),
            ),
        )?;

        Ok(BranchComparison {
            id: conn.last_insert_rowid(),
            project_id,
            parent_branch: input.parent_branch,
            child_branch: input.child_branch,
            is_ancestor: input.is_ancestor,
            merge_base: input.merge_base,
            checked_at: now,
        })
    }

    /// Most recent comparisons first, optionally limited to one project.
    pub fn get_recent_comparisons(
        &self,
        project_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<BranchComparison>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, project_id, parent_branch, child_branch, is_ancestor, merge_base, checked_at
             FROM branch_comparisons
             WHERE (?1 IS NULL OR project_id = ?1)
             ORDER BY checked_at DESC, id DESC
             LIMIT ?2",
        )?;

        let comparisons = stmt
            .query_map((project_id, limit), |row| {
                Ok(BranchComparison {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    parent_branch: row.get(2)?,
                    child_branch: row.get(3)?,
                    is_ancestor: row.get(4)?,
                    merge_base: row.get(5)?,
                    checked_at: parse_datetime(row.get::<_, String>(6)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comparisons)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// Location of the database when none is configured.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "stacktrack")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("stacktrack.db"))
}

fn require_non_empty(field: &str, value: &str) -> Result<(), StackError> {
    if value.trim().is_empty() {
        Err(StackError::invalid(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

fn require_sibling(conn: &Connection, feature_id: i64, branch_id: i64) -> Result<()> {
    match query_branch(conn, branch_id)? {
        Some(b) if b.feature_id == feature_id => Ok(()),
        _ => Err(StackError::invalid(format!(
            "parent branch {} does not belong to feature {}",
            branch_id, feature_id
        ))
        .into()),
    }
}

fn query_project(conn: &Connection, id: i64) -> Result<Option<Project>> {
    let project = conn
        .query_row(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects p WHERE p.id = ?"),
            [id],
            row_to_project,
        )
        .optional()?;
    Ok(project)
}

fn query_feature(conn: &Connection, id: i64) -> Result<Option<Feature>> {
    let feature = conn
        .query_row(
            &format!("SELECT {FEATURE_COLUMNS} FROM features f WHERE f.id = ?"),
            [id],
            row_to_feature,
        )
        .optional()?;
    Ok(feature)
}

fn query_branch(conn: &Connection, id: i64) -> Result<Option<Branch>> {
    let branch = conn
        .query_row(
            &format!("SELECT {BRANCH_COLUMNS} FROM branches b WHERE b.id = ?"),
            [id],
            row_to_branch,
        )
        .optional()?;
    Ok(branch)
}

fn query_branches(conn: &Connection, feature_id: i64) -> Result<Vec<Branch>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BRANCH_COLUMNS} FROM branches b WHERE b.feature_id = ? ORDER BY b.position, b.id"
    ))?;
    let branches = stmt
        .query_map([feature_id], row_to_branch)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(branches)
}

/// Positions of every branch in a feature, optionally leaving one out.
fn feature_positions(conn: &Connection, feature_id: i64, except: Option<i64>) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT position FROM branches WHERE feature_id = ?1 AND (?2 IS NULL OR id != ?2)",
    )?;
    let positions = stmt
        .query_map((feature_id, except), |row| row.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(positions)
}

/// Renumber the feature's stacked branches to `1..N`, keeping their order.
fn compact_stack(conn: &Connection, feature_id: i64) -> Result<()> {
    let order: Vec<i64> = query_branches(conn, feature_id)?
        .into_iter()
        .filter(Branch::is_stacked)
        .map(|b| b.id)
        .collect();

    let now = Utc::now().to_rfc3339();
    for (id, position) in stack::compact(&order) {
        conn.execute(
            "UPDATE branches SET position = ?, updated_at = ? WHERE id = ? AND position != ?",
            (position, &now, id, position),
        )?;
    }
    debug_assert!(stack::is_dense(&stacked_positions(&query_branches(conn, feature_id)?)));
    Ok(())
}

fn stacked_positions(branches: &[Branch]) -> Vec<i64> {
    branches
        .iter()
        .filter(|b| b.is_stacked())
        .map(|b| b.position)
        .collect()
}

fn row_to_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        master_branch: row.get(3)?,
        repo_url: row.get(4)?,
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn row_to_feature(row: &Row<'_>) -> rusqlite::Result<Feature> {
    Ok(Feature {
        id: row.get(0)?,
        project_id: row.get(1)?,
        identifier: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        color: row.get(5)?,
        created_at: parse_datetime(row.get::<_, String>(6)?),
        updated_at: parse_datetime(row.get::<_, String>(7)?),
    })
}

fn row_to_branch(row: &Row<'_>) -> rusqlite::Result<Branch> {
    Ok(Branch {
        id: row.get(0)?,
        feature_id: row.get(1)?,
        name: row.get(2)?,
        short_name: row.get(3)?,
        position: row.get(4)?,
        parent_branch_id: row.get(5)?,
        status: BranchStatus::from_str(&row.get::<_, String>(6)?).unwrap_or_default(),
        pr_url: row.get(7)?,
        pr_number: row.get(8)?,
        pr_status: row
            .get::<_, Option<String>>(9)?
            .and_then(|s| PrStatus::from_str(&s)),
        notes: row.get(10)?,
        is_part_of_stack: row.get(11)?,
        is_planned: row.get(12)?,
        created_at: parse_datetime(row.get::<_, String>(13)?),
        updated_at: parse_datetime(row.get::<_, String>(14)?),
    })
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

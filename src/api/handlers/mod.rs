use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::response::{internal_error, ApiError, ApiResponse, Deleted};
use crate::db::Database;
use crate::models::*;
use crate::stack::{self, ComparisonCommand, StackVerification};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

fn created<T>(data: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(data))))
}

fn deleted(found: bool, what: &str) -> ApiResult<Deleted> {
    if found {
        ok(Deleted { success: true })
    } else {
        Err(ApiError::not_found(what))
    }
}

/// Load a feature, treating one that belongs to another project as missing.
fn scoped_feature(db: &Database, project_id: i64, feature_id: i64) -> Result<Feature, ApiError> {
    db.get_feature(feature_id)
        .map_err(internal_error)?
        .filter(|f| f.project_id == project_id)
        .ok_or_else(|| ApiError::not_found("Feature"))
}

/// Load a branch, treating one outside the given project/feature as missing.
fn scoped_branch(
    db: &Database,
    project_id: i64,
    feature_id: i64,
    branch_id: i64,
) -> Result<Branch, ApiError> {
    scoped_feature(db, project_id, feature_id)?;
    db.get_branch(branch_id)
        .map_err(internal_error)?
        .filter(|b| b.feature_id == feature_id)
        .ok_or_else(|| ApiError::not_found("Branch"))
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Projects
// ============================================================

pub async fn list_projects(State(db): State<Database>) -> ApiResult<Vec<ProjectSummary>> {
    ok(db.get_all_projects().map_err(internal_error)?)
}

pub async fn get_project(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Project> {
    db.get_project(id)
        .map_err(internal_error)?
        .map(ApiResponse::ok)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Project"))
}

pub async fn create_project(
    State(db): State<Database>,
    ApiJson(input): ApiJson<CreateProjectInput>,
) -> Created<Project> {
    created(db.create_project(input).map_err(internal_error)?)
}

pub async fn update_project(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateProjectInput>,
) -> ApiResult<Project> {
    db.update_project(id, input)
        .map_err(internal_error)?
        .map(ApiResponse::ok)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Project"))
}

pub async fn delete_project(
    State(db): State<Database>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Deleted> {
    deleted(db.delete_project(id).map_err(internal_error)?, "Project")
}

pub async fn list_project_branches(
    State(db): State<Database>,
    ApiPath(project_id): ApiPath<i64>,
) -> ApiResult<Vec<ProjectBranch>> {
    db.get_project(project_id)
        .map_err(internal_error)?
        .ok_or_else(|| ApiError::not_found("Project"))?;

    ok(db.get_project_branches(project_id).map_err(internal_error)?)
}

// ============================================================
// Features
// ============================================================

pub async fn list_features(
    State(db): State<Database>,
    ApiPath(project_id): ApiPath<i64>,
) -> ApiResult<Vec<FeatureSummary>> {
    db.get_project(project_id)
        .map_err(internal_error)?
        .ok_or_else(|| ApiError::not_found("Project"))?;

    ok(db.get_features_by_project(project_id).map_err(internal_error)?)
}

pub async fn get_feature(
    State(db): State<Database>,
    ApiPath((project_id, feature_id)): ApiPath<(i64, i64)>,
) -> ApiResult<FeatureWithBranches> {
    scoped_feature(&db, project_id, feature_id)?;
    db.get_feature_with_branches(feature_id)
        .map_err(internal_error)?
        .map(ApiResponse::ok)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Feature"))
}

pub async fn create_feature(
    State(db): State<Database>,
    ApiPath(project_id): ApiPath<i64>,
    ApiJson(input): ApiJson<CreateFeatureInput>,
) -> Created<Feature> {
    created(db.create_feature(project_id, input).map_err(internal_error)?)
}

pub async fn update_feature(
    State(db): State<Database>,
    ApiPath((project_id, feature_id)): ApiPath<(i64, i64)>,
    ApiJson(input): ApiJson<UpdateFeatureInput>,
) -> ApiResult<Feature> {
    scoped_feature(&db, project_id, feature_id)?;
    db.update_feature(feature_id, input)
        .map_err(internal_error)?
        .map(ApiResponse::ok)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Feature"))
}

pub async fn delete_feature(
    State(db): State<Database>,
    ApiPath((project_id, feature_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Deleted> {
    scoped_feature(&db, project_id, feature_id)?;
    deleted(db.delete_feature(feature_id).map_err(internal_error)?, "Feature")
}

/// Ancestry verification commands for the feature's stack.
pub async fn verify_stack(
    State(db): State<Database>,
    ApiPath((project_id, feature_id)): ApiPath<(i64, i64)>,
) -> ApiResult<StackVerification> {
    ok(db
        .get_stack_verification(project_id, feature_id)
        .map_err(internal_error)?)
}

// ============================================================
// Branches
// ============================================================

pub async fn list_branches(
    State(db): State<Database>,
    ApiPath((project_id, feature_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Vec<Branch>> {
    scoped_feature(&db, project_id, feature_id)?;
    ok(db.get_branches(feature_id).map_err(internal_error)?)
}

pub async fn get_branch(
    State(db): State<Database>,
    ApiPath((project_id, feature_id, branch_id)): ApiPath<(i64, i64, i64)>,
) -> ApiResult<Branch> {
    ok(scoped_branch(&db, project_id, feature_id, branch_id)?)
}

pub async fn create_branch(
    State(db): State<Database>,
    ApiPath((project_id, feature_id)): ApiPath<(i64, i64)>,
    ApiJson(input): ApiJson<CreateBranchInput>,
) -> Created<Branch> {
    scoped_feature(&db, project_id, feature_id)?;
    created(db.create_branch(feature_id, input).map_err(internal_error)?)
}

pub async fn update_branch(
    State(db): State<Database>,
    ApiPath((project_id, feature_id, branch_id)): ApiPath<(i64, i64, i64)>,
    ApiJson(input): ApiJson<UpdateBranchInput>,
) -> ApiResult<Branch> {
    scoped_branch(&db, project_id, feature_id, branch_id)?;
    db.update_branch(branch_id, input)
        .map_err(internal_error)?
        .map(ApiResponse::ok)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Branch"))
}

pub async fn delete_branch(
    State(db): State<Database>,
    ApiPath((project_id, feature_id, branch_id)): ApiPath<(i64, i64, i64)>,
) -> ApiResult<Deleted> {
    scoped_branch(&db, project_id, feature_id, branch_id)?;
    deleted(db.delete_branch(branch_id).map_err(internal_error)?, "Branch")
}

/// Replace the order of the feature's stack in one step.
pub async fn reorder_branches(
    State(db): State<Database>,
    ApiPath((project_id, feature_id)): ApiPath<(i64, i64)>,
    ApiJson(input): ApiJson<ReorderBranchesInput>,
) -> ApiResult<Vec<Branch>> {
    scoped_feature(&db, project_id, feature_id)?;
    ok(db
        .reorder_branches(feature_id, &input.ordered_ids)
        .map_err(internal_error)?)
}

// ============================================================
// Comparisons
// ============================================================

/// Query parameters for listing recorded comparisons.
#[derive(Debug, Deserialize)]
pub struct ComparisonsQuery {
    /// Limit to one project (only used by the global listing).
    pub project_id: Option<i64>,
    /// Maximum number of results to return. Defaults to 10.
    pub limit: Option<u32>,
}

const DEFAULT_COMPARISON_LIMIT: u32 = 10;

pub async fn list_comparisons(
    State(db): State<Database>,
    ApiQuery(query): ApiQuery<ComparisonsQuery>,
) -> ApiResult<Vec<BranchComparison>> {
    let limit = query.limit.unwrap_or(DEFAULT_COMPARISON_LIMIT);
    ok(db
        .get_recent_comparisons(query.project_id, limit)
        .map_err(internal_error)?)
}

pub async fn list_project_comparisons(
    State(db): State<Database>,
    ApiPath(project_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<ComparisonsQuery>,
) -> ApiResult<Vec<BranchComparison>> {
    db.get_project(project_id)
        .map_err(internal_error)?
        .ok_or_else(|| ApiError::not_found("Project"))?;

    let limit = query.limit.unwrap_or(DEFAULT_COMPARISON_LIMIT);
    ok(db
        .get_recent_comparisons(Some(project_id), limit)
        .map_err(internal_error)?)
}

pub async fn create_comparison(
    State(db): State<Database>,
    ApiPath(project_id): ApiPath<i64>,
    ApiJson(input): ApiJson<CreateComparisonInput>,
) -> Created<BranchComparison> {
    created(
        db.create_comparison(project_id, input)
            .map_err(internal_error)?,
    )
}

/// Query parameters for generating comparison commands.
#[derive(Debug, Deserialize)]
pub struct CompareQuery {
    pub parent: String,
    pub child: String,
}

/// Git commands comparing two branches. Nothing is stored.
pub async fn compare_commands(
    ApiQuery(query): ApiQuery<CompareQuery>,
) -> ApiResult<Vec<ComparisonCommand>> {
    if query.parent.trim().is_empty() || query.child.trim().is_empty() {
        return Err(ApiError::bad_request("Both parent and child branches are required"));
    }
    ok(stack::comparison_commands(&query.parent, &query.child))
}

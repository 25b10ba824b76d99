use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use serde::de::DeserializeOwned;
use serde_json::json;
use stacktrack::api::{create_router, ApiResponse, Deleted};
use stacktrack::db::Database;
use stacktrack::models::*;
use stacktrack::stack::{ComparisonCommand, StackVerification};

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);
    TestServer::new(app).expect("Failed to create test server")
}

/// Unwrap the `data` field of a successful response.
fn data<T: DeserializeOwned>(response: &TestResponse) -> T {
    let envelope: ApiResponse<T> = response.json();
    assert!(envelope.error.is_none(), "unexpected error: {:?}", envelope.error);
    envelope.data.expect("Response had no data")
}

/// The `error` field of a failed response.
fn error(response: &TestResponse) -> String {
    let envelope: ApiResponse<serde_json::Value> = response.json();
    assert!(envelope.data.is_none());
    envelope.error.expect("Response had no error")
}

async fn create_test_project(server: &TestServer) -> Project {
    let response = server
        .post("/api/v1/projects")
        .json(&json!({ "name": "Test Project" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    data(&response)
}

async fn create_test_feature(server: &TestServer, project_id: i64) -> Feature {
    let response = server
        .post(&format!("/api/v1/projects/{}/features", project_id))
        .json(&json!({ "identifier": "11627", "name": "DB infrastructure" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    data(&response)
}

async fn create_test_branch(server: &TestServer, project_id: i64, feature_id: i64, name: &str) -> Branch {
    let response = server
        .post(&format!(
            "/api/v1/projects/{}/features/{}/branches",
            project_id, feature_id
        ))
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(StatusCode::CREATED);
    data(&response)
}

fn branches_url(project_id: i64, feature_id: i64) -> String {
    format!("/api/v1/projects/{}/features/{}/branches", project_id, feature_id)
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();
        let response = server.get("/api/v1/health").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "status": "ok" }));
    }
}

mod projects {
    use super::*;

    #[tokio::test]
    async fn lists_created_projects_with_counts() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;
        create_test_branch(&server, project.id, feature.id, "alice-db").await;

        let response = server.get("/api/v1/projects").await;
        response.assert_status_ok();
        let projects: Vec<ProjectSummary> = data(&response);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].project.name, "Test Project");
        assert_eq!(projects[0].feature_count, 1);
        assert_eq!(projects[0].branch_count, 1);
    }

    #[tokio::test]
    async fn returns_404_for_missing_project() {
        let server = setup();
        let response = server.get("/api/v1/projects/999").await;
        response.assert_status_not_found();
        assert_eq!(error(&response), "Project not found");
    }

    #[tokio::test]
    async fn rejects_blank_name() {
        let server = setup();
        let response = server
            .post("/api/v1/projects")
            .json(&json!({ "name": "" }))
            .await;
        response.assert_status_bad_request();
        assert_eq!(error(&response), "Project name is required");
    }

    #[tokio::test]
    async fn updates_master_branch() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .put(&format!("/api/v1/projects/{}", project.id))
            .json(&UpdateProjectInput {
                master_branch: Some("develop".to_string()),
                ..Default::default()
            })
            .await;

        response.assert_status_ok();
        let updated: Project = data(&response);
        assert_eq!(updated.master_branch, "develop");
    }

    #[tokio::test]
    async fn deletes_project() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .delete(&format!("/api/v1/projects/{}", project.id))
            .await;
        response.assert_status_ok();
        let deleted: Deleted = data(&response);
        assert!(deleted.success);

        server
            .get(&format!("/api/v1/projects/{}", project.id))
            .await
            .assert_status_not_found();
    }
}

mod features {
    use super::*;

    #[tokio::test]
    async fn creates_feature_with_default_color() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;

        assert_eq!(feature.project_id, project.id);
        assert_eq!(feature.color, DEFAULT_FEATURE_COLOR);
    }

    #[tokio::test]
    async fn create_in_missing_project_is_404() {
        let server = setup();
        let response = server
            .post("/api/v1/projects/999/features")
            .json(&json!({ "identifier": "1", "name": "Orphan" }))
            .await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn get_includes_branches_and_base_branch() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;
        create_test_branch(&server, project.id, feature.id, "alice-db").await;
        create_test_branch(&server, project.id, feature.id, "alice-api").await;

        let response = server
            .get(&format!("/api/v1/projects/{}/features/{}", project.id, feature.id))
            .await;

        response.assert_status_ok();
        let detail: FeatureWithBranches = data(&response);
        assert_eq!(detail.feature.id, feature.id);
        assert_eq!(detail.base_branch, "main");
        let names: Vec<&str> = detail.branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["alice-db", "alice-api"]);
    }

    #[tokio::test]
    async fn feature_of_another_project_is_404() {
        let server = setup();
        let project = create_test_project(&server).await;
        let other = create_test_project(&server).await;
        let feature = create_test_feature(&server, other.id).await;

        server
            .get(&format!("/api/v1/projects/{}/features/{}", project.id, feature.id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn lists_features_of_project() {
        let server = setup();
        let project = create_test_project(&server).await;
        create_test_feature(&server, project.id).await;

        let response = server
            .get(&format!("/api/v1/projects/{}/features", project.id))
            .await;
        response.assert_status_ok();
        let features: Vec<FeatureSummary> = data(&response);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].branch_count, 0);
    }

    #[tokio::test]
    async fn deletes_feature() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;
        let url = format!("/api/v1/projects/{}/features/{}", project.id, feature.id);

        server.delete(&url).await.assert_status_ok();
        server.get(&url).await.assert_status_not_found();
    }
}

mod branches {
    use super::*;

    #[tokio::test]
    async fn appends_in_creation_order() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;

        let a = create_test_branch(&server, project.id, feature.id, "a").await;
        let b = create_test_branch(&server, project.id, feature.id, "b").await;

        assert_eq!(a.position, 1);
        assert_eq!(b.position, 2);
        assert_eq!(b.status, BranchStatus::Active);
    }

    #[tokio::test]
    async fn accepts_legacy_status_spelling() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;

        let response = server
            .post(&branches_url(project.id, feature.id))
            .json(&json!({ "name": "a", "status": "in_review" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let branch: Branch = data(&response);
        assert_eq!(branch.status, BranchStatus::PrRaised);
    }

    #[tokio::test]
    async fn rejects_blank_name() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;

        let response = server
            .post(&branches_url(project.id, feature.id))
            .json(&json!({ "name": " " }))
            .await;
        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn updates_pr_fields() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;
        let branch = create_test_branch(&server, project.id, feature.id, "a").await;

        let response = server
            .put(&format!("{}/{}", branches_url(project.id, feature.id), branch.id))
            .json(&json!({
                "status": "pr_raised",
                "pr_url": "https://github.com/acme/web/pull/42",
                "pr_number": 42
            }))
            .await;

        response.assert_status_ok();
        let updated: Branch = data(&response);
        assert_eq!(updated.status, BranchStatus::PrRaised);
        assert_eq!(updated.pr_number, Some(42));
    }

    #[tokio::test]
    async fn null_clears_nullable_fields() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;
        let parent = create_test_branch(&server, project.id, feature.id, "a").await;

        let response = server
            .post(&branches_url(project.id, feature.id))
            .json(&json!({
                "name": "b",
                "parent_branch_id": parent.id,
                "pr_url": "https://github.com/acme/web/pull/1",
                "notes": "n"
            }))
            .await;
        let branch: Branch = data(&response);

        let response = server
            .put(&format!("{}/{}", branches_url(project.id, feature.id), branch.id))
            .json(&json!({ "pr_url": null, "notes": null, "parent_branch_id": null }))
            .await;

        response.assert_status_ok();
        let updated: Branch = data(&response);
        assert!(updated.pr_url.is_none());
        assert!(updated.notes.is_none());
        assert!(updated.parent_branch_id.is_none());
    }

    #[tokio::test]
    async fn omitted_fields_are_kept() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;

        let response = server
            .post(&branches_url(project.id, feature.id))
            .json(&json!({ "name": "a", "notes": "keep me" }))
            .await;
        let branch: Branch = data(&response);

        let response = server
            .put(&format!("{}/{}", branches_url(project.id, feature.id), branch.id))
            .json(&json!({ "status": "blocked" }))
            .await;

        let updated: Branch = data(&response);
        assert_eq!(updated.status, BranchStatus::Blocked);
        assert_eq!(updated.notes.as_deref(), Some("keep me"));
    }

    #[tokio::test]
    async fn branch_of_another_feature_is_404() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;
        let other = create_test_feature(&server, project.id).await;
        let branch = create_test_branch(&server, project.id, other.id, "x").await;

        server
            .get(&format!("{}/{}", branches_url(project.id, feature.id), branch.id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_compacts_positions() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;
        create_test_branch(&server, project.id, feature.id, "a").await;
        let b = create_test_branch(&server, project.id, feature.id, "b").await;
        create_test_branch(&server, project.id, feature.id, "c").await;

        server
            .delete(&format!("{}/{}", branches_url(project.id, feature.id), b.id))
            .await
            .assert_status_ok();

        let response = server.get(&branches_url(project.id, feature.id)).await;
        let branches: Vec<Branch> = data(&response);
        let positions: Vec<(&str, i64)> = branches
            .iter()
            .map(|b| (b.name.as_str(), b.position))
            .collect();
        assert_eq!(positions, vec![("a", 1), ("c", 2)]);
    }

    #[tokio::test]
    async fn lists_branches_across_project() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;
        create_test_branch(&server, project.id, feature.id, "a").await;

        let response = server
            .get(&format!("/api/v1/projects/{}/branches", project.id))
            .await;
        response.assert_status_ok();
        let branches: Vec<ProjectBranch> = data(&response);
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].feature_id, feature.id);
    }
}

mod reorder {
    use super::*;

    #[tokio::test]
    async fn applies_new_order() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;
        let a = create_test_branch(&server, project.id, feature.id, "a").await;
        let b = create_test_branch(&server, project.id, feature.id, "b").await;
        let c = create_test_branch(&server, project.id, feature.id, "c").await;

        let response = server
            .put(&format!("{}/reorder", branches_url(project.id, feature.id)))
            .json(&ReorderBranchesInput {
                ordered_ids: vec![b.id, c.id, a.id],
            })
            .await;

        response.assert_status_ok();
        let branches: Vec<Branch> = data(&response);
        let order: Vec<(&str, i64)> = branches
            .iter()
            .map(|b| (b.name.as_str(), b.position))
            .collect();
        assert_eq!(order, vec![("b", 1), ("c", 2), ("a", 3)]);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected_and_nothing_changes() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;
        let a = create_test_branch(&server, project.id, feature.id, "a").await;
        create_test_branch(&server, project.id, feature.id, "b").await;

        let response = server
            .put(&format!("{}/reorder", branches_url(project.id, feature.id)))
            .json(&json!({ "ordered_ids": [a.id, a.id] }))
            .await;

        response.assert_status_bad_request();
        assert!(error(&response).contains("duplicate"));

        let branches: Vec<Branch> = data(&server.get(&branches_url(project.id, feature.id)).await);
        let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn missing_feature_is_404() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .put(&format!("{}/reorder", branches_url(project.id, 999)))
            .json(&json!({ "ordered_ids": [] }))
            .await;
        response.assert_status_not_found();
    }
}

mod verify_stack {
    use super::*;

    #[tokio::test]
    async fn returns_one_liner_and_script() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;
        create_test_branch(&server, project.id, feature.id, "alice-db").await;
        create_test_branch(&server, project.id, feature.id, "alice-api").await;

        let response = server
            .get(&format!(
                "/api/v1/projects/{}/features/{}/verify-stack",
                project.id, feature.id
            ))
            .await;

        response.assert_status_ok();
        let v: StackVerification = data(&response);
        assert_eq!(v.branch_count, 2);
        assert_eq!(v.base_branch, "main");
        assert_eq!(v.one_liner.matches("git merge-base --is-ancestor").count(), 2);
        assert!(v.script.contains("ERRORS=0"));
        assert!(!v.script.contains("git fetch"));
    }

    #[tokio::test]
    async fn empty_stack_has_placeholder() {
        let server = setup();
        let project = create_test_project(&server).await;
        let feature = create_test_feature(&server, project.id).await;

        let response = server
            .get(&format!(
                "/api/v1/projects/{}/features/{}/verify-stack",
                project.id, feature.id
            ))
            .await;

        let v: StackVerification = data(&response);
        assert_eq!(v.branch_count, 0);
        assert_eq!(v.one_liner, "# No branches to verify");
        assert_eq!(v.script, "# No branches to verify");
    }

    #[tokio::test]
    async fn missing_project_is_404() {
        let server = setup();
        let response = server
            .get("/api/v1/projects/999/features/1/verify-stack")
            .await;
        response.assert_status_not_found();
        assert_eq!(error(&response), "Project not found");
    }
}

mod comparisons {
    use super::*;

    #[tokio::test]
    async fn records_and_lists_comparisons() {
        let server = setup();
        let project = create_test_project(&server).await;
        let url = format!("/api/v1/projects/{}/comparisons", project.id);

        let response = server
            .post(&url)
            .json(&CreateComparisonInput {
                parent_branch: "main".to_string(),
                child_branch: "alice-db".to_string(),
                is_ancestor: Some(true),
                merge_base: Some("abc123".to_string()),
            })
            .await;
        response.assert_status(StatusCode::CREATED);

        let listed: Vec<BranchComparison> = data(&server.get(&url).await);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].is_ancestor, Some(true));

        let global: Vec<BranchComparison> = data(
            &server
                .get(&format!("/api/v1/comparisons?project_id={}&limit=5", project.id))
                .await,
        );
        assert_eq!(global.len(), 1);
    }

    #[tokio::test]
    async fn compare_generates_commands() {
        let server = setup();
        let response = server
            .get("/api/v1/compare?parent=main&child=alice-db")
            .await;

        response.assert_status_ok();
        let commands: Vec<ComparisonCommand> = data(&response);
        assert_eq!(commands.len(), 6);
        assert_eq!(commands[0].key, "merge_base");
        assert!(commands[0].command.contains("git merge-base main alice-db"));
        assert!(commands.iter().filter(|c| c.mutates).all(|c| c.key == "rebase"));
    }

    #[tokio::test]
    async fn compare_requires_both_branches() {
        let server = setup();
        server
            .get("/api/v1/compare?parent=main&child=")
            .await
            .assert_status_bad_request();
    }
}

mod malformed_requests {
    use super::*;

    #[tokio::test]
    async fn non_numeric_id_is_400_envelope() {
        let server = setup();
        let response = server
            .get("/api/v1/projects/abc/features/1/verify-stack")
            .await;

        response.assert_status_bad_request();
        assert!(error(&response).starts_with("Invalid path parameter"));
    }

    #[tokio::test]
    async fn invalid_json_body_is_400_envelope() {
        let server = setup();
        let response = server
            .post("/api/v1/projects")
            .json(&json!({ "description": "no name" }))
            .await;

        response.assert_status_bad_request();
        assert!(error(&response).starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn missing_query_parameter_is_400_envelope() {
        let server = setup();
        let response = server.get("/api/v1/compare?parent=main").await;

        response.assert_status_bad_request();
        assert!(error(&response).starts_with("Invalid query string"));
    }
}
